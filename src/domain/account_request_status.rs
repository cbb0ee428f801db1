use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl AccountRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRequestStatus::Pending => "pending",
            AccountRequestStatus::Approved => "approved",
            AccountRequestStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for AccountRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AccountRequestStatus::Pending),
            "approved" => Ok(AccountRequestStatus::Approved),
            "rejected" => Ok(AccountRequestStatus::Rejected),
            other => Err(format!("{} is not a valid account request status", other)),
        }
    }
}
