use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Owner,
    Employee,
    Delivery,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Owner => "owner",
            Role::Employee => "employee",
            Role::Delivery => "delivery",
            Role::Customer => "customer",
        }
    }

    /// Roles that are granted per branch rather than per shop or platform.
    pub fn is_branch_staff(&self) -> bool {
        matches!(self, Role::Employee | Role::Delivery)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Role::Superadmin),
            "owner" => Ok(Role::Owner),
            "employee" => Ok(Role::Employee),
            "delivery" => Ok(Role::Delivery),
            "customer" => Ok(Role::Customer),
            other => Err(format!("{} is not a known role", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
