use std::{error::Error, fmt::Debug};

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
use thiserror::Error;

use crate::{auth::authorization::AuthzError, utils::error_fmt_chain};

// Error shared by every database interaction
#[derive(Error)]
pub enum StoreError {
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to get connection from pool")]
    PoolError(#[from] r2d2::Error),
    #[error(transparent)]
    Forbidden(#[from] AuthzError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Failed to run query")]
    QueryError(#[source] diesel::result::Error),
    #[error("Unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl StoreError {
    // Maps a missing row to a NotFound naming the entity
    pub fn or_not_found(entity: &'static str) -> impl Fn(diesel::result::Error) -> StoreError {
        move |e| match e {
            diesel::result::Error::NotFound => StoreError::NotFound(entity),
            e => e.into(),
        }
    }
}

fn unique_violation_message(info: &dyn DatabaseErrorInformation) -> String {
    match info.constraint_name() {
        Some("users_email_key") => "email is already registered".to_string(),
        Some("shops_name_idx") => "a shop with this name already exists".to_string(),
        Some("branches_shop_id_name_key") => {
            "a branch with this name already exists in this shop".to_string()
        }
        Some("services_shop_id_name_key") => {
            "a service with this name already exists in this shop".to_string()
        }
        Some("detergent_types_shop_id_kind_name_key") => {
            "a detergent with this name already exists in this shop".to_string()
        }
        Some("role_assignments_scope_idx") => "role is already assigned".to_string(),
        Some("account_requests_pending_email_idx") => {
            "a pending account request already exists for this email".to_string()
        }
        Some(other) => format!("duplicate value violates {}", other),
        None => "duplicate value".to_string(),
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => StoreError::NotFound("record"),
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) => {
                StoreError::Conflict(unique_violation_message(&**info))
            }
            diesel::result::Error::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                ref info,
            ) => {
                tracing::info!(constraint = ?info.constraint_name(), "Foreign key violation");
                StoreError::Conflict("record is still referenced by other records".to_string())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::CheckViolation, ref info) => {
                StoreError::InvalidInput(format!("value rejected: {}", info.message()))
            }
            _ => StoreError::QueryError(e),
        }
    }
}
