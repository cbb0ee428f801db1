use actix_web::web;
use chrono::Utc;
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl, SelectableHelper};
use uuid::Uuid;

use crate::{
    models::AuditLog,
    schema::audit_logs,
    telemetry::spawn_blocking_with_tracing,
    utils::{get_pooled_connection, DbConnection, DbPool, Pagination},
};

use super::StoreError;

pub struct AuditEntry {
    pub actor_id: Uuid,
    pub action: &'static str,
    pub entity_type: &'static str,
    pub entity_id: Option<Uuid>,
    pub details: serde_json::Value,
}

impl AuditEntry {
    pub fn new(actor_id: Uuid, action: &'static str, entity_type: &'static str, entity_id: Uuid) -> Self {
        Self {
            actor_id,
            action,
            entity_type,
            entity_id: Some(entity_id),
            details: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

async fn insert_audit_entry(pool: &web::Data<DbPool>, entry: AuditEntry) -> Result<(), StoreError> {
    let mut conn = get_pooled_connection(pool)
        .await
        .map_err(|e| StoreError::UnexpectedError(anyhow::anyhow!("{:?}", e)))?;

    spawn_blocking_with_tracing(move || {
        let log = AuditLog {
            audit_id: Uuid::new_v4(),
            actor_id: Some(entry.actor_id),
            action: entry.action.to_string(),
            entity_type: entry.entity_type.to_string(),
            entity_id: entry.entity_id,
            details: entry.details,
            created_at: Utc::now(),
        };

        diesel::insert_into(audit_logs::table)
            .values(&log)
            .execute(&mut conn)
    })
    .await??;

    Ok(())
}

// Runs after the audited change has committed; a failure here never fails the request
#[tracing::instrument(
    "Recording audit entry",
    skip(pool, entry),
    fields(action = entry.action, entity_type = entry.entity_type)
)]
pub async fn record(pool: &web::Data<DbPool>, entry: AuditEntry) {
    if let Err(e) = insert_audit_entry(pool, entry).await {
        tracing::warn!(error = ?e, "Failed to record audit entry");
    }
}

#[tracing::instrument("Listing audit logs", skip(conn))]
pub async fn list_audit_logs(
    mut conn: DbConnection,
    entity_type: Option<String>,
    pagination: Pagination,
) -> Result<Vec<AuditLog>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        let mut query = audit_logs::table.into_boxed();
        if let Some(entity_type) = entity_type {
            query = query.filter(audit_logs::entity_type.eq(entity_type));
        }

        query
            .order(audit_logs::created_at.desc())
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(AuditLog::as_select())
            .load::<AuditLog>(&mut conn)
            .map_err(StoreError::from)
    })
    .await??;

    Ok(res)
}
