use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    auth::extractors::IsSuperadmin,
    db_interaction::audit::list_audit_logs,
    routes::ApiError,
    utils::{get_pooled_connection, DbPool, Pagination},
};

#[derive(Deserialize, Debug)]
pub struct AuditLogQuery {
    pub entity_type: Option<String>,
}

#[tracing::instrument("Listing audit logs", skip(pool, _admin))]
pub async fn get_audit_logs(
    pool: web::Data<DbPool>,
    query: web::Query<AuditLogQuery>,
    pagination: web::Query<Pagination>,
    _admin: IsSuperadmin,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let logs = list_audit_logs(conn, query.0.entity_type, pagination.0).await?;

    Ok(HttpResponse::Ok().json(logs))
}
