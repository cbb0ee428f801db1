use actix_web::{web, HttpResponse};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::extractors::IsSuperadmin,
    db_interaction::{
        account_requests::{approve_account_request, list_account_requests, reject_account_request},
        audit::{record, AuditEntry},
    },
    domain::AccountRequestStatus,
    password::generate_temporary_password,
    routes::{authentication::hash_password, ApiError},
    utils::{get_pooled_connection, DbPool, Pagination},
};

#[derive(Deserialize, Debug)]
pub struct AccountRequestQuery {
    pub status: Option<AccountRequestStatus>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RejectForm {
    pub reason: Option<String>,
}

#[tracing::instrument("Listing account requests", skip(pool, _admin))]
pub async fn get_account_requests(
    pool: web::Data<DbPool>,
    query: web::Query<AccountRequestQuery>,
    pagination: web::Query<Pagination>,
    _admin: IsSuperadmin,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let requests = list_account_requests(conn, query.status, pagination.0).await?;

    Ok(HttpResponse::Ok().json(requests))
}

// The temporary password is only ever shown in this response
#[tracing::instrument("Approving account request", skip(pool, admin))]
pub async fn approve_request(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    admin: IsSuperadmin,
) -> Result<HttpResponse, ApiError> {
    let request_id = path.into_inner();
    let temporary_password = generate_temporary_password();
    let password_hash = hash_password(temporary_password.clone()).await?;

    let conn = get_pooled_connection(&pool).await?;
    let approved = approve_account_request(conn, admin.0, request_id, password_hash).await?;

    record(
        &pool,
        AuditEntry::new(admin.0, "account_request.approved", "account_request", request_id)
            .with_details(json!({ "shop_id": approved.shop_id, "user_id": approved.user_id })),
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({
        "user_id": approved.user_id,
        "shop_id": approved.shop_id,
        "branch_id": approved.branch_id,
        "temporary_password": temporary_password.expose_secret(),
    })))
}

#[tracing::instrument("Rejecting account request", skip(pool, admin, form))]
pub async fn reject_request(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: Option<web::Json<RejectForm>>,
    admin: IsSuperadmin,
) -> Result<HttpResponse, ApiError> {
    let request_id = path.into_inner();
    let reason = form
        .and_then(|f| f.into_inner().reason)
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let conn = get_pooled_connection(&pool).await?;
    let rejected = reject_account_request(conn, admin.0, request_id, reason.clone()).await?;

    record(
        &pool,
        AuditEntry::new(admin.0, "account_request.rejected", "account_request", request_id)
            .with_details(json!({ "reason": reason })),
    )
    .await;

    Ok(HttpResponse::Ok().json(rejected))
}
