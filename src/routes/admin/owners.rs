use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::extractors::IsSuperadmin,
    db_interaction::{
        admin::{delete_owner, list_owners},
        audit::{record, AuditEntry},
    },
    routes::ApiError,
    utils::{get_pooled_connection, DbPool, Pagination},
};

#[tracing::instrument("Listing shop owners", skip(pool, _admin))]
pub async fn get_owners(
    pool: web::Data<DbPool>,
    pagination: web::Query<Pagination>,
    _admin: IsSuperadmin,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let owners = list_owners(conn, pagination.0).await?;

    Ok(HttpResponse::Ok().json(owners))
}

#[tracing::instrument("Deleting shop owner", skip(pool, admin))]
pub async fn remove_owner(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    admin: IsSuperadmin,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let owner = delete_owner(conn, admin.0, path.into_inner()).await?;

    record(
        &pool,
        AuditEntry::new(admin.0, "owner.deleted", "user", owner.user_id)
            .with_details(json!({ "email": owner.email })),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}
