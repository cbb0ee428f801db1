use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::extractors::IsSuperadmin,
    db_interaction::{
        admin::list_all_shops,
        audit::{record, AuditEntry},
        shops::delete_shop,
    },
    routes::ApiError,
    utils::{get_pooled_connection, DbPool, Pagination},
};

#[tracing::instrument("Listing every shop", skip(pool, _admin))]
pub async fn get_all_shops(
    pool: web::Data<DbPool>,
    pagination: web::Query<Pagination>,
    _admin: IsSuperadmin,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let shops = list_all_shops(conn, pagination.0).await?;

    Ok(HttpResponse::Ok().json(shops))
}

#[tracing::instrument("Deleting shop", skip(pool, admin))]
pub async fn remove_shop(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    admin: IsSuperadmin,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let shop = delete_shop(conn, admin.0, path.into_inner()).await?;

    record(
        &pool,
        AuditEntry::new(admin.0, "shop.deleted", "shop", shop.shop_id)
            .with_details(json!({ "name": shop.name })),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}
