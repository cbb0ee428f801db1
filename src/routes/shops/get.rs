use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::shops::{get_shop, list_shops_for},
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

// Shops the caller owns, or every shop for a platform administrator
#[tracing::instrument("Listing shops", skip(pool, user))]
pub async fn get_shops(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let shops = list_shops_for(conn, user.user_id()).await?;

    Ok(HttpResponse::Ok().json(shops))
}

#[tracing::instrument("Getting shop", skip(pool, user))]
pub async fn get_shop_by_id(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let shop = get_shop(conn, user.user_id(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(shop))
}
