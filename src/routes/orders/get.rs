use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::orders::{
        get_order, list_branch_orders, list_customer_orders, list_delivery_orders, OrderQueue,
    },
    routes::ApiError,
    utils::{get_pooled_connection, DbPool, Pagination},
};

#[derive(Deserialize, Debug)]
pub struct QueueQuery {
    pub queue: Option<OrderQueue>,
}

#[tracing::instrument("Listing branch orders", skip(pool, user))]
pub async fn get_branch_orders(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    query: web::Query<QueueQuery>,
    pagination: web::Query<Pagination>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let queue = query.queue.unwrap_or(OrderQueue::Incoming);

    let conn = get_pooled_connection(&pool).await?;
    let orders =
        list_branch_orders(conn, user.user_id(), path.into_inner(), queue, pagination.0).await?;

    Ok(HttpResponse::Ok().json(orders))
}

#[tracing::instrument("Getting order", skip(pool, user))]
pub async fn get_order_by_id(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let order = get_order(conn, user.user_id(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(order))
}

#[tracing::instrument("Listing own orders", skip(pool, user))]
pub async fn get_my_orders(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let orders = list_customer_orders(conn, user.user_id()).await?;

    Ok(HttpResponse::Ok().json(orders))
}

#[tracing::instrument("Listing orders out for delivery", skip(pool, user))]
pub async fn get_delivery_orders(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let orders = list_delivery_orders(conn, user.user_id()).await?;

    Ok(HttpResponse::Ok().json(orders))
}
