use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{
    db_interaction::branches::{get_branch, list_branches},
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

// Public so customers can pick a branch to order from
#[tracing::instrument("Listing branches", skip(pool))]
pub async fn get_branches(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let branches = list_branches(conn, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(branches))
}

#[tracing::instrument("Getting branch", skip(pool))]
pub async fn get_branch_by_id(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let branch = get_branch(conn, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(branch))
}
