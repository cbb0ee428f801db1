use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::{
        audit::{record, AuditEntry},
        hours::{get_operating_hours, replace_operating_hours},
    },
    domain::{DayHours, WeeklyHours},
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

#[tracing::instrument("Getting branch hours", skip(pool))]
pub async fn get_hours(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let hours = get_operating_hours(conn, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(hours))
}

#[tracing::instrument("Replacing branch hours", skip(pool, user, days))]
pub async fn put_hours(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    days: web::Json<Vec<DayHours>>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let branch_id = path.into_inner();
    let week = WeeklyHours::parse(days.into_inner()).map_err(ApiError::BadRequest)?;

    let conn = get_pooled_connection(&pool).await?;
    let hours = replace_operating_hours(conn, user.user_id(), branch_id, week).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "hours.replaced", "branch", branch_id),
    )
    .await;

    Ok(HttpResponse::Ok().json(hours))
}
