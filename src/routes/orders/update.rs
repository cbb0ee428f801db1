use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::{
        audit::{record, AuditEntry},
        orders::{accept_order, advance_order},
    },
    domain::OrderStatus,
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct AdvanceForm {
    // Status the caller saw; a mismatch means someone else moved the order
    pub expected_status: Option<OrderStatus>,
}

// An empty body advances without a guard; anything else must be a valid form
fn expected_status(body: &[u8]) -> Result<Option<OrderStatus>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let form: AdvanceForm = serde_json::from_slice(body).map_err(ApiError::bad_request)?;
    Ok(form.expected_status)
}

#[tracing::instrument("Accepting order", skip(pool, user))]
pub async fn post_accept_order(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let order = accept_order(conn, user.user_id(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(order))
}

#[tracing::instrument("Advancing order", skip(pool, user, body))]
pub async fn post_advance_order(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Bytes,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let expected = expected_status(&body)?;

    let conn = get_pooled_connection(&pool).await?;
    let advanced = advance_order(conn, user.user_id(), path.into_inner(), expected).await?;

    if advanced.status == OrderStatus::Completed {
        record(
            &pool,
            AuditEntry::new(user.user_id(), "order.completed", "order", advanced.order_id)
                .with_details(json!({ "previous_status": advanced.previous_status })),
        )
        .await;
    }

    Ok(HttpResponse::Ok().json(advanced))
}
