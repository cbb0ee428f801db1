use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::orders::{create_order, NewOrder},
    domain::{phone_number::parse_optional_phone, Fulfillment, RequestedLine},
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct OrderForm {
    pub fulfillment: Fulfillment,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<RequestedLine>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl TryFrom<OrderForm> for NewOrder {
    type Error = String;

    fn try_from(form: OrderForm) -> Result<Self, Self::Error> {
        if form.items.is_empty() {
            return Err("an order needs at least one item".to_string());
        }

        Ok(NewOrder {
            fulfillment: form.fulfillment,
            customer_name: trimmed(form.customer_name),
            customer_phone: parse_optional_phone(form.customer_phone)?,
            delivery_address: trimmed(form.delivery_address),
            notes: trimmed(form.notes),
            items: form.items,
        })
    }
}

// Customers order for themselves; branch staff record walk-in orders
#[tracing::instrument("Placing order", skip(pool, user, form))]
pub async fn post_order(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<OrderForm>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let new_order = NewOrder::try_from(form.0).map_err(ApiError::BadRequest)?;

    let conn = get_pooled_connection(&pool).await?;
    let order = create_order(conn, user.user_id(), path.into_inner(), new_order).await?;

    Ok(HttpResponse::Created().json(order))
}
