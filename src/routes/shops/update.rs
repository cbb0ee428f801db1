use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::{
        audit::{record, AuditEntry},
        shops::update_shop,
    },
    domain::ShopName,
    models::ShopChanges,
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct ShopForm {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<ShopForm> for ShopChanges {
    type Error = String;

    fn try_from(form: ShopForm) -> Result<Self, Self::Error> {
        if form.name.is_none() && form.description.is_none() {
            return Err("nothing to update".to_string());
        }

        Ok(ShopChanges {
            name: form
                .name
                .map(|n| ShopName::parse(n).map(ShopName::into_inner))
                .transpose()?,
            description: form.description.map(|d| d.trim().to_string()),
        })
    }
}

#[tracing::instrument("Updating shop", skip(pool, user, form))]
pub async fn patch_shop(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<ShopForm>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let changes = ShopChanges::try_from(form.0).map_err(ApiError::BadRequest)?;

    let conn = get_pooled_connection(&pool).await?;
    let shop = update_shop(conn, user.user_id(), path.into_inner(), changes).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "shop.updated", "shop", shop.shop_id)
            .with_details(json!({ "name": shop.name })),
    )
    .await;

    Ok(HttpResponse::Ok().json(shop))
}
