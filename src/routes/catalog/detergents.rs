use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::{
        audit::{record, AuditEntry},
        detergents::{
            clear_branch_price, create_detergent, delete_detergent, list_branch_detergents,
            list_detergents, set_branch_price, update_detergent, NewDetergentType,
        },
    },
    domain::{detergent::parse_price, DetergentKind, RequiredText},
    models::DetergentTypeChanges,
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct DetergentForm {
    pub name: String,
    pub kind: DetergentKind,
    pub price: f64,
}

#[derive(Deserialize, Debug, Default)]
pub struct DetergentChangesForm {
    pub name: Option<String>,
    pub kind: Option<DetergentKind>,
    pub price: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct PriceForm {
    pub price: f64,
}

impl TryFrom<DetergentForm> for NewDetergentType {
    type Error = String;

    fn try_from(form: DetergentForm) -> Result<Self, Self::Error> {
        Ok(NewDetergentType {
            name: RequiredText::parse("name", form.name, 100)?.into_inner(),
            kind: form.kind,
            price: parse_price(form.price)?,
        })
    }
}

impl TryFrom<DetergentChangesForm> for DetergentTypeChanges {
    type Error = String;

    fn try_from(form: DetergentChangesForm) -> Result<Self, Self::Error> {
        Ok(DetergentTypeChanges {
            name: form
                .name
                .map(|n| RequiredText::parse("name", n, 100).map(RequiredText::into_inner))
                .transpose()?,
            kind: form.kind.map(|k| k.as_str().to_string()),
            price: form.price.map(parse_price).transpose()?,
        })
    }
}

#[tracing::instrument("Listing detergents", skip(pool))]
pub async fn get_detergents(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let detergents = list_detergents(conn, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(detergents))
}

#[tracing::instrument("Listing branch detergent prices", skip(pool))]
pub async fn get_branch_detergents(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let detergents = list_branch_detergents(conn, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(detergents))
}

#[tracing::instrument("Creating detergent", skip(pool, user, form))]
pub async fn post_detergent(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<DetergentForm>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let new_detergent = NewDetergentType::try_from(form.0).map_err(ApiError::BadRequest)?;

    let conn = get_pooled_connection(&pool).await?;
    let detergent = create_detergent(conn, user.user_id(), path.into_inner(), new_detergent).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "detergent.created", "detergent_type", detergent.detergent_type_id)
            .with_details(json!({ "name": detergent.name, "kind": detergent.kind })),
    )
    .await;

    Ok(HttpResponse::Created().json(detergent))
}

#[tracing::instrument("Updating detergent", skip(pool, user, form))]
pub async fn patch_detergent(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<DetergentChangesForm>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let changes = DetergentTypeChanges::try_from(form.0).map_err(ApiError::BadRequest)?;

    let conn = get_pooled_connection(&pool).await?;
    let detergent = update_detergent(conn, user.user_id(), path.into_inner(), changes).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "detergent.updated", "detergent_type", detergent.detergent_type_id),
    )
    .await;

    Ok(HttpResponse::Ok().json(detergent))
}

#[tracing::instrument("Deleting detergent", skip(pool, user))]
pub async fn remove_detergent(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let detergent = delete_detergent(conn, user.user_id(), path.into_inner()).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "detergent.deleted", "detergent_type", detergent.detergent_type_id)
            .with_details(json!({ "name": detergent.name })),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}

#[tracing::instrument("Setting branch detergent price", skip(pool, user, form))]
pub async fn put_branch_price(
    pool: web::Data<DbPool>,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Json<PriceForm>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let (branch_id, detergent_type_id) = path.into_inner();
    let price = parse_price(form.price).map_err(ApiError::BadRequest)?;

    let conn = get_pooled_connection(&pool).await?;
    let row = set_branch_price(conn, user.user_id(), branch_id, detergent_type_id, price).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "detergent.price_set", "branch", branch_id)
            .with_details(json!({ "detergent_type_id": detergent_type_id, "price": price })),
    )
    .await;

    Ok(HttpResponse::Ok().json(row))
}

#[tracing::instrument("Clearing branch detergent price", skip(pool, user))]
pub async fn delete_branch_price(
    pool: web::Data<DbPool>,
    path: web::Path<(Uuid, Uuid)>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let (branch_id, detergent_type_id) = path.into_inner();

    let conn = get_pooled_connection(&pool).await?;
    clear_branch_price(conn, user.user_id(), branch_id, detergent_type_id).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "detergent.price_cleared", "branch", branch_id)
            .with_details(json!({ "detergent_type_id": detergent_type_id })),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}
