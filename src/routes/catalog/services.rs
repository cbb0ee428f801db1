use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::{
        audit::{record, AuditEntry},
        services::{create_service, delete_service, list_services, update_service, NewService},
    },
    domain::{detergent::parse_price, RequiredText, ServiceUnit},
    models::ServiceChanges,
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct ServiceQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Deserialize, Debug)]
pub struct ServiceForm {
    pub name: String,
    pub description: Option<String>,
    pub unit: ServiceUnit,
    pub price: f64,
}

#[derive(Deserialize, Debug, Default)]
pub struct ServiceChangesForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<ServiceUnit>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

impl TryFrom<ServiceForm> for NewService {
    type Error = String;

    fn try_from(form: ServiceForm) -> Result<Self, Self::Error> {
        Ok(NewService {
            name: RequiredText::parse("name", form.name, 100)?.into_inner(),
            description: form.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            unit: form.unit,
            price: parse_price(form.price)?,
        })
    }
}

impl TryFrom<ServiceChangesForm> for ServiceChanges {
    type Error = String;

    fn try_from(form: ServiceChangesForm) -> Result<Self, Self::Error> {
        Ok(ServiceChanges {
            name: form
                .name
                .map(|n| RequiredText::parse("name", n, 100).map(RequiredText::into_inner))
                .transpose()?,
            description: form.description.map(|d| d.trim().to_string()),
            unit: form.unit.map(|u| u.as_str().to_string()),
            price: form.price.map(parse_price).transpose()?,
            is_active: form.is_active,
        })
    }
}

#[tracing::instrument("Listing services", skip(pool))]
pub async fn get_services(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    query: web::Query<ServiceQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let services = list_services(conn, path.into_inner(), query.include_inactive).await?;

    Ok(HttpResponse::Ok().json(services))
}

#[tracing::instrument("Creating service", skip(pool, user, form))]
pub async fn post_service(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<ServiceForm>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let new_service = NewService::try_from(form.0).map_err(ApiError::BadRequest)?;

    let conn = get_pooled_connection(&pool).await?;
    let service = create_service(conn, user.user_id(), path.into_inner(), new_service).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "service.created", "service", service.service_id)
            .with_details(json!({ "name": service.name, "price": service.price })),
    )
    .await;

    Ok(HttpResponse::Created().json(service))
}

#[tracing::instrument("Updating service", skip(pool, user, form))]
pub async fn patch_service(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<ServiceChangesForm>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let changes = ServiceChanges::try_from(form.0).map_err(ApiError::BadRequest)?;

    let conn = get_pooled_connection(&pool).await?;
    let service = update_service(conn, user.user_id(), path.into_inner(), changes).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "service.updated", "service", service.service_id),
    )
    .await;

    Ok(HttpResponse::Ok().json(service))
}

#[tracing::instrument("Deleting service", skip(pool, user))]
pub async fn remove_service(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let service = delete_service(conn, user.user_id(), path.into_inner()).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "service.deleted", "service", service.service_id)
            .with_details(json!({ "name": service.name })),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}
