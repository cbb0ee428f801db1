use chrono::Utc;
use diesel::{Connection, ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl, SelectableHelper};
use uuid::Uuid;

use crate::{
    auth::authorization::load_grants,
    domain::ServiceUnit,
    models::{Service, ServiceChanges},
    schema::services,
    telemetry::spawn_blocking_with_tracing,
    utils::DbConnection,
};

use super::{branches::ensure_shop_exists, StoreError};

pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub unit: ServiceUnit,
    pub price: f64,
}

fn find_service(conn: &mut PgConnection, service_id: Uuid) -> Result<Service, StoreError> {
    services::table
        .find(service_id)
        .select(Service::as_select())
        .get_result::<Service>(conn)
        .map_err(StoreError::or_not_found("service"))
}

#[tracing::instrument("Listing services of shop", skip(conn))]
pub async fn list_services(
    mut conn: DbConnection,
    shop_id: Uuid,
    include_inactive: bool,
) -> Result<Vec<Service>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        ensure_shop_exists(&mut conn, shop_id)?;

        let mut query = services::table
            .filter(services::shop_id.eq(shop_id))
            .into_boxed();

        if !include_inactive {
            query = query.filter(services::is_active.eq(true));
        }

        query
            .order(services::name.asc())
            .select(Service::as_select())
            .load::<Service>(&mut conn)
            .map_err(StoreError::from)
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Creating service", skip(conn, new_service))]
pub async fn create_service(
    mut conn: DbConnection,
    actor: Uuid,
    shop_id: Uuid,
    new_service: NewService,
) -> Result<Service, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Service, StoreError, _>(|conn| {
            ensure_shop_exists(conn, shop_id)?;
            load_grants(conn, actor)?.require_shop_owner(shop_id)?;

            let service = Service {
                service_id: Uuid::new_v4(),
                shop_id,
                name: new_service.name,
                description: new_service.description,
                unit: new_service.unit.as_str().to_string(),
                price: new_service.price,
                is_active: true,
                created_at: Utc::now(),
            };

            diesel::insert_into(services::table)
                .values(&service)
                .execute(conn)?;

            Ok(service)
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Updating service", skip(conn, changes))]
pub async fn update_service(
    mut conn: DbConnection,
    actor: Uuid,
    service_id: Uuid,
    changes: ServiceChanges,
) -> Result<Service, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Service, StoreError, _>(|conn| {
            let service = find_service(conn, service_id)?;
            load_grants(conn, actor)?.require_shop_owner(service.shop_id)?;

            diesel::update(services::table.find(service_id))
                .set(&changes)
                .returning(Service::as_returning())
                .get_result::<Service>(conn)
                .map_err(StoreError::from)
        })
    })
    .await??;

    Ok(res)
}

// Fails with a conflict while working orders still reference the service
#[tracing::instrument("Deleting service", skip(conn))]
pub async fn delete_service(
    mut conn: DbConnection,
    actor: Uuid,
    service_id: Uuid,
) -> Result<Service, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Service, StoreError, _>(|conn| {
            let service = find_service(conn, service_id)?;
            load_grants(conn, actor)?.require_shop_owner(service.shop_id)?;

            diesel::delete(services::table.find(service_id)).execute(conn)?;

            Ok(service)
        })
    })
    .await??;

    Ok(res)
}
