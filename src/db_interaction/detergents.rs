use std::collections::HashMap;

use chrono::Utc;
use diesel::{Connection, ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl, SelectableHelper};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::authorization::load_grants,
    domain::DetergentKind,
    models::{BranchDetergentPrice, DetergentType, DetergentTypeChanges},
    schema::{branch_detergent_prices, detergent_types},
    telemetry::spawn_blocking_with_tracing,
    utils::DbConnection,
};

use super::{
    branches::{ensure_shop_exists, find_branch},
    StoreError,
};

pub struct NewDetergentType {
    pub name: String,
    pub kind: DetergentKind,
    pub price: f64,
}

// A detergent type as offered at one branch
#[derive(Serialize, Debug, Clone)]
pub struct BranchDetergent {
    pub detergent_type_id: Uuid,
    pub name: String,
    pub kind: String,
    pub default_price: f64,
    pub price: f64,
    pub is_overridden: bool,
}

fn find_detergent(conn: &mut PgConnection, detergent_type_id: Uuid) -> Result<DetergentType, StoreError> {
    detergent_types::table
        .find(detergent_type_id)
        .select(DetergentType::as_select())
        .get_result::<DetergentType>(conn)
        .map_err(StoreError::or_not_found("detergent"))
}

/// Effective prices of every detergent type of the branch's shop.
pub fn branch_detergents(
    conn: &mut PgConnection,
    shop_id: Uuid,
    branch_id: Uuid,
) -> Result<Vec<BranchDetergent>, StoreError> {
    let types = detergent_types::table
        .filter(detergent_types::shop_id.eq(shop_id))
        .order((detergent_types::kind.asc(), detergent_types::name.asc()))
        .select(DetergentType::as_select())
        .load::<DetergentType>(conn)?;

    let overrides: HashMap<Uuid, f64> = branch_detergent_prices::table
        .filter(branch_detergent_prices::branch_id.eq(branch_id))
        .select(BranchDetergentPrice::as_select())
        .load::<BranchDetergentPrice>(conn)?
        .into_iter()
        .map(|o| (o.detergent_type_id, o.price))
        .collect();

    Ok(merge_overrides(types, &overrides))
}

fn merge_overrides(types: Vec<DetergentType>, overrides: &HashMap<Uuid, f64>) -> Vec<BranchDetergent> {
    types
        .into_iter()
        .map(|t| {
            let override_price = overrides.get(&t.detergent_type_id).copied();
            BranchDetergent {
                detergent_type_id: t.detergent_type_id,
                name: t.name,
                kind: t.kind,
                default_price: t.price,
                price: override_price.unwrap_or(t.price),
                is_overridden: override_price.is_some(),
            }
        })
        .collect()
}

#[tracing::instrument("Listing detergents of shop", skip(conn))]
pub async fn list_detergents(
    mut conn: DbConnection,
    shop_id: Uuid,
) -> Result<Vec<DetergentType>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        ensure_shop_exists(&mut conn, shop_id)?;

        detergent_types::table
            .filter(detergent_types::shop_id.eq(shop_id))
            .order((detergent_types::kind.asc(), detergent_types::name.asc()))
            .select(DetergentType::as_select())
            .load::<DetergentType>(&mut conn)
            .map_err(StoreError::from)
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Listing detergents of branch", skip(conn))]
pub async fn list_branch_detergents(
    mut conn: DbConnection,
    branch_id: Uuid,
) -> Result<Vec<BranchDetergent>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        let branch = find_branch(&mut conn, branch_id)?;
        branch_detergents(&mut conn, branch.shop_id, branch_id)
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Creating detergent type", skip(conn, new_detergent))]
pub async fn create_detergent(
    mut conn: DbConnection,
    actor: Uuid,
    shop_id: Uuid,
    new_detergent: NewDetergentType,
) -> Result<DetergentType, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<DetergentType, StoreError, _>(|conn| {
            ensure_shop_exists(conn, shop_id)?;
            load_grants(conn, actor)?.require_shop_owner(shop_id)?;

            let detergent = DetergentType {
                detergent_type_id: Uuid::new_v4(),
                shop_id,
                name: new_detergent.name,
                kind: new_detergent.kind.as_str().to_string(),
                price: new_detergent.price,
                created_at: Utc::now(),
            };

            diesel::insert_into(detergent_types::table)
                .values(&detergent)
                .execute(conn)?;

            Ok(detergent)
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Updating detergent type", skip(conn, changes))]
pub async fn update_detergent(
    mut conn: DbConnection,
    actor: Uuid,
    detergent_type_id: Uuid,
    changes: DetergentTypeChanges,
) -> Result<DetergentType, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<DetergentType, StoreError, _>(|conn| {
            let detergent = find_detergent(conn, detergent_type_id)?;
            load_grants(conn, actor)?.require_shop_owner(detergent.shop_id)?;

            diesel::update(detergent_types::table.find(detergent_type_id))
                .set(&changes)
                .returning(DetergentType::as_returning())
                .get_result::<DetergentType>(conn)
                .map_err(StoreError::from)
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Deleting detergent type", skip(conn))]
pub async fn delete_detergent(
    mut conn: DbConnection,
    actor: Uuid,
    detergent_type_id: Uuid,
) -> Result<DetergentType, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<DetergentType, StoreError, _>(|conn| {
            let detergent = find_detergent(conn, detergent_type_id)?;
            load_grants(conn, actor)?.require_shop_owner(detergent.shop_id)?;

            diesel::delete(detergent_types::table.find(detergent_type_id)).execute(conn)?;

            Ok(detergent)
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Setting branch detergent price", skip(conn))]
pub async fn set_branch_price(
    mut conn: DbConnection,
    actor: Uuid,
    branch_id: Uuid,
    detergent_type_id: Uuid,
    price: f64,
) -> Result<BranchDetergentPrice, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<BranchDetergentPrice, StoreError, _>(|conn| {
            let branch = find_branch(conn, branch_id)?;
            load_grants(conn, actor)?.require_shop_owner(branch.shop_id)?;

            let detergent = find_detergent(conn, detergent_type_id)?;
            if detergent.shop_id != branch.shop_id {
                return Err(StoreError::NotFound("detergent"));
            }

            let row = BranchDetergentPrice {
                branch_id,
                detergent_type_id,
                price,
            };

            diesel::insert_into(branch_detergent_prices::table)
                .values(&row)
                .on_conflict((
                    branch_detergent_prices::branch_id,
                    branch_detergent_prices::detergent_type_id,
                ))
                .do_update()
                .set(branch_detergent_prices::price.eq(price))
                .execute(conn)?;

            Ok(row)
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Clearing branch detergent price", skip(conn))]
pub async fn clear_branch_price(
    mut conn: DbConnection,
    actor: Uuid,
    branch_id: Uuid,
    detergent_type_id: Uuid,
) -> Result<(), StoreError> {
    spawn_blocking_with_tracing(move || {
        conn.transaction::<(), StoreError, _>(|conn| {
            let branch = find_branch(conn, branch_id)?;
            load_grants(conn, actor)?.require_shop_owner(branch.shop_id)?;

            let deleted = diesel::delete(
                branch_detergent_prices::table.find((branch_id, detergent_type_id)),
            )
            .execute(conn)?;

            if deleted == 0 {
                return Err(StoreError::NotFound("price override"));
            }
            Ok(())
        })
    })
    .await??;

    Ok(())
}
