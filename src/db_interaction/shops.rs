use diesel::{Connection, ExpressionMethods, QueryDsl, RunQueryDsl, SelectableHelper};
use uuid::Uuid;

use crate::{
    auth::authorization::load_grants,
    models::{Shop, ShopChanges},
    schema::shops,
    telemetry::spawn_blocking_with_tracing,
    utils::DbConnection,
};

use super::StoreError;

#[tracing::instrument("Listing shops of caller", skip(conn))]
pub async fn list_shops_for(mut conn: DbConnection, actor: Uuid) -> Result<Vec<Shop>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        let grants = load_grants(&mut conn, actor)?;

        let mut query = shops::table.into_boxed();
        if !grants.is_superadmin() {
            query = query.filter(shops::shop_id.eq_any(grants.owned_shops()));
        }

        query
            .order(shops::name.asc())
            .select(Shop::as_select())
            .load::<Shop>(&mut conn)
            .map_err(StoreError::from)
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Getting shop", skip(conn))]
pub async fn get_shop(mut conn: DbConnection, actor: Uuid, shop_id: Uuid) -> Result<Shop, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        let shop = shops::table
            .find(shop_id)
            .select(Shop::as_select())
            .get_result::<Shop>(&mut conn)
            .map_err(StoreError::or_not_found("shop"))?;

        load_grants(&mut conn, actor)?.require_shop_member(shop_id)?;

        Ok::<_, StoreError>(shop)
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Updating shop", skip(conn, changes))]
pub async fn update_shop(
    mut conn: DbConnection,
    actor: Uuid,
    shop_id: Uuid,
    changes: ShopChanges,
) -> Result<Shop, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Shop, StoreError, _>(|conn| {
            super::branches::ensure_shop_exists(conn, shop_id)?;
            load_grants(conn, actor)?.require_shop_owner(shop_id)?;

            diesel::update(shops::table.find(shop_id))
                .set(&changes)
                .returning(Shop::as_returning())
                .get_result::<Shop>(conn)
                .map_err(StoreError::from)
        })
    })
    .await??;

    Ok(res)
}

// Branches, catalog, staff assignments and orders cascade with the shop
#[tracing::instrument("Deleting shop", skip(conn))]
pub async fn delete_shop(mut conn: DbConnection, actor: Uuid, shop_id: Uuid) -> Result<Shop, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Shop, StoreError, _>(|conn| {
            load_grants(conn, actor)?.require_superadmin()?;

            diesel::delete(shops::table.find(shop_id))
                .returning(Shop::as_returning())
                .get_result::<Shop>(conn)
                .map_err(StoreError::or_not_found("shop"))
        })
    })
    .await??;

    Ok(res)
}
