use std::collections::HashMap;

use diesel::{Connection, ExpressionMethods, QueryDsl, RunQueryDsl, SelectableHelper};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::authorization::load_grants,
    domain::Role,
    models::{Shop, UserProfileInfo},
    schema::{role_assignments, shops, users},
    telemetry::spawn_blocking_with_tracing,
    utils::{DbConnection, Pagination},
};

use super::StoreError;

#[derive(Serialize, Debug, Clone)]
pub struct ShopWithOwner {
    #[serde(flatten)]
    pub shop: Shop,
    pub owner_name: String,
    pub owner_email: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OwnedShop {
    pub shop_id: Uuid,
    pub name: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct OwnerSummary {
    #[serde(flatten)]
    pub owner: UserProfileInfo,
    pub shops: Vec<OwnedShop>,
}

#[tracing::instrument("Listing all shops", skip(conn))]
pub async fn list_all_shops(
    mut conn: DbConnection,
    pagination: Pagination,
) -> Result<Vec<ShopWithOwner>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        let rows = shops::table
            .inner_join(users::table)
            .order(shops::created_at.desc())
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select((Shop::as_select(), users::name, users::email))
            .load::<(Shop, String, String)>(&mut conn)?;

        Ok::<_, StoreError>(
            rows.into_iter()
                .map(|(shop, owner_name, owner_email)| ShopWithOwner {
                    shop,
                    owner_name,
                    owner_email,
                })
                .collect(),
        )
    })
    .await??;

    Ok(res)
}

fn group_shops(owners: Vec<UserProfileInfo>, shops: Vec<(Uuid, Uuid, String)>) -> Vec<OwnerSummary> {
    let mut by_owner: HashMap<Uuid, Vec<OwnedShop>> = HashMap::new();
    for (shop_id, owner_id, name) in shops {
        by_owner
            .entry(owner_id)
            .or_default()
            .push(OwnedShop { shop_id, name });
    }

    owners
        .into_iter()
        .map(|owner| OwnerSummary {
            shops: by_owner.remove(&owner.user_id).unwrap_or_default(),
            owner,
        })
        .collect()
}

#[tracing::instrument("Listing shop owners", skip(conn))]
pub async fn list_owners(
    mut conn: DbConnection,
    pagination: Pagination,
) -> Result<Vec<OwnerSummary>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        let owner_ids = role_assignments::table
            .filter(role_assignments::role_name.eq(Role::Owner.as_str()))
            .select(role_assignments::user_id);

        let owners = users::table
            .filter(users::user_id.eq_any(owner_ids))
            .order(users::name.asc())
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(UserProfileInfo::as_select())
            .load::<UserProfileInfo>(&mut conn)?;

        let ids: Vec<Uuid> = owners.iter().map(|o| o.user_id).collect();
        let owned = shops::table
            .filter(shops::owner_id.eq_any(ids))
            .order(shops::name.asc())
            .select((shops::shop_id, shops::owner_id, shops::name))
            .load::<(Uuid, Uuid, String)>(&mut conn)?;

        Ok::<_, StoreError>(group_shops(owners, owned))
    })
    .await??;

    Ok(res)
}

// Shops owned by the user, and everything under them, cascade with the user row
#[tracing::instrument("Deleting shop owner", skip(conn))]
pub async fn delete_owner(
    mut conn: DbConnection,
    actor: Uuid,
    owner_id: Uuid,
) -> Result<UserProfileInfo, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<UserProfileInfo, StoreError, _>(|conn| {
            load_grants(conn, actor)?.require_superadmin()?;

            let target = load_grants(conn, owner_id)?;
            if target.is_superadmin() {
                return Err(StoreError::Conflict(
                    "platform administrators cannot be deleted".to_string(),
                ));
            }
            if !target.has_role(Role::Owner) {
                return Err(StoreError::NotFound("owner"));
            }

            diesel::delete(users::table.find(owner_id))
                .returning(UserProfileInfo::as_returning())
                .get_result::<UserProfileInfo>(conn)
                .map_err(StoreError::or_not_found("owner"))
        })
    })
    .await??;

    Ok(res)
}
