use chrono::Utc;
use diesel::{Connection, ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl, SelectableHelper};
use uuid::Uuid;

use crate::{
    auth::authorization::load_grants,
    domain::WeeklyHours,
    models::{Branch, BranchChanges},
    schema::{branches, operating_hours, shops},
    telemetry::spawn_blocking_with_tracing,
    utils::DbConnection,
};

use super::StoreError;

pub struct NewBranch {
    pub name: String,
    pub address: String,
    pub phone_number: Option<String>,
}

pub fn find_branch(conn: &mut PgConnection, branch_id: Uuid) -> Result<Branch, StoreError> {
    branches::table
        .find(branch_id)
        .select(Branch::as_select())
        .get_result::<Branch>(conn)
        .map_err(StoreError::or_not_found("branch"))
}

pub fn ensure_shop_exists(conn: &mut PgConnection, shop_id: Uuid) -> Result<(), StoreError> {
    shops::table
        .find(shop_id)
        .select(shops::shop_id)
        .get_result::<Uuid>(conn)
        .map_err(StoreError::or_not_found("shop"))?;
    Ok(())
}

// Inserts the branch together with its default week of operating hours
pub fn insert_branch(
    conn: &mut PgConnection,
    shop_id: Uuid,
    new_branch: NewBranch,
) -> Result<Branch, StoreError> {
    let branch = Branch {
        branch_id: Uuid::new_v4(),
        shop_id,
        name: new_branch.name,
        address: new_branch.address,
        phone_number: new_branch.phone_number,
        created_at: Utc::now(),
    };

    diesel::insert_into(branches::table)
        .values(&branch)
        .execute(conn)?;

    diesel::insert_into(operating_hours::table)
        .values(WeeklyHours::default_week().into_rows(branch.branch_id))
        .execute(conn)?;

    Ok(branch)
}

#[tracing::instrument("Listing branches of shop", skip(conn))]
pub async fn list_branches(
    mut conn: DbConnection,
    shop_id: Uuid,
) -> Result<Vec<Branch>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        ensure_shop_exists(&mut conn, shop_id)?;

        branches::table
            .filter(branches::shop_id.eq(shop_id))
            .order(branches::created_at.asc())
            .select(Branch::as_select())
            .load::<Branch>(&mut conn)
            .map_err(StoreError::from)
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Getting branch", skip(conn))]
pub async fn get_branch(mut conn: DbConnection, branch_id: Uuid) -> Result<Branch, StoreError> {
    let res = spawn_blocking_with_tracing(move || find_branch(&mut conn, branch_id)).await??;
    Ok(res)
}

#[tracing::instrument("Creating branch", skip(conn, new_branch))]
pub async fn create_branch(
    mut conn: DbConnection,
    actor: Uuid,
    shop_id: Uuid,
    new_branch: NewBranch,
) -> Result<Branch, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Branch, StoreError, _>(|conn| {
            ensure_shop_exists(conn, shop_id)?;
            load_grants(conn, actor)?.require_shop_owner(shop_id)?;
            insert_branch(conn, shop_id, new_branch)
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Updating branch", skip(conn, changes))]
pub async fn update_branch(
    mut conn: DbConnection,
    actor: Uuid,
    branch_id: Uuid,
    changes: BranchChanges,
) -> Result<Branch, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Branch, StoreError, _>(|conn| {
            let branch = find_branch(conn, branch_id)?;
            load_grants(conn, actor)?.require_shop_owner(branch.shop_id)?;

            diesel::update(branches::table.find(branch_id))
                .set(&changes)
                .returning(Branch::as_returning())
                .get_result::<Branch>(conn)
                .map_err(StoreError::from)
        })
    })
    .await??;

    Ok(res)
}

// Services overrides, hours, staff assignments and working orders go with
// the branch through ON DELETE CASCADE; history rows keep a NULL branch.
#[tracing::instrument("Deleting branch", skip(conn))]
pub async fn delete_branch(
    mut conn: DbConnection,
    actor: Uuid,
    branch_id: Uuid,
) -> Result<Branch, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Branch, StoreError, _>(|conn| {
            let branch = find_branch(conn, branch_id)?;
            load_grants(conn, actor)?.require_shop_owner(branch.shop_id)?;

            diesel::delete(branches::table.find(branch_id)).execute(conn)?;

            Ok(branch)
        })
    })
    .await??;

    Ok(res)
}
