use chrono::{DateTime, Utc};
use diesel::{
    prelude::Queryable, Connection, ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::authorization::load_grants,
    domain::Role,
    schema::{role_assignments, users},
    telemetry::spawn_blocking_with_tracing,
    utils::DbConnection,
};

use super::{
    branches::find_branch,
    user::{assign_role, find_user_by_email, insert_user, NewUser},
    StoreError,
};

const STAFF_ROLES: [Role; 2] = [Role::Employee, Role::Delivery];

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct StaffMember {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: String,
    pub assigned_at: DateTime<Utc>,
}

fn staff_role_names() -> Vec<&'static str> {
    STAFF_ROLES.iter().map(Role::as_str).collect()
}

fn find_staff_member(
    conn: &mut PgConnection,
    branch_id: Uuid,
    user_id: Uuid,
    role: Role,
) -> Result<StaffMember, diesel::result::Error> {
    role_assignments::table
        .inner_join(users::table)
        .filter(role_assignments::branch_id.eq(branch_id))
        .filter(role_assignments::user_id.eq(user_id))
        .filter(role_assignments::role_name.eq(role.as_str()))
        .select((
            users::user_id,
            users::name,
            users::email,
            users::phone_number,
            role_assignments::role_name,
            role_assignments::created_at,
        ))
        .get_result::<StaffMember>(conn)
}

#[tracing::instrument("Listing staff of branch", skip(conn))]
pub async fn list_staff(
    mut conn: DbConnection,
    actor: Uuid,
    branch_id: Uuid,
) -> Result<Vec<StaffMember>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        let branch = find_branch(&mut conn, branch_id)?;
        load_grants(&mut conn, actor)?.require_branch_staff(
            branch.shop_id,
            branch_id,
            &STAFF_ROLES,
        )?;

        role_assignments::table
            .inner_join(users::table)
            .filter(role_assignments::branch_id.eq(branch_id))
            .filter(role_assignments::role_name.eq_any(staff_role_names()))
            .order(users::name.asc())
            .select((
                users::user_id,
                users::name,
                users::email,
                users::phone_number,
                role_assignments::role_name,
                role_assignments::created_at,
            ))
            .load::<StaffMember>(&mut conn)
            .map_err(StoreError::from)
    })
    .await??;

    Ok(res)
}

// An account that already exists for the email is reused as is; the
// supplied password only applies to newly created users.
#[tracing::instrument("Adding staff member", skip(conn, new_user))]
pub async fn add_staff(
    mut conn: DbConnection,
    actor: Uuid,
    branch_id: Uuid,
    new_user: NewUser,
    role: Role,
) -> Result<StaffMember, StoreError> {
    if !role.is_branch_staff() {
        return Err(StoreError::InvalidInput(format!(
            "{} is not a staff role",
            role
        )));
    }

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<StaffMember, StoreError, _>(|conn| {
            let branch = find_branch(conn, branch_id)?;
            load_grants(conn, actor)?.require_shop_owner(branch.shop_id)?;

            let user_id = match find_user_by_email(conn, &new_user.email)? {
                Some(user) => user.user_id,
                None => insert_user(conn, new_user)?.user_id,
            };
            assign_role(conn, user_id, role, Some(branch.shop_id), Some(branch_id))?;

            find_staff_member(conn, branch_id, user_id, role).map_err(StoreError::from)
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Removing staff member", skip(conn))]
pub async fn remove_staff(
    mut conn: DbConnection,
    actor: Uuid,
    branch_id: Uuid,
    user_id: Uuid,
) -> Result<usize, StoreError> {
    let removed = spawn_blocking_with_tracing(move || {
        conn.transaction::<usize, StoreError, _>(|conn| {
            let branch = find_branch(conn, branch_id)?;
            load_grants(conn, actor)?.require_shop_owner(branch.shop_id)?;

            let removed = diesel::delete(
                role_assignments::table
                    .filter(role_assignments::branch_id.eq(branch_id))
                    .filter(role_assignments::user_id.eq(user_id))
                    .filter(role_assignments::role_name.eq_any(staff_role_names())),
            )
            .execute(conn)?;

            if removed == 0 {
                return Err(StoreError::NotFound("staff member"));
            }
            Ok(removed)
        })
    })
    .await??;

    Ok(removed)
}
