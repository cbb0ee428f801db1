use chrono::Utc;
use diesel::{Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl, SelectableHelper};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::{
    auth::authorization::{load_grants, Grants},
    domain::Role,
    models::{RoleAssignment, User, UserProfileChanges, UserProfileInfo},
    schema::{role_assignments, users},
    telemetry::spawn_blocking_with_tracing,
    utils::DbConnection,
};

use super::StoreError;

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: SecretString,
    pub phone_number: Option<String>,
}

pub fn find_user_by_email(
    conn: &mut PgConnection,
    email: &str,
) -> Result<Option<User>, diesel::result::Error> {
    users::table
        .filter(users::email.eq(email))
        .select(User::as_select())
        .first::<User>(conn)
        .optional()
}

// Inserts the user row only; callers add the role assignments
pub fn insert_user(conn: &mut PgConnection, new_user: NewUser) -> Result<User, StoreError> {
    let user = User {
        user_id: Uuid::new_v4(),
        name: new_user.name,
        email: new_user.email,
        password: new_user.password_hash.expose_secret().to_string(),
        phone_number: new_user.phone_number,
        address: None,
        created_at: Utc::now(),
    };

    diesel::insert_into(users::table)
        .values(&user)
        .execute(conn)?;

    Ok(user)
}

pub fn assign_role(
    conn: &mut PgConnection,
    user_id: Uuid,
    role: Role,
    shop_id: Option<Uuid>,
    branch_id: Option<Uuid>,
) -> Result<RoleAssignment, StoreError> {
    let assignment = RoleAssignment {
        assignment_id: Uuid::new_v4(),
        user_id,
        role_name: role.as_str().to_string(),
        shop_id,
        branch_id,
        created_at: Utc::now(),
    };

    diesel::insert_into(role_assignments::table)
        .values(&assignment)
        .execute(conn)?;

    Ok(assignment)
}

// Function to query user, with their role assignments, from email id
#[tracing::instrument("Getting login info from email", skip(conn))]
pub async fn get_login_info(
    mut conn: DbConnection,
    email: String,
) -> Result<Option<(User, Grants)>, StoreError> {
    let res = spawn_blocking_with_tracing(move || -> Result<Option<(User, Grants)>, StoreError> {
        let user = match find_user_by_email(&mut conn, &email)? {
            Some(user) => user,
            None => return Ok(None),
        };
        let grants = load_grants(&mut conn, user.user_id)?;
        Ok(Some((user, grants)))
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Inserting customer into the database", skip(conn, new_user))]
pub async fn insert_customer(
    mut conn: DbConnection,
    new_user: NewUser,
) -> Result<Uuid, StoreError> {
    let user_id = spawn_blocking_with_tracing(move || {
        conn.transaction::<_, StoreError, _>(|conn| {
            let user = insert_user(conn, new_user)?;
            assign_role(conn, user.user_id, Role::Customer, None, None)?;
            Ok(user.user_id)
        })
    })
    .await??;

    Ok(user_id)
}

#[tracing::instrument("Get profile data of logged in user", skip(conn))]
pub async fn get_user_profile_info(
    mut conn: DbConnection,
    user_id: Uuid,
) -> Result<UserProfileInfo, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        users::table
            .find(user_id)
            .select(UserProfileInfo::as_select())
            .get_result::<UserProfileInfo>(&mut conn)
            .map_err(StoreError::or_not_found("user"))
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Updating user profile info in db", skip_all)]
pub async fn update_user_profile_info(
    mut conn: DbConnection,
    user_id: Uuid,
    changes: UserProfileChanges,
) -> Result<UserProfileInfo, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        diesel::update(users::table.find(user_id))
            .set(&changes)
            .returning(UserProfileInfo::as_returning())
            .get_result::<UserProfileInfo>(&mut conn)
            .map_err(StoreError::or_not_found("user"))
    })
    .await??;

    Ok(res)
}

// Creates the configured platform administrator if nobody holds the role yet
#[tracing::instrument("Ensuring a superadmin exists", skip(conn, new_user))]
pub async fn ensure_superadmin(
    mut conn: DbConnection,
    new_user: NewUser,
) -> Result<bool, StoreError> {
    let created = spawn_blocking_with_tracing(move || {
        conn.transaction::<_, StoreError, _>(|conn| {
            let existing: i64 = role_assignments::table
                .filter(role_assignments::role_name.eq(Role::Superadmin.as_str()))
                .count()
                .get_result(conn)?;

            if existing > 0 {
                return Ok(false);
            }

            let user_id = match find_user_by_email(conn, &new_user.email)? {
                Some(user) => user.user_id,
                None => insert_user(conn, new_user)?.user_id,
            };
            assign_role(conn, user_id, Role::Superadmin, None, None)?;

            Ok(true)
        })
    })
    .await??;

    Ok(created)
}
