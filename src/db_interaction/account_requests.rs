use chrono::Utc;
use diesel::{
    Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl,
    SelectableHelper,
};
use secrecy::SecretString;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::authorization::load_grants,
    domain::{AccountRequestStatus, Role},
    models::{AccountRequest, Shop},
    schema::{account_requests, shops},
    telemetry::spawn_blocking_with_tracing,
    utils::{DbConnection, Pagination},
};

use super::{
    branches::{insert_branch, NewBranch},
    lower,
    user::{assign_role, find_user_by_email, insert_user, NewUser},
    StoreError,
};

pub struct NewAccountRequest {
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub shop_name: String,
    pub branch_name: String,
    pub branch_address: String,
}

// Accounts provisioned when a request is approved
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ApprovedAccount {
    pub user_id: Uuid,
    pub shop_id: Uuid,
    pub branch_id: Uuid,
}

fn shop_name_taken(conn: &mut PgConnection, shop_name: &str) -> Result<bool, diesel::result::Error> {
    let count: i64 = shops::table
        .filter(lower(shops::name).eq(shop_name.to_lowercase()))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

fn ensure_available(conn: &mut PgConnection, email: &str, shop_name: &str) -> Result<(), StoreError> {
    if find_user_by_email(conn, email)?.is_some() {
        return Err(StoreError::Conflict("email is already registered".to_string()));
    }
    if shop_name_taken(conn, shop_name)? {
        return Err(StoreError::Conflict("a shop with this name already exists".to_string()));
    }
    Ok(())
}

#[tracing::instrument("Submitting account request", skip(conn, new_request))]
pub async fn insert_account_request(
    mut conn: DbConnection,
    new_request: NewAccountRequest,
) -> Result<AccountRequest, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<AccountRequest, StoreError, _>(|conn| {
            ensure_available(conn, &new_request.email, &new_request.shop_name)?;

            let pending: i64 = account_requests::table
                .filter(account_requests::email.eq(&new_request.email))
                .filter(account_requests::status.eq(AccountRequestStatus::Pending.as_str()))
                .count()
                .get_result(conn)?;
            if pending > 0 {
                return Err(StoreError::Conflict(
                    "a request for this email is already pending".to_string(),
                ));
            }

            let request = AccountRequest {
                request_id: Uuid::new_v4(),
                name: new_request.name,
                email: new_request.email,
                phone_number: new_request.phone_number,
                shop_name: new_request.shop_name,
                branch_name: new_request.branch_name,
                branch_address: new_request.branch_address,
                status: AccountRequestStatus::Pending.as_str().to_string(),
                rejection_reason: None,
                reviewed_by: None,
                reviewed_at: None,
                created_at: Utc::now(),
            };

            diesel::insert_into(account_requests::table)
                .values(&request)
                .execute(conn)?;

            Ok(request)
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Listing account requests", skip(conn))]
pub async fn list_account_requests(
    mut conn: DbConnection,
    status: Option<AccountRequestStatus>,
    pagination: Pagination,
) -> Result<Vec<AccountRequest>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        let mut query = account_requests::table.into_boxed();
        if let Some(status) = status {
            query = query.filter(account_requests::status.eq(status.as_str()));
        }

        query
            .order(account_requests::created_at.desc())
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(AccountRequest::as_select())
            .load::<AccountRequest>(&mut conn)
            .map_err(StoreError::from)
    })
    .await??;

    Ok(res)
}

fn lock_pending_request(conn: &mut PgConnection, request_id: Uuid) -> Result<AccountRequest, StoreError> {
    let request = account_requests::table
        .find(request_id)
        .for_update()
        .select(AccountRequest::as_select())
        .get_result::<AccountRequest>(conn)
        .map_err(StoreError::or_not_found("account request"))?;

    if request.status != AccountRequestStatus::Pending.as_str() {
        return Err(StoreError::Conflict(format!(
            "account request is already {}",
            request.status
        )));
    }
    Ok(request)
}

/// Provisions the owner account, the shop and its first branch, then marks
/// the request approved. Either everything is created or nothing is.
#[tracing::instrument("Approving account request", skip(conn, password_hash))]
pub async fn approve_account_request(
    mut conn: DbConnection,
    actor: Uuid,
    request_id: Uuid,
    password_hash: SecretString,
) -> Result<ApprovedAccount, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<ApprovedAccount, StoreError, _>(|conn| {
            load_grants(conn, actor)?.require_superadmin()?;

            let request = lock_pending_request(conn, request_id)?;
            ensure_available(conn, &request.email, &request.shop_name)?;

            let owner = insert_user(
                conn,
                NewUser {
                    name: request.name,
                    email: request.email,
                    password_hash,
                    phone_number: request.phone_number.clone(),
                },
            )?;

            let shop = Shop {
                shop_id: Uuid::new_v4(),
                owner_id: owner.user_id,
                name: request.shop_name,
                description: None,
                created_at: Utc::now(),
            };
            diesel::insert_into(shops::table)
                .values(&shop)
                .execute(conn)?;

            assign_role(conn, owner.user_id, Role::Owner, Some(shop.shop_id), None)?;

            let branch = insert_branch(
                conn,
                shop.shop_id,
                NewBranch {
                    name: request.branch_name,
                    address: request.branch_address,
                    phone_number: request.phone_number,
                },
            )?;

            diesel::update(account_requests::table.find(request_id))
                .set((
                    account_requests::status.eq(AccountRequestStatus::Approved.as_str()),
                    account_requests::reviewed_by.eq(Some(actor)),
                    account_requests::reviewed_at.eq(Some(Utc::now())),
                ))
                .execute(conn)?;

            Ok(ApprovedAccount {
                user_id: owner.user_id,
                shop_id: shop.shop_id,
                branch_id: branch.branch_id,
            })
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Rejecting account request", skip(conn))]
pub async fn reject_account_request(
    mut conn: DbConnection,
    actor: Uuid,
    request_id: Uuid,
    reason: Option<String>,
) -> Result<AccountRequest, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<AccountRequest, StoreError, _>(|conn| {
            load_grants(conn, actor)?.require_superadmin()?;
            lock_pending_request(conn, request_id)?;

            diesel::update(
                account_requests::table
                    .filter(account_requests::request_id.eq(request_id))
                    .filter(account_requests::status.eq(AccountRequestStatus::Pending.as_str())),
            )
            .set((
                account_requests::status.eq(AccountRequestStatus::Rejected.as_str()),
                account_requests::rejection_reason.eq(reason),
                account_requests::reviewed_by.eq(Some(actor)),
                account_requests::reviewed_at.eq(Some(Utc::now())),
            ))
            .returning(AccountRequest::as_returning())
            .get_result::<AccountRequest>(conn)
            .optional()?
            .ok_or_else(|| StoreError::Conflict("account request is no longer pending".to_string()))
        })
    })
    .await??;

    Ok(res)
}
