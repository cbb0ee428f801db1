use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::{
        audit::{record, AuditEntry},
        branches::{delete_branch, update_branch},
    },
    domain::{phone_number::parse_optional_phone, RequiredText},
    models::BranchChanges,
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug, Default)]
pub struct BranchChangesForm {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl TryFrom<BranchChangesForm> for BranchChanges {
    type Error = String;

    fn try_from(form: BranchChangesForm) -> Result<Self, Self::Error> {
        let changes = BranchChanges {
            name: form
                .name
                .map(|n| RequiredText::parse("name", n, 100).map(RequiredText::into_inner))
                .transpose()?,
            address: form
                .address
                .map(|a| RequiredText::parse("address", a, 300).map(RequiredText::into_inner))
                .transpose()?,
            phone_number: parse_optional_phone(form.phone_number)?,
        };

        if changes.name.is_none() && changes.address.is_none() && changes.phone_number.is_none() {
            return Err("nothing to update".to_string());
        }
        Ok(changes)
    }
}

#[tracing::instrument("Updating branch", skip(pool, user, form))]
pub async fn patch_branch(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<BranchChangesForm>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let changes = BranchChanges::try_from(form.0).map_err(ApiError::BadRequest)?;

    let conn = get_pooled_connection(&pool).await?;
    let branch = update_branch(conn, user.user_id(), path.into_inner(), changes).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "branch.updated", "branch", branch.branch_id),
    )
    .await;

    Ok(HttpResponse::Ok().json(branch))
}

#[tracing::instrument("Deleting branch", skip(pool, user))]
pub async fn remove_branch(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let branch = delete_branch(conn, user.user_id(), path.into_inner()).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "branch.deleted", "branch", branch.branch_id)
            .with_details(json!({ "shop_id": branch.shop_id, "name": branch.name })),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}
