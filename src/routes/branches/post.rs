use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::{
        audit::{record, AuditEntry},
        branches::{create_branch, NewBranch},
    },
    domain::{phone_number::parse_optional_phone, RequiredText},
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct BranchForm {
    pub name: String,
    pub address: String,
    pub phone_number: Option<String>,
}

impl TryFrom<BranchForm> for NewBranch {
    type Error = String;

    fn try_from(form: BranchForm) -> Result<Self, Self::Error> {
        Ok(NewBranch {
            name: RequiredText::parse("name", form.name, 100)?.into_inner(),
            address: RequiredText::parse("address", form.address, 300)?.into_inner(),
            phone_number: parse_optional_phone(form.phone_number)?,
        })
    }
}

#[tracing::instrument("Creating branch", skip(pool, user, form))]
pub async fn post_branch(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<BranchForm>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let new_branch = NewBranch::try_from(form.0).map_err(ApiError::BadRequest)?;

    let conn = get_pooled_connection(&pool).await?;
    let branch = create_branch(conn, user.user_id(), path.into_inner(), new_branch).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "branch.created", "branch", branch.branch_id)
            .with_details(json!({ "shop_id": branch.shop_id, "name": branch.name })),
    )
    .await;

    Ok(HttpResponse::Created().json(branch))
}
