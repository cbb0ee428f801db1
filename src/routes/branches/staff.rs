use actix_web::{web, HttpResponse};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::{
        audit::{record, AuditEntry},
        staff::{add_staff, list_staff, remove_staff},
        user::NewUser,
    },
    domain::{phone_number::parse_optional_phone, NewPassword, RequiredText, Role, UserEmail},
    routes::{authentication::hash_password, ApiError},
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct StaffForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub phone_number: Option<String>,
    pub role: Role,
}

#[tracing::instrument("Listing branch staff", skip(pool, user))]
pub async fn get_staff(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let staff = list_staff(conn, user.user_id(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(staff))
}

#[tracing::instrument(
    "Adding branch staff",
    skip(pool, user, form),
    fields(role = %form.role)
)]
pub async fn post_staff(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    form: web::Json<StaffForm>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let branch_id = path.into_inner();
    let form = form.into_inner();

    if !form.role.is_branch_staff() {
        return Err(ApiError::BadRequest("role must be employee or delivery".to_string()));
    }
    let name = RequiredText::parse("name", form.name, 100).map_err(ApiError::BadRequest)?;
    let email = UserEmail::parse(form.email).map_err(ApiError::BadRequest)?;
    let password = NewPassword::parse(form.password).map_err(ApiError::BadRequest)?;
    let phone_number = parse_optional_phone(form.phone_number).map_err(ApiError::BadRequest)?;

    let password_hash = hash_password(password.into_inner()).await?;

    let conn = get_pooled_connection(&pool).await?;
    let member = add_staff(
        conn,
        user.user_id(),
        branch_id,
        NewUser {
            name: name.into_inner(),
            email: email.inner(),
            password_hash,
            phone_number,
        },
        form.role,
    )
    .await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "staff.added", "branch", branch_id)
            .with_details(json!({ "user_id": member.user_id, "role": member.role })),
    )
    .await;

    Ok(HttpResponse::Created().json(member))
}

#[tracing::instrument("Removing branch staff", skip(pool, user))]
pub async fn delete_staff(
    pool: web::Data<DbPool>,
    path: web::Path<(Uuid, Uuid)>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let (branch_id, staff_id) = path.into_inner();

    let conn = get_pooled_connection(&pool).await?;
    remove_staff(conn, user.user_id(), branch_id, staff_id).await?;

    record(
        &pool,
        AuditEntry::new(user.user_id(), "staff.removed", "branch", branch_id)
            .with_details(json!({ "user_id": staff_id })),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}
