use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::user::update_user_profile_info,
    domain::{phone_number::parse_optional_phone, RequiredText, UserEmail},
    models::UserProfileChanges,
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug, Default)]
pub struct ProfileForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl TryFrom<ProfileForm> for UserProfileChanges {
    type Error = String;

    // Absent fields are left untouched
    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        let changes = UserProfileChanges {
            name: form
                .name
                .map(|n| RequiredText::parse("name", n, 100).map(RequiredText::into_inner))
                .transpose()?,
            email: form.email.map(|e| UserEmail::parse(e).map(|e| e.inner())).transpose()?,
            phone_number: parse_optional_phone(form.phone_number)?,
            address: form
                .address
                .map(|a| RequiredText::parse("address", a, 300).map(RequiredText::into_inner))
                .transpose()?,
        };

        if changes.name.is_none()
            && changes.email.is_none()
            && changes.phone_number.is_none()
            && changes.address.is_none()
        {
            return Err("nothing to update".to_string());
        }
        Ok(changes)
    }
}

#[tracing::instrument("Updating user profile info", skip_all)]
pub async fn update_profile(
    pool: web::Data<DbPool>,
    form: web::Json<ProfileForm>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let changes = UserProfileChanges::try_from(form.0).map_err(ApiError::BadRequest)?;

    let conn = get_pooled_connection(&pool).await?;
    let updated = update_user_profile_info(conn, user.user_id(), changes).await?;

    Ok(HttpResponse::Ok().json(updated))
}
