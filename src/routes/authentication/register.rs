use actix_web::{web, HttpResponse};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db_interaction::user::{insert_customer, NewUser},
    domain::{phone_number::parse_optional_phone, NewPassword, RequiredText, UserEmail},
    password::compute_password_hash,
    routes::ApiError,
    telemetry::spawn_blocking_with_tracing,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct RegistrationForm {
    name: String,
    email: String,
    password: SecretString,
    confirm_password: SecretString,
    phone_number: Option<String>,
}

// Validated registration, with the password not yet hashed
#[derive(Debug)]
pub struct NewCustomer {
    pub name: String,
    pub email: UserEmail,
    pub password: NewPassword,
    pub phone_number: Option<String>,
}

impl TryFrom<RegistrationForm> for NewCustomer {
    type Error = String;

    fn try_from(form: RegistrationForm) -> Result<Self, Self::Error> {
        if form.password.expose_secret() != form.confirm_password.expose_secret() {
            return Err("the password and confirm passwords don't match".to_string());
        }

        Ok(NewCustomer {
            name: RequiredText::parse("name", form.name, 100)?.into_inner(),
            email: UserEmail::parse(form.email)?,
            password: NewPassword::parse(form.password)?,
            phone_number: parse_optional_phone(form.phone_number)?,
        })
    }
}

// Hashing is CPU bound, so it runs on the blocking pool
pub async fn hash_password(password: SecretString) -> Result<SecretString, ApiError> {
    spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .map_err(|e| ApiError::UnexpectedError(e.into()))?
        .map_err(ApiError::UnexpectedError)
}

#[tracing::instrument(
    "User registration started",
    skip(pool, form),
    fields(email = %form.email)
)]
pub async fn register(
    pool: web::Data<DbPool>,
    form: web::Json<RegistrationForm>,
) -> Result<HttpResponse, ApiError> {
    let customer = NewCustomer::try_from(form.0).map_err(ApiError::BadRequest)?;
    let password_hash = hash_password(customer.password.into_inner()).await?;

    let conn = get_pooled_connection(&pool).await?;
    let user_id = insert_customer(
        conn,
        NewUser {
            name: customer.name,
            email: customer.email.inner(),
            password_hash,
            phone_number: customer.phone_number,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(json!({ "user_id": user_id })))
}
