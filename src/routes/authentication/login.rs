use actix_web::{web, HttpResponse};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{authorization::token_roles, jwt::Tokenizer},
    db_interaction::user::get_login_info,
    domain::UserEmail,
    password::verify_password,
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

fn bad_credentials() -> ApiError {
    ApiError::Unauthorized("Email or password is incorrect".to_string())
}

#[tracing::instrument("Logging in user", skip(pool, tokenizer, form))]
pub async fn login(
    pool: web::Data<DbPool>,
    tokenizer: web::Data<Tokenizer>,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse, ApiError> {
    let email = UserEmail::parse(form.0.email).map_err(|_| bad_credentials())?;

    let conn = get_pooled_connection(&pool).await?;
    let (user, grants) = match get_login_info(conn, email.inner()).await? {
        Some(found) => found,
        None => {
            tracing::info!("No user registered with this email");
            return Err(bad_credentials());
        }
    };

    let matches = verify_password(form.0.password, user.password.clone())
        .await
        .map_err(ApiError::UnexpectedError)?;

    if !matches {
        tracing::info!("Passwords did not match");
        return Err(bad_credentials());
    }

    let roles = token_roles(&grants);
    let token = tokenizer
        .generate_key(user.user_id, user.email.clone(), roles.clone())
        .map_err(|e| ApiError::UnexpectedError(e.into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "token": token,
        "user_id": user.user_id,
        "roles": roles,
    })))
}
