use actix_web::{web, HttpResponse};

use crate::{
    auth::extractors::AuthenticatedUser,
    db_interaction::user::get_user_profile_info,
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

#[tracing::instrument("Get profile data of logged in user", skip(pool, user))]
pub async fn get_profile(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let conn = get_pooled_connection(&pool).await?;
    let user_profile_info = get_user_profile_info(conn, user.user_id()).await?;

    Ok(HttpResponse::Ok().json(user_profile_info))
}
