use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::{domain::Role, routes::ApiError};

use super::jwt::{Claims, Tokenizer};

// Extractor for any caller holding a valid token
#[derive(Debug)]
pub struct AuthenticatedUser(pub Uuid, pub Vec<Role>);

// Extractor for platform administrators
#[derive(Debug)]
pub struct IsSuperadmin(pub Uuid);

impl AuthenticatedUser {
    pub fn user_id(&self) -> Uuid {
        self.0
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.1.contains(&role)
    }
}

fn unauthorized(message: &str) -> ApiError {
    ApiError::Unauthorized(message.to_string())
}

fn bearer_claims(req: &HttpRequest) -> Result<Claims, ApiError> {
    let tokenizer: &web::Data<Tokenizer> = req.app_data().ok_or_else(|| {
        ApiError::UnexpectedError(anyhow::anyhow!("Token validation is not configured"))
    })?;

    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| unauthorized("Missing token"))?
        .to_str()
        .map_err(|_| unauthorized("Invalid token"))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unauthorized("Invalid token"))?;

    tokenizer
        .decode_key(token)
        .ok_or_else(|| unauthorized("Invalid token"))
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(bearer_claims(req).map(|claims| AuthenticatedUser(claims.sub, claims.roles)))
    }
}

impl FromRequest for IsSuperadmin {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(bearer_claims(req).and_then(|claims| {
            if claims.has_role(Role::Superadmin) {
                Ok(IsSuperadmin(claims.sub))
            } else {
                Err(ApiError::Forbidden("Unauthorized Role".to_string()))
            }
        }))
    }
}
