use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    db_interaction::account_requests::{insert_account_request, NewAccountRequest},
    domain::{phone_number::parse_optional_phone, RequiredText, ShopName, UserEmail},
    routes::ApiError,
    utils::{get_pooled_connection, DbPool},
};

#[derive(Deserialize, Debug)]
pub struct AccountRequestForm {
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub shop_name: String,
    pub branch_name: String,
    pub branch_address: String,
}

impl TryFrom<AccountRequestForm> for NewAccountRequest {
    type Error = String;

    fn try_from(form: AccountRequestForm) -> Result<Self, Self::Error> {
        Ok(NewAccountRequest {
            name: RequiredText::parse("name", form.name, 100)?.into_inner(),
            email: UserEmail::parse(form.email)?.inner(),
            phone_number: parse_optional_phone(form.phone_number)?,
            shop_name: ShopName::parse(form.shop_name)?.into_inner(),
            branch_name: RequiredText::parse("branch_name", form.branch_name, 100)?.into_inner(),
            branch_address: RequiredText::parse("branch_address", form.branch_address, 300)?
                .into_inner(),
        })
    }
}

// Public endpoint for prospective shop owners
#[tracing::instrument(
    "Submitting account request",
    skip(pool, form),
    fields(shop_name = %form.shop_name)
)]
pub async fn post_account_request(
    pool: web::Data<DbPool>,
    form: web::Json<AccountRequestForm>,
) -> Result<HttpResponse, ApiError> {
    let new_request = NewAccountRequest::try_from(form.0).map_err(ApiError::BadRequest)?;

    let conn = get_pooled_connection(&pool).await?;
    let request = insert_account_request(conn, new_request).await?;

    Ok(HttpResponse::Created().json(request))
}
