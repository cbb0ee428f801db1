mod account_requests;
mod admin;
mod authentication;
mod branches;
mod catalog;
mod error;
mod health_check;
mod orders;
mod profile;
mod shops;

pub use account_requests::*;
pub use admin::*;
pub use authentication::*;
pub use branches::*;
pub use catalog::*;
pub use error::ApiError;
pub use health_check::*;
pub use orders::*;
pub use profile::*;
pub use shops::*;
