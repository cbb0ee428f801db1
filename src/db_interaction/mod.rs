pub mod account_requests;
pub mod admin;
pub mod audit;
pub mod branches;
pub mod detergents;
pub mod error;
pub mod hours;
pub mod orders;
pub mod services;
pub mod shops;
pub mod staff;
pub mod user;

pub use error::StoreError;

diesel::define_sql_function! {
    /// SQL `lower()`, for case-insensitive lookups
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}
