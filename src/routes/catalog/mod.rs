mod detergents;
mod services;

pub use detergents::*;
pub use services::*;
