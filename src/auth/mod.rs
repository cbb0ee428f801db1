pub mod authorization;
pub mod extractors;
pub mod jwt;
