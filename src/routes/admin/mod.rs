mod audit_logs;
mod owners;
mod shops;

pub use audit_logs::*;
pub use owners::*;
pub use shops::*;
