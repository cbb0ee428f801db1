mod get;
mod hours;
mod post;
mod staff;
mod update;

pub use get::*;
pub use hours::*;
pub use post::*;
pub use staff::*;
pub use update::*;
