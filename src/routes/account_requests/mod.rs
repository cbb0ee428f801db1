mod post;
mod review;

pub use post::*;
pub use review::*;
