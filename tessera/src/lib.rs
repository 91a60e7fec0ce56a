mod abst;
mod error;

pub use abst::*;
pub use error::*;

pub mod util;
