mod base;
mod adaptor;

pub use base::*;
pub use adaptor::*;

pub mod props;
pub mod pred;
pub mod storage;
pub mod expr;
pub mod interop;
pub mod config;
