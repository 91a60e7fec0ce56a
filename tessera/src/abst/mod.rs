mod elem;
mod complex;

pub use elem::*;
pub use complex::*;
