//! Matrices whose structure is fixed by their type.
//!
//! A [`TriangularMatrix`] owns its storage and keeps it unit or strictly
//! triangular through every operation. Writes to single cells go through
//! guarded handles, and assignments are validated before they are applied.

mod triangle;
mod proxy;
mod iter;
mod triang;
mod sparse;
mod view;

pub use triangle::*;
pub use proxy::*;
pub use iter::*;
pub use triang::*;
pub use view::*;

pub type UniLowerMatrix<M> = TriangularMatrix<M, UniLower>;
pub type UniUpperMatrix<M> = TriangularMatrix<M, UniUpper>;
pub type StrictlyLowerMatrix<M> = TriangularMatrix<M, StrictlyLower>;
pub type StrictlyUpperMatrix<M> = TriangularMatrix<M, StrictlyUpper>;
