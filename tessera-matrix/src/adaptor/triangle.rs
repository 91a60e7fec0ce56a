use std::fmt::Debug;
use std::ops::Range;
use derive_more::Display;
use tessera::Elem;
use crate::{MatExpr, StorageOrder};
use crate::pred;
use crate::props::MatProps;

/// Class of a cell of a triangular matrix.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Cell {
    #[display("free")]
    Free,
    #[display("diagonal")]
    Diagonal,
    #[display("fixed")]
    Fixed
}

impl Cell {
    pub fn is_free(&self) -> bool {
        matches!(self, Cell::Free)
    }
}

/// The structural predicate of a triangular matrix.
///
/// The free cells lie strictly below (`LOWER`) or strictly above the
/// diagonal. The diagonal is fixed at one (`UNIT`) or at zero, and every
/// other cell is fixed at zero.
pub trait Triangle: Clone + Copy + Default + Debug + PartialEq + Eq + Send + Sync + 'static {
    const UNIT: bool;
    const LOWER: bool;
    const PROPS: MatProps;
    const NAME: &'static str;

    /// The triangle of the transposed matrix.
    type Mirror: Triangle<Mirror = Self>;

    fn cell(i: usize, j: usize) -> Cell {
        if i == j {
            Cell::Diagonal
        } else if (i > j) == Self::LOWER {
            Cell::Free
        } else {
            Cell::Fixed
        }
    }

    fn diag<T>() -> T
    where T: Elem {
        if Self::UNIT { T::one() } else { T::zero() }
    }

    // whether the free cells of a major come before its diagonal.
    fn free_first<SO>() -> bool
    where SO: StorageOrder {
        Self::LOWER == SO::IS_ROW_MAJOR
    }

    /// Minor indices of the free cells of major `k`, for `n x n` matrices.
    fn free_minors<SO>(k: usize, n: usize) -> Range<usize>
    where SO: StorageOrder {
        if Self::free_first::<SO>() {
            0 .. k
        } else {
            k + 1 .. n
        }
    }

    /// Minor indices of the cells of major `k` that must hold zero.
    fn zero_minors<SO>(k: usize, n: usize) -> Range<usize>
    where SO: StorageOrder {
        let u = Self::UNIT as usize;
        if Self::free_first::<SO>() {
            k + u .. n
        } else {
            0 .. k + 1 - u
        }
    }

    /// Whether a value of type-level properties `p` is known to satisfy the predicate.
    fn is_proven(p: MatProps) -> bool {
        match (Self::LOWER, Self::UNIT) {
            (true,  true)  => p.uni_lower,
            (false, true)  => p.uni_upper,
            (true,  false) => p.strictly_lower,
            (false, false) => p.strictly_upper,
        }
    }

    /// Whether values of type-level properties `p` are known to be legal addends.
    fn is_addend_proven(p: MatProps) -> bool {
        if Self::LOWER { p.strictly_lower } else { p.strictly_upper }
    }

    fn holds<E>(e: &E) -> bool
    where E: MatExpr {
        match (Self::LOWER, Self::UNIT) {
            (true,  true)  => pred::is_uni_lower(e),
            (false, true)  => pred::is_uni_upper(e),
            (true,  false) => pred::is_strictly_lower(e),
            (false, false) => pred::is_strictly_upper(e),
        }
    }

    // an addend leaves the diagonal and the fixed cells as they are.
    fn holds_addend<E>(e: &E) -> bool
    where E: MatExpr {
        if Self::LOWER {
            pred::is_strictly_lower(e)
        } else {
            pred::is_strictly_upper(e)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct UniLower;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct UniUpper;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StrictlyLower;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StrictlyUpper;

impl Triangle for UniLower {
    const UNIT: bool = true;
    const LOWER: bool = true;
    const PROPS: MatProps = MatProps::UNI_LOWER;
    const NAME: &'static str = "unilower";
    type Mirror = UniUpper;
}

impl Triangle for UniUpper {
    const UNIT: bool = true;
    const LOWER: bool = false;
    const PROPS: MatProps = MatProps::UNI_UPPER;
    const NAME: &'static str = "uniupper";
    type Mirror = UniLower;
}

impl Triangle for StrictlyLower {
    const UNIT: bool = false;
    const LOWER: bool = true;
    const PROPS: MatProps = MatProps::STRICTLY_LOWER;
    const NAME: &'static str = "strictly lower";
    type Mirror = StrictlyUpper;
}

impl Triangle for StrictlyUpper {
    const UNIT: bool = false;
    const LOWER: bool = false;
    const PROPS: MatProps = MatProps::STRICTLY_UPPER;
    const NAME: &'static str = "strictly upper";
    type Mirror = StrictlyLower;
}
