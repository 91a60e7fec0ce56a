use std::fmt::Debug;
use tessera::Elem;
use crate::props::MatProps;

pub trait MatTrait {
    fn shape(&self) -> (usize, usize);
    fn nrows(&self) -> usize { self.shape().0 }
    fn ncols(&self) -> usize { self.shape().1 }
    fn is_square(&self) -> bool { 
        let (m, n) = self.shape();
        m == n
    }
}

/// Anything that can be the source of a matrix assignment: 
/// a concrete matrix or a lazily evaluated expression.
pub trait MatExpr: MatTrait {
    type Elem: Elem;

    /// Structural facts that hold for every value of this type.
    const PROPS: MatProps = MatProps::NONE;

    /// `true` for lazy expressions, whose entries are only known after evaluation.
    const IS_COMPUTATION: bool = false;

    fn get(&self, i: usize, j: usize) -> Self::Elem;

    /// Calls `f(i, j, a)` for every stored (or computed) entry. 
    /// Explicitly stored zeros may be visited. 
    fn visit<F>(&self, f: F)
    where F: FnMut(usize, usize, &Self::Elem);
}

/// Type-level storage order. 
/// A *major* is a row for row-major storage and a column for column-major storage.
pub trait StorageOrder: Clone + Copy + Default + Debug + PartialEq + Eq + Send + Sync + 'static {
    const IS_ROW_MAJOR: bool;
    type Opposite: StorageOrder<Opposite = Self>;

    fn majors(shape: (usize, usize)) -> usize { 
        if Self::IS_ROW_MAJOR { shape.0 } else { shape.1 }
    }

    fn minors(shape: (usize, usize)) -> usize { 
        if Self::IS_ROW_MAJOR { shape.1 } else { shape.0 }
    }

    // (i, j) -> (major, minor)
    fn to_major_minor(i: usize, j: usize) -> (usize, usize) { 
        if Self::IS_ROW_MAJOR { (i, j) } else { (j, i) }
    }

    // (major, minor) -> (i, j)
    fn to_row_col(k: usize, l: usize) -> (usize, usize) { 
        if Self::IS_ROW_MAJOR { (k, l) } else { (l, k) }
    }
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct RowMajor;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct ColMajor;

impl StorageOrder for RowMajor { 
    const IS_ROW_MAJOR: bool = true;
    type Opposite = ColMajor;
}

impl StorageOrder for ColMajor { 
    const IS_ROW_MAJOR: bool = false;
    type Opposite = RowMajor;
}
