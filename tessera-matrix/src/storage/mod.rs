//! Storage engines owned by the adaptors, and the contract they fulfil.

use std::ops::Range;
use num_traits::Zero;
use tessera::Result;
use crate::{MatExpr, StorageOrder};

mod compressed;
mod dense;

pub use compressed::*;
pub use dense::*;

/// The part of a matrix container that the adaptors consume. 
/// 
/// Positions inside a major (a row for row-major storage, a column for 
/// column-major storage) are given as offsets from the first stored entry 
/// of that major.
pub trait Storage: MatExpr + Clone + Default {
    type Order: StorageOrder;

    type Iter<'a>: DoubleEndedIterator<Item = (usize, &'a Self::Elem)> + ExactSizeIterator
    where Self: 'a;

    type IterMut<'a>: DoubleEndedIterator<Item = (usize, &'a mut Self::Elem)> + ExactSizeIterator
    where Self: 'a;

    fn with_capacity(shape: (usize, usize), nnz: usize) -> Self;

    fn from_expr<E>(e: &E) -> Self
    where E: MatExpr<Elem = Self::Elem>;

    fn majors(&self) -> usize { 
        Self::Order::majors(self.shape())
    }

    /// Mutable access to `(i, j)`. Sparse storage creates the entry if absent.
    fn get_mut(&mut self, i: usize, j: usize) -> &mut Self::Elem;

    fn major_iter(&self, k: usize) -> Self::Iter<'_>;
    fn major_iter_mut(&mut self, k: usize) -> Self::IterMut<'_>;

    /// Low-level bulk load: `(i, j)` must come after every stored entry of its major.
    fn append(&mut self, i: usize, j: usize, a: Self::Elem);

    /// Closes the bulk load of major `k`.
    fn finalize(&mut self, k: usize);

    /// Resets the entries of major `k` whose minor index lies in `minors`.
    fn reset_range(&mut self, k: usize, minors: Range<usize>);

    fn reset(&mut self);
    fn reset_major(&mut self, k: usize);
    fn clear(&mut self);
    fn resize(&mut self, shape: (usize, usize), preserve: bool);

    fn capacity(&self) -> usize;
    fn capacity_major(&self, k: usize) -> usize;
    fn non_zeros(&self) -> usize;
    fn non_zeros_major(&self, k: usize) -> usize;

    fn add_assign_expr<E>(&mut self, e: &E)
    where E: MatExpr<Elem = Self::Elem> { 
        assert_eq!(self.shape(), e.shape());
        e.visit(|i, j, a|
            if !a.is_zero() {
                *self.get_mut(i, j) += a.clone()
            }
        )
    }

    fn sub_assign_expr<E>(&mut self, e: &E)
    where E: MatExpr<Elem = Self::Elem> { 
        assert_eq!(self.shape(), e.shape());
        e.visit(|i, j, a|
            if !a.is_zero() {
                *self.get_mut(i, j) -= a.clone()
            }
        )
    }

    fn mul_expr<E>(&self, e: &E) -> Self
    where E: MatExpr<Elem = Self::Elem> { 
        let a = CompressedMatrix::<_, <Self as Storage>::Order>::from_expr(self);
        let b = CompressedMatrix::<_, <Self as Storage>::Order>::from_expr(e);
        Self::from_expr(&(a * b))
    }

    fn can_alias<A: ?Sized>(&self, alias: &A) -> bool { 
        self.is_aliased(alias)
    }

    fn is_aliased<A: ?Sized>(&self, alias: &A) -> bool { 
        std::ptr::eq(
            self as *const Self as *const u8, 
            alias as *const A as *const u8
        )
    }

    fn can_smp_assign(&self) -> bool;
}

/// Storage that keeps only explicitly inserted entries.
pub trait SparseStorage: Storage { 
    /// `nnz[k]` is the capacity reserved for major `k`.
    fn with_capacities(shape: (usize, usize), nnz: &[usize]) -> Self;

    /// Sets `(i, j)`, inserting it when absent. Returns its position.
    fn set(&mut self, i: usize, j: usize, a: Self::Elem) -> usize;

    /// Inserts a new entry. Fails if `(i, j)` is already stored.
    fn insert(&mut self, i: usize, j: usize, a: Self::Elem) -> Result<usize>;

    fn erase(&mut self, i: usize, j: usize);

    /// Erases the entry at `pos` of major `k`. Returns the position of the next entry.
    fn erase_at(&mut self, k: usize, pos: usize) -> usize;

    /// Erases the entries at `range` of major `k`. Returns the position of the next entry.
    fn erase_range(&mut self, k: usize, range: Range<usize>) -> usize;

    fn find(&self, i: usize, j: usize) -> Option<usize>;

    /// Position of the first entry not before `(i, j)` in its major.
    fn lower_bound(&self, i: usize, j: usize) -> usize;

    /// Position of the first entry after `(i, j)` in its major.
    fn upper_bound(&self, i: usize, j: usize) -> usize;

    fn reserve(&mut self, nnz: usize);
    fn reserve_major(&mut self, k: usize, nnz: usize);
    fn trim(&mut self);
    fn trim_major(&mut self, k: usize);
}
