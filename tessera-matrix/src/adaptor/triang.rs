use std::fmt::{Debug, Display};
use std::marker::PhantomData;
use delegate::delegate;
use log::{debug, trace};
use num_traits::One;
use tessera::{Result, err};
use crate::{MatExpr, MatTrait};
use crate::expr;
use crate::props::MatProps;
use crate::storage::Storage;
use super::{ElementProxy, GuardedIter, Triangle};

/// A square matrix in which only the cells of one strict triangle are free.
///
/// The diagonal is fixed at one (unit triangles) or zero (strict triangles),
/// and the opposite triangle is fixed at zero. Every operation that could
/// break this is validated before the storage is touched, so a failed
/// operation leaves the matrix as it was.
///
/// Diagonal entries of unit triangles are always stored explicitly.
pub struct TriangularMatrix<M, S> {
    inner: M,
    _triangle: PhantomData<S>
}

impl<M, S> TriangularMatrix<M, S>
where M: Storage, S: Triangle {
    /// The `n x n` matrix with every free cell zero.
    pub fn new(n: usize) -> Self {
        Self::with_capacity(n, n)
    }

    pub fn with_capacity(n: usize, nnz: usize) -> Self {
        let nnz = if S::UNIT { usize::max(nnz, n) } else { nnz };
        let mut inner = M::with_capacity((n, n), nnz);

        if S::UNIT {
            for k in 0..n {
                inner.append(k, k, M::Elem::one());
                inner.finalize(k);
            }
        }

        debug_assert!(inner.is_square());
        Self::trusted(inner)
    }

    pub(super) fn trusted(inner: M) -> Self {
        Self { inner, _triangle: PhantomData }
    }

    /// Builds the matrix from any matrix or expression, which must satisfy
    /// the structural predicate unless its type already guarantees it.
    pub fn try_from_expr<E>(e: &E) -> Result<Self>
    where E: MatExpr<Elem = M::Elem> {
        let inner = Self::validate(e)?;
        Ok(Self::trusted(inner))
    }

    pub fn try_assign<E>(&mut self, e: &E) -> Result<()>
    where E: MatExpr<Elem = M::Elem> {
        let inner = Self::validate(e)?;
        self.inner = inner;
        Ok(())
    }

    /// Adds `e`, which must be strictly triangular on the free side.
    pub fn try_add_assign<E>(&mut self, e: &E) -> Result<()>
    where E: MatExpr<Elem = M::Elem> {
        self.update(e, false)
    }

    /// Subtracts `e`, which must be strictly triangular on the free side.
    pub fn try_sub_assign<E>(&mut self, e: &E) -> Result<()>
    where E: MatExpr<Elem = M::Elem> {
        self.update(e, true)
    }

    pub fn try_mul_assign<E>(&mut self, e: &E) -> Result<()>
    where E: MatExpr<Elem = M::Elem> {
        let n = self.nrows();
        if e.shape() != (n, n) {
            return Self::reject(format!("cannot multiply {n}x{n} by {:?}", e.shape()))
        }

        let proven = S::is_proven(MatProps::mul(S::PROPS, E::PROPS));
        let mut res = self.inner.mul_expr(e);

        if !proven {
            if !S::holds(&res) {
                return Self::reject("the product is not of the same structure")
            }
            Self::normalize(&mut res);
        }

        self.inner = res;
        Ok(())
    }

    /// Guarded mutable access to `(i, j)`.
    pub fn at_mut(&mut self, i: usize, j: usize) -> ElementProxy<'_, M> {
        let n = self.nrows();
        assert!(i < n && j < n, "({i}, {j}) is out of bounds for {n}x{n}");
        ElementProxy::new(&mut self.inner, i, j, S::cell(i, j))
    }

    /// The stored entries of major `k`, as `(minor, value)`.
    pub fn iter(&self, k: usize) -> M::Iter<'_> {
        self.inner.major_iter(k)
    }

    pub fn iter_mut(&mut self, k: usize) -> GuardedIter<M::IterMut<'_>, M::Order, S> {
        GuardedIter::new(self.inner.major_iter_mut(k), k)
    }

    /// Resets every free cell. The diagonal is kept.
    pub fn reset(&mut self) {
        for k in 0..self.inner.majors() {
            self.reset_major(k)
        }
    }

    pub fn reset_major(&mut self, k: usize) {
        let n = self.nrows();
        self.inner.reset_range(k, S::free_minors::<M::Order>(k, n))
    }

    delegate! { to self.inner {
        /// Shrinks the matrix to `0 x 0`.
        pub fn clear(&mut self);
    }}

    pub fn resize(&mut self, n: usize, preserve: bool) {
        let old = self.nrows();
        self.inner.resize((n, n), preserve);

        if S::UNIT {
            let start = if preserve { old } else { 0 };
            for k in start..n {
                *self.inner.get_mut(k, k) = M::Elem::one();
            }
        }
    }

    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.inner, &mut other.inner)
    }

    pub fn max_non_zeros(&self) -> usize {
        Self::max_non_zeros_for(self.nrows())
    }

    pub fn max_non_zeros_for(n: usize) -> usize {
        if S::UNIT {
            n * (n + 1) / 2
        } else {
            n * n.saturating_sub(1) / 2
        }
    }

    delegate! { to self.inner {
        pub fn capacity(&self) -> usize;
        pub fn capacity_major(&self, k: usize) -> usize;
        pub fn non_zeros(&self) -> usize;
        pub fn non_zeros_major(&self, k: usize) -> usize;
        pub fn can_smp_assign(&self) -> bool;
    }}

    pub fn can_alias<A: ?Sized>(&self, alias: &A) -> bool {
        self.is_self(alias) || self.inner.can_alias(alias)
    }

    pub fn is_aliased<A: ?Sized>(&self, alias: &A) -> bool {
        self.is_self(alias) || self.inner.is_aliased(alias)
    }

    /// The transpose, whose free cells lie on the other side.
    pub fn transpose(&self) -> TriangularMatrix<M, S::Mirror> {
        let inner = M::from_expr(&expr::trans(&self.inner));
        TriangularMatrix::trusted(inner)
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }

    /// Mutable access to the storage, bypassing every check.
    ///
    /// The caller must leave the storage in a state satisfying the
    /// structural predicate. What happens otherwise is not specified.
    pub(crate) fn storage_mut_unchecked(&mut self) -> &mut M {
        &mut self.inner
    }

    // evaluates `e` into a new storage satisfying the predicate.
    fn validate<E>(e: &E) -> Result<M>
    where E: MatExpr<Elem = M::Elem> {
        let proven = S::is_proven(E::PROPS);

        let mut res = if E::IS_COMPUTATION {
            if !e.is_square() {
                return Self::reject(format!("non-square {:?} result", e.shape()))
            }

            let res = M::from_expr(e);
            if !proven && !S::holds(&res) {
                return Self::reject("the result is not of the same structure")
            }
            res
        } else {
            if !proven && !S::holds(e) {
                return Self::reject("the source is not of the same structure")
            }
            M::from_expr(e)
        };

        if proven {
            trace!("{} structure of {:?} proven by type", S::NAME, e.shape());
        } else {
            Self::normalize(&mut res);
        }

        Ok(res)
    }

    fn update<E>(&mut self, e: &E, negate: bool) -> Result<()>
    where E: MatExpr<Elem = M::Elem> {
        if e.shape() != self.shape() {
            return Self::reject(format!("matrix sizes do not match: {:?}, {:?}", self.shape(), e.shape()))
        }

        let proven = S::is_addend_proven(E::PROPS);

        if E::IS_COMPUTATION {
            let tmp = M::from_expr(e);
            self.update_with(&tmp, proven, negate)
        } else {
            self.update_with(e, proven, negate)
        }
    }

    fn update_with<E>(&mut self, e: &E, proven: bool, negate: bool) -> Result<()>
    where E: MatExpr<Elem = M::Elem> {
        if !proven && !S::holds_addend(e) {
            return Self::reject("the addend must be zero on the diagonal and the fixed cells")
        }

        if negate {
            self.inner.sub_assign_expr(e)
        } else {
            self.inner.add_assign_expr(e)
        }

        if !proven {
            Self::normalize(&mut self.inner)
        }

        Ok(())
    }

    // resets every cell that must be zero.
    fn normalize(inner: &mut M) {
        let n = inner.nrows();
        for k in 0..inner.majors() {
            inner.reset_range(k, S::zero_minors::<M::Order>(k, n))
        }
    }

    fn reject<T, D>(reason: D) -> Result<T>
    where D: Display {
        debug!("rejected assignment to {} matrix: {reason}", S::NAME);
        err!(InvalidAssignment, "invalid assignment to {} matrix: {reason}", S::NAME)
    }

    fn is_self<A: ?Sized>(&self, alias: &A) -> bool {
        std::ptr::eq(
            self as *const Self as *const u8,
            alias as *const A as *const u8
        )
    }
}

impl<M, S> MatTrait for TriangularMatrix<M, S>
where M: MatTrait {
    fn shape(&self) -> (usize, usize) {
        self.inner.shape()
    }
}

impl<M, S> MatExpr for TriangularMatrix<M, S>
where M: Storage, S: Triangle {
    type Elem = M::Elem;
    const PROPS: MatProps = S::PROPS;

    fn get(&self, i: usize, j: usize) -> M::Elem {
        self.inner.get(i, j)
    }

    fn visit<F>(&self, f: F)
    where F: FnMut(usize, usize, &M::Elem) {
        self.inner.visit(f)
    }
}

impl<M, S> Default for TriangularMatrix<M, S>
where M: Storage, S: Triangle {
    fn default() -> Self {
        Self::trusted(M::default())
    }
}

impl<M, S> Clone for TriangularMatrix<M, S>
where M: Clone {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), _triangle: PhantomData }
    }

    fn clone_from(&mut self, source: &Self) {
        self.inner.clone_from(&source.inner)
    }
}

impl<M, S> PartialEq for TriangularMatrix<M, S>
where M: PartialEq {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<M, S> Eq for TriangularMatrix<M, S>
where M: Eq {}

impl<M, S> Display for TriangularMatrix<M, S>
where M: Display {
    delegate! { to self.inner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result;
    }}
}

impl<M, S> Debug for TriangularMatrix<M, S>
where M: Debug, S: Triangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriangularMatrix")
            .field("triangle", &S::NAME)
            .field("inner", &self.inner)
            .finish()
    }
}

#[cfg(feature = "serde")]
impl<M, S> serde::Serialize for TriangularMatrix<M, S>
where M: serde::Serialize {
    fn serialize<Ser>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error>
    where Ser: serde::Serializer {
        serde::Serialize::serialize(&self.inner, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, M, S> serde::Deserialize<'de> for TriangularMatrix<M, S>
where M: Storage + serde::Deserialize<'de>, S: Triangle {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where D: serde::Deserializer<'de> {
        use serde::de::Error;
        let inner = <M as serde::Deserialize>::deserialize(deserializer)?;
        Self::try_from_expr(&inner).map_err(D::Error::custom)
    }
}
