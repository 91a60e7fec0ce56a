use std::ops::Range;
use log::debug;
use num_traits::{One, Zero};
use tessera::{Result, err};
use crate::MatTrait;
use crate::storage::SparseStorage;
use super::{Triangle, TriangularMatrix};

// Entry-level operations, available when the storage is sparse.
// Positions are offsets inside one major, as in `SparseStorage`.

impl<M, S> TriangularMatrix<M, S>
where M: SparseStorage, S: Triangle {
    /// `nnz[k]` is the capacity of major `k`. Unit triangles need room
    /// for the diagonal in every major.
    pub fn with_capacities(n: usize, nnz: &[usize]) -> Result<Self> {
        assert_eq!(nnz.len(), n);

        if S::UNIT {
            if let Some(k) = nnz.iter().position(|&c| c == 0) {
                debug!("zero capacity for major {k} of {} matrix", S::NAME);
                return err!(InvalidCapacity, "major {k} must have room for its diagonal element")
            }
        }

        let mut inner = M::with_capacities((n, n), nnz);
        if S::UNIT {
            for k in 0..n {
                inner.append(k, k, M::Elem::one());
            }
        }

        Ok(Self::trusted(inner))
    }

    /// Sets the free cell `(i, j)`. Returns the position of the entry.
    pub fn set(&mut self, i: usize, j: usize, a: M::Elem) -> Result<usize> {
        self.check_free(i, j)?;
        Ok(self.storage_mut_unchecked().set(i, j, a))
    }

    /// Inserts a new entry at the free cell `(i, j)`.
    pub fn insert(&mut self, i: usize, j: usize, a: M::Elem) -> Result<usize> {
        self.check_free(i, j)?;
        self.storage_mut_unchecked().insert(i, j, a)
    }

    /// Bulk loading. With `check`, zeros are skipped.
    pub fn append(&mut self, i: usize, j: usize, a: M::Elem, check: bool) -> Result<()> {
        self.check_free(i, j)?;
        if check && a.is_zero() {
            return Ok(())
        }
        self.storage_mut_unchecked().insert(i, j, a).map(|_| ())
    }

    /// Closes the bulk loading of major `k`.
    pub fn finalize(&mut self, k: usize) {
        self.storage_mut_unchecked().trim_major(k)
    }

    pub fn erase(&mut self, i: usize, j: usize) -> Result<()> {
        self.check_bounds(i, j);
        if S::UNIT && i == j {
            return Self::reject_erase(i)
        }
        self.storage_mut_unchecked().erase(i, j);
        Ok(())
    }

    /// Erases the entry at `pos` of major `k`. Returns the position of the next entry.
    pub fn erase_at(&mut self, k: usize, pos: usize) -> Result<usize> {
        self.erase_range(k, pos .. pos + 1)
    }

    /// Erases the entries at `range` of major `k`, or nothing if the range
    /// holds the diagonal of a unit triangle.
    pub fn erase_range(&mut self, k: usize, range: Range<usize>) -> Result<usize> {
        if S::UNIT {
            let hits_diag = self.iter(k)
                .skip(range.start)
                .take(range.len())
                .any(|(l, _)| l == k);

            if hits_diag {
                return Self::reject_erase(k)
            }
        }
        Ok(self.storage_mut_unchecked().erase_range(k, range))
    }

    pub fn find(&self, i: usize, j: usize) -> Option<usize> {
        self.inner().find(i, j)
    }

    pub fn lower_bound(&self, i: usize, j: usize) -> usize {
        self.inner().lower_bound(i, j)
    }

    pub fn upper_bound(&self, i: usize, j: usize) -> usize {
        self.inner().upper_bound(i, j)
    }

    pub fn reserve(&mut self, nnz: usize) {
        self.storage_mut_unchecked().reserve(nnz)
    }

    pub fn reserve_major(&mut self, k: usize, nnz: usize) {
        self.storage_mut_unchecked().reserve_major(k, nnz)
    }

    pub fn trim(&mut self) {
        self.storage_mut_unchecked().trim()
    }

    pub fn trim_major(&mut self, k: usize) {
        self.storage_mut_unchecked().trim_major(k)
    }

    fn check_bounds(&self, i: usize, j: usize) {
        let n = self.nrows();
        assert!(i < n && j < n, "({i}, {j}) is out of bounds for {n}x{n}");
    }

    fn check_free(&self, i: usize, j: usize) -> Result<()> {
        self.check_bounds(i, j);

        let cell = S::cell(i, j);
        if cell.is_free() {
            Ok(())
        } else {
            debug!("rejected access to {cell} element ({i}, {j}) of {} matrix", S::NAME);
            err!(InvalidAccess, "invalid access to {cell} element ({i}, {j})")
        }
    }

    fn reject_erase<T>(k: usize) -> Result<T> {
        debug!("rejected erasure of diagonal element ({k}, {k}) of {} matrix", S::NAME);
        err!(InvalidAccess, "cannot erase diagonal element ({k}, {k})")
    }
}

#[cfg(test)]
mod tests {
    use tessera::ErrorKind;
    use crate::{MatExpr, RowMajor, ColMajor};
    use crate::adaptor::*;
    use crate::storage::CompressedMatrix;

    type UL = UniLowerMatrix<CompressedMatrix<i32, RowMajor>>;

    #[test]
    fn with_capacities() {
        let l = UL::with_capacities(3, &[1, 2, 3]).unwrap();
        assert_eq!(l, UL::new(3));
        assert_eq!(l.capacity(), 6);
        assert_eq!(l.capacity_major(2), 3);

        let e = UL::with_capacities(3, &[1, 0, 3]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidCapacity);

        let s = StrictlyLowerMatrix::<CompressedMatrix<i32>>::with_capacities(3, &[0, 1, 2]);
        assert!(s.is_ok());
    }

    #[test]
    fn set_insert() {
        let mut l = UL::new(3);
        assert_eq!(l.set(2, 1, 5), Ok(0));
        assert_eq!(l.set(2, 0, 4), Ok(0));
        assert_eq!(l.set(2, 1, 6), Ok(1));
        assert_eq!(l.insert(1, 0, 3), Ok(0));

        assert_eq!(l.insert(1, 0, 3).unwrap_err().kind(), ErrorKind::DuplicateEntry);
        assert_eq!(l.set(1, 1, 3).unwrap_err().kind(), ErrorKind::InvalidAccess);
        assert_eq!(l.insert(0, 2, 3).unwrap_err().kind(), ErrorKind::InvalidAccess);

        assert_eq!(l.get(2, 1), 6);
        assert_eq!(l.get(1, 1), 1);
        assert_eq!(l.non_zeros(), 6);
    }

    #[test]
    fn append() {
        let mut l = UL::new(3);
        l.append(1, 0, 2, false).unwrap();
        l.append(2, 0, 0, true).unwrap();
        l.append(2, 1, 3, true).unwrap();
        l.finalize(2);

        assert!(l.append(0, 0, 1, false).is_err());
        assert!(l.append(1, 0, 1, false).is_err());

        assert_eq!(l.non_zeros(), 5);
        assert_eq!(l.find(2, 0), None);
        assert_eq!(l.get(2, 1), 3);
    }

    #[test]
    fn erase() {
        let mut l = UL::new(3);
        l.set(2, 0, 1).unwrap();
        l.set(2, 1, 2).unwrap();

        assert_eq!(l.erase(2, 2).unwrap_err().kind(), ErrorKind::InvalidAccess);
        assert!(l.erase(2, 0).is_ok());
        assert!(l.erase(0, 2).is_ok());
        assert_eq!(l.non_zeros(), 4);
        assert_eq!(l.get(2, 2), 1);
    }

    #[test]
    fn erase_range() {
        let mut l = UL::new(3);
        l.set(2, 0, 1).unwrap();
        l.set(2, 1, 2).unwrap();

        let before = l.clone();
        assert!(l.erase_range(2, 1..3).is_err());
        assert!(l.erase_at(2, 2).is_err());
        assert_eq!(l, before);

        assert_eq!(l.erase_range(2, 0..2), Ok(0));
        assert_eq!(l, UL::new(3));
    }

    #[test]
    fn erase_with_position() {
        let mut l = UniLowerMatrix::<CompressedMatrix<i32, ColMajor>>::new(3);
        l.set(2, 0, 1).unwrap();
        l.set(1, 0, 2).unwrap();

        let pos = {
            let mut itr = l.iter_mut(0);
            while let Some(v) = itr.next() {
                if v.position() == (1, 0) {
                    break
                }
            }
            itr.position() - 1
        };

        assert_eq!(l.erase_at(0, pos), Ok(1));
        assert_eq!(l.get(1, 0), 0);
        assert_eq!(l.get(2, 0), 1);
    }

    #[test]
    fn bounds() {
        let mut l = UL::new(4);
        l.set(3, 0, 1).unwrap();
        l.set(3, 2, 1).unwrap();
        assert_eq!(l.find(3, 2), Some(1));
        assert_eq!(l.find(3, 1), None);
        assert_eq!(l.lower_bound(3, 1), 1);
        assert_eq!(l.upper_bound(3, 2), 2);
        assert_eq!(l.upper_bound(3, 3), 3);
    }

    #[test]
    fn reserve_trim() {
        let mut l = UL::new(3);
        l.reserve(10);
        assert_eq!(l.capacity(), 10);

        l.reserve_major(0, 4);
        assert!(l.capacity_major(0) >= 4);

        l.trim();
        assert_eq!(l.capacity(), 3);
        assert_eq!(l, UL::new(3));

        l.reserve(5);
        l.trim_major(2);
        assert_eq!(l.capacity(), 3);
    }
}
