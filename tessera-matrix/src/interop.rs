//! Matrices from `nalgebra`, `nalgebra-sparse` and `sprs` as assignment sources.
//!
//! None of these types carries structural guarantees, so an adaptor always
//! validates them dynamically.

use nalgebra::DMatrix;
use nalgebra_sparse::{CscMatrix, CsrMatrix};
use sprs::CsMat;
use tessera::Elem;
use crate::{MatExpr, MatTrait, StorageOrder};
use crate::storage::CompressedMatrix;

impl<T> MatTrait for DMatrix<T> {
    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}

impl<T> MatExpr for DMatrix<T>
where T: Elem {
    type Elem = T;

    fn get(&self, i: usize, j: usize) -> T {
        self[(i, j)].clone()
    }

    fn visit<F>(&self, mut f: F)
    where F: FnMut(usize, usize, &T) {
        let m = self.nrows();
        for (p, a) in self.iter().enumerate() {
            f(p % m, p / m, a)
        }
    }
}

impl<T> MatTrait for CscMatrix<T> {
    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}

impl<T> MatExpr for CscMatrix<T>
where T: Elem {
    type Elem = T;

    fn get(&self, i: usize, j: usize) -> T {
        assert!(i < self.nrows() && j < self.ncols());
        match self.get_entry(i, j) {
            Some(e) => e.into_value(),
            None => T::zero()
        }
    }

    fn visit<F>(&self, mut f: F)
    where F: FnMut(usize, usize, &T) {
        for (i, j, a) in self.triplet_iter() {
            f(i, j, a)
        }
    }
}

impl<T> MatTrait for CsrMatrix<T> {
    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}

impl<T> MatExpr for CsrMatrix<T>
where T: Elem {
    type Elem = T;

    fn get(&self, i: usize, j: usize) -> T {
        assert!(i < self.nrows() && j < self.ncols());
        match self.get_entry(i, j) {
            Some(e) => e.into_value(),
            None => T::zero()
        }
    }

    fn visit<F>(&self, mut f: F)
    where F: FnMut(usize, usize, &T) {
        for (i, j, a) in self.triplet_iter() {
            f(i, j, a)
        }
    }
}

impl<T> MatTrait for CsMat<T> {
    fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }
}

impl<T> MatExpr for CsMat<T>
where T: Elem {
    type Elem = T;

    fn get(&self, i: usize, j: usize) -> T {
        assert!(i < self.rows() && j < self.cols());
        match CsMat::get(self, i, j) {
            Some(a) => a.clone(),
            None => T::zero()
        }
    }

    fn visit<F>(&self, mut f: F)
    where F: FnMut(usize, usize, &T) {
        for (a, (i, j)) in self.iter() {
            f(i, j, a)
        }
    }
}

impl<T, SO> CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    pub fn to_dmatrix(&self) -> DMatrix<T> {
        let (m, n) = self.shape();
        let mut a = DMatrix::from_element(m, n, T::zero());
        for (i, j, x) in self.iter() {
            a[(i, j)] = x.clone();
        }
        a
    }
}

#[cfg(test)]
mod tests {
    use nalgebra_sparse::CooMatrix;
    use crate::RowMajor;
    use crate::pred::*;
    use crate::storage::Storage;
    use super::*;

    #[test]
    fn dmatrix() {
        let a = DMatrix::from_row_slice(2, 2, &[1, 0, 3, 1]);
        assert_eq!(MatExpr::get(&a, 1, 0), 3);
        assert!(is_uni_lower(&a));

        let b = CompressedMatrix::<i32, RowMajor>::from_expr(&a);
        assert_eq!(b.non_zeros(), 3);
        assert_eq!(b.to_dmatrix(), a);
    }

    #[test]
    fn csc_csr() {
        let mut coo = CooMatrix::new(3, 3);
        coo.push(0, 0, 1);
        coo.push(1, 1, 1);
        coo.push(2, 2, 1);
        coo.push(0, 2, 5);

        let csc = CscMatrix::from(&coo);
        let csr = CsrMatrix::from(&coo);

        assert_eq!(MatExpr::get(&csc, 0, 2), 5);
        assert_eq!(MatExpr::get(&csr, 2, 0), 0);
        assert!(is_uni_upper(&csc));
        assert!(is_uni_upper(&csr));
        assert!(!is_uni_lower(&csr));
    }

    #[test]
    fn sprs_csmat() {
        let a = CsMat::new((2, 2), vec![0, 1, 3], vec![0, 0, 1], vec![1, 4, 1]);
        assert_eq!(MatExpr::get(&a, 1, 0), 4);
        assert!(is_uni_lower(&a));
        assert!(!is_strictly_lower(&a));
    }
}
