use std::fmt::{Debug, Display};
use std::iter::Enumerate;
use std::marker::PhantomData;
use std::ops::Range;
use nalgebra::DMatrix;
use tessera::Elem;
use crate::{MatExpr, MatTrait, RowMajor, StorageOrder};
use crate::config::is_smp_sized;
use super::Storage;

/// Dense matrix. Every major is contiguous in memory.
pub struct DenseMatrix<T, SO = RowMajor> {
    data: DMatrix<T>, // minors x majors
    _order: PhantomData<SO>
}

impl<T, SO> DenseMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    pub fn zero(shape: (usize, usize)) -> Self {
        let (p, q) = (SO::minors(shape), SO::majors(shape));
        Self { data: DMatrix::from_element(p, q, T::zero()), _order: PhantomData }
    }

    pub fn id(n: usize) -> Self {
        let mut a = Self::zero((n, n));
        for k in 0..n {
            *a.get_mut(k, k) = T::one();
        }
        a
    }

    /// `data` is given in row-major order.
    pub fn from_dense_data<I>(shape: (usize, usize), data: I) -> Self
    where I: IntoIterator<Item = T> {
        let (m, n) = shape;
        let data: Vec<_> = data.into_iter().collect();
        assert_eq!(data.len(), m * n);
        Self::from_dmatrix(DMatrix::from_row_slice(m, n, &data))
    }

    pub fn from_dmatrix(a: DMatrix<T>) -> Self {
        let data = if SO::IS_ROW_MAJOR { a.transpose() } else { a };
        Self { data, _order: PhantomData }
    }

    pub fn to_dmatrix(&self) -> DMatrix<T> {
        if SO::IS_ROW_MAJOR {
            self.data.transpose()
        } else {
            self.data.clone()
        }
    }

    fn minors(&self) -> usize {
        self.data.nrows()
    }

    fn major_range(&self, k: usize) -> Range<usize> {
        let p = self.minors();
        k * p .. (k + 1) * p
    }

    fn locate(&self, i: usize, j: usize) -> (usize, usize) {
        let (m, n) = self.shape();
        assert!(i < m && j < n, "({i}, {j}) is out of bounds for {m}x{n}");
        let (k, l) = SO::to_major_minor(i, j);
        (l, k)
    }
}

impl<T, SO> MatTrait for DenseMatrix<T, SO>
where SO: StorageOrder {
    fn shape(&self) -> (usize, usize) {
        let (p, q) = self.data.shape();
        SO::to_row_col(q, p)
    }
}

impl<T, SO> MatExpr for DenseMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    type Elem = T;

    fn get(&self, i: usize, j: usize) -> T {
        self.data[self.locate(i, j)].clone()
    }

    fn visit<F>(&self, mut f: F)
    where F: FnMut(usize, usize, &T) {
        for k in 0..self.majors() {
            for (l, a) in self.major_iter(k) {
                let (i, j) = SO::to_row_col(k, l);
                f(i, j, a)
            }
        }
    }
}

impl<T, SO> Storage for DenseMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    type Order = SO;
    type Iter<'a> = Enumerate<std::slice::Iter<'a, T>> where Self: 'a;
    type IterMut<'a> = Enumerate<std::slice::IterMut<'a, T>> where Self: 'a;

    fn with_capacity(shape: (usize, usize), _nnz: usize) -> Self {
        Self::zero(shape)
    }

    fn from_expr<E>(e: &E) -> Self
    where E: MatExpr<Elem = T> {
        let mut a = Self::zero(e.shape());
        e.visit(|i, j, x| *a.get_mut(i, j) += x.clone());
        a
    }

    fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        let idx = self.locate(i, j);
        &mut self.data[idx]
    }

    fn major_iter(&self, k: usize) -> Self::Iter<'_> {
        let r = self.major_range(k);
        self.data.as_slice()[r].iter().enumerate()
    }

    fn major_iter_mut(&mut self, k: usize) -> Self::IterMut<'_> {
        let r = self.major_range(k);
        self.data.as_mut_slice()[r].iter_mut().enumerate()
    }

    fn append(&mut self, i: usize, j: usize, a: T) {
        *self.get_mut(i, j) = a
    }

    fn finalize(&mut self, _k: usize) {}

    fn reset_range(&mut self, k: usize, minors: Range<usize>) {
        let r = self.major_range(k);
        for a in &mut self.data.as_mut_slice()[r][minors] {
            a.set_zero()
        }
    }

    fn reset(&mut self) {
        self.data.fill(T::zero())
    }

    fn reset_major(&mut self, k: usize) {
        let p = self.minors();
        self.reset_range(k, 0..p)
    }

    fn clear(&mut self) {
        *self = Self::zero((0, 0))
    }

    fn resize(&mut self, shape: (usize, usize), preserve: bool) {
        let mut a = Self::zero(shape);
        if preserve {
            let (m, n) = shape;
            self.visit(|i, j, x|
                if i < m && j < n {
                    *a.get_mut(i, j) = x.clone()
                }
            );
        }
        *self = a
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn capacity_major(&self, _k: usize) -> usize {
        self.minors()
    }

    fn non_zeros(&self) -> usize {
        self.data.iter().filter(|a| !a.is_zero()).count()
    }

    fn non_zeros_major(&self, k: usize) -> usize {
        self.major_iter(k).filter(|(_, a)| !a.is_zero()).count()
    }

    fn can_smp_assign(&self) -> bool {
        is_smp_sized(self.data.len())
    }
}

impl<T, SO> Clone for DenseMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    fn clone(&self) -> Self {
        Self { data: self.data.clone(), _order: PhantomData }
    }
}

impl<T, SO> Default for DenseMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    fn default() -> Self {
        Self::zero((0, 0))
    }
}

impl<T, SO> PartialEq for DenseMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T, SO> Eq for DenseMatrix<T, SO>
where T: Elem + Eq, SO: StorageOrder {}

impl<T, SO> Display for DenseMatrix<T, SO>
where T: Elem + Display, SO: StorageOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.to_dmatrix(), f)
    }
}

impl<T, SO> Debug for DenseMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseMatrix")
            .field("shape", &self.shape())
            .field("row_major", &SO::IS_ROW_MAJOR)
            .field("data", &self.to_dmatrix())
            .finish()
    }
}

#[cfg(feature = "serde")]
impl<T, SO> serde::Serialize for DenseMatrix<T, SO>
where T: Elem + serde::Serialize, SO: StorageOrder {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where S: serde::Serializer {
        serde::Serialize::serialize(&self.to_dmatrix(), serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, SO> serde::Deserialize<'de> for DenseMatrix<T, SO>
where T: Elem + serde::Deserialize<'de>, SO: StorageOrder {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where D: serde::Deserializer<'de> {
        let a = <DMatrix<T> as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::from_dmatrix(a))
    }
}
