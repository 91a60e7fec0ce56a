use std::fmt::Display;
use std::ops::Range;
use log::debug;
use num_traits::Zero;
use tessera::{Result, err};
use crate::{MatExpr, MatTrait, RowMajor, StorageOrder};
use crate::storage::{CompressedMatrix, Storage};
use super::{Cell, ElementProxy, Triangle, TriangularMatrix};

impl<M, S> TriangularMatrix<M, S>
where M: Storage, S: Triangle {
    /// The `m x n` region starting at `(row, col)`.
    pub fn submatrix_mut(&mut self, row: usize, col: usize, m: usize, n: usize) -> Submatrix<'_, M, S> {
        let size = self.nrows();
        assert!(row + m <= size && col + n <= size, "{m}x{n} region at ({row}, {col}) is out of bounds for {size}x{size}");
        Submatrix { target: self, row, col, m, n }
    }

    pub fn row_mut(&mut self, i: usize) -> Submatrix<'_, M, S> {
        let n = self.ncols();
        self.submatrix_mut(i, 0, 1, n)
    }

    pub fn column_mut(&mut self, j: usize) -> Submatrix<'_, M, S> {
        let n = self.nrows();
        self.submatrix_mut(0, j, n, 1)
    }
}

/// A rectangular region of a triangular matrix.
///
/// Writes into the region are checked against the cell classes of the
/// whole matrix, and only the region is validated.
pub struct Submatrix<'a, M, S> {
    target: &'a mut TriangularMatrix<M, S>,
    row: usize,
    col: usize,
    m: usize,
    n: usize
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Assign,
    Add,
    Sub
}

impl<'a, M, S> Submatrix<'a, M, S>
where M: Storage, S: Triangle {
    /// Position of the top-left cell in the whole matrix.
    pub fn offset(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn at_mut(&mut self, i: usize, j: usize) -> ElementProxy<'_, M> {
        self.check_bounds(i, j);
        self.target.at_mut(self.row + i, self.col + j)
    }

    /// Replaces the region by `e`.
    pub fn try_assign<E>(&mut self, e: &E) -> Result<()>
    where E: MatExpr<Elem = M::Elem> {
        self.apply(e, Mode::Assign)
    }

    pub fn try_add_assign<E>(&mut self, e: &E) -> Result<()>
    where E: MatExpr<Elem = M::Elem> {
        self.apply(e, Mode::Add)
    }

    pub fn try_sub_assign<E>(&mut self, e: &E) -> Result<()>
    where E: MatExpr<Elem = M::Elem> {
        self.apply(e, Mode::Sub)
    }

    fn apply<E>(&mut self, e: &E, mode: Mode) -> Result<()>
    where E: MatExpr<Elem = M::Elem> {
        if e.shape() != self.shape() {
            return Self::reject(format!("matrix sizes do not match: {:?}, {:?}", self.shape(), e.shape()))
        }

        if E::IS_COMPUTATION {
            let tmp = CompressedMatrix::<_, RowMajor>::from_expr(e);
            self.validate(&tmp, mode)?;
            self.commit(&tmp, mode);
        } else {
            self.validate(e, mode)?;
            self.commit(e, mode);
        }

        Ok(())
    }

    fn validate<E>(&self, e: &E, mode: Mode) -> Result<()>
    where E: MatExpr<Elem = M::Elem> {
        let (row, col) = (self.row, self.col);
        let diag = S::diag::<M::Elem>();

        let mut units = 0;
        let mut bad = None;

        e.visit(|i, j, a| {
            if bad.is_some() {
                return
            }

            let (i, j) = (row + i, col + j);
            let ok = match (S::cell(i, j), mode) {
                (Cell::Free, _) => true,
                (Cell::Diagonal, Mode::Assign) if S::UNIT => {
                    units += (a == &diag) as usize;
                    a == &diag
                }
                _ => a.is_zero()
            };

            if !ok {
                bad = Some((i, j))
            }
        });

        if let Some((i, j)) = bad {
            let cell = S::cell(i, j);
            return Self::reject(format!("{cell} element ({i}, {j}) would change"))
        }

        if S::UNIT && mode == Mode::Assign {
            let d = self.diagonal();
            if units < d.len() {
                return Self::reject("the region lacks a diagonal element")
            }
        }

        Ok(())
    }

    // writes the validated `e`. only free cells are touched.
    fn commit<E>(&mut self, e: &E, mode: Mode)
    where E: MatExpr<Elem = M::Elem> {
        let (row, col) = (self.row, self.col);
        let (rows, cols) = (row .. row + self.m, col .. col + self.n);

        let inner = self.target.storage_mut_unchecked();
        let size = inner.nrows();

        if mode == Mode::Assign {
            let (majors, minors) = if <M::Order as StorageOrder>::IS_ROW_MAJOR { (rows, cols) } else { (cols, rows) };
            for k in majors {
                let free = intersect(&minors, &S::free_minors::<M::Order>(k, size));
                if !free.is_empty() {
                    inner.reset_range(k, free)
                }
            }
        }

        e.visit(|i, j, a| {
            let (i, j) = (row + i, col + j);
            if !S::cell(i, j).is_free() || a.is_zero() {
                return
            }
            match mode {
                Mode::Assign => *inner.get_mut(i, j) = a.clone(),
                Mode::Add    => *inner.get_mut(i, j) += a.clone(),
                Mode::Sub    => *inner.get_mut(i, j) -= a.clone()
            }
        });
    }

    // indices d with (d, d) inside the region.
    fn diagonal(&self) -> Range<usize> {
        intersect(
            &(self.row .. self.row + self.m),
            &(self.col .. self.col + self.n)
        )
    }

    fn check_bounds(&self, i: usize, j: usize) {
        let (m, n) = (self.m, self.n);
        assert!(i < m && j < n, "({i}, {j}) is out of bounds for {m}x{n}");
    }

    fn reject<T, D>(reason: D) -> Result<T>
    where D: Display {
        debug!("rejected assignment to submatrix of {} matrix: {reason}", S::NAME);
        err!(InvalidAssignment, "invalid assignment to {} submatrix: {reason}", S::NAME)
    }
}

fn intersect(a: &Range<usize>, b: &Range<usize>) -> Range<usize> {
    let start = usize::max(a.start, b.start);
    let end = usize::min(a.end, b.end);
    start .. usize::max(start, end)
}

impl<'a, M, S> MatTrait for Submatrix<'a, M, S> {
    fn shape(&self) -> (usize, usize) {
        (self.m, self.n)
    }
}

impl<'a, M, S> MatExpr for Submatrix<'a, M, S>
where M: Storage, S: Triangle {
    type Elem = M::Elem;

    fn get(&self, i: usize, j: usize) -> M::Elem {
        self.check_bounds(i, j);
        self.target.get(self.row + i, self.col + j)
    }

    fn visit<F>(&self, mut f: F)
    where F: FnMut(usize, usize, &M::Elem) {
        let (rows, cols) = (self.row .. self.row + self.m, self.col .. self.col + self.n);
        self.target.visit(|i, j, a|
            if rows.contains(&i) && cols.contains(&j) {
                f(i - rows.start, j - cols.start, a)
            }
        )
    }
}
