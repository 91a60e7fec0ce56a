//! Lazy matrix expressions.
//!
//! An expression only borrows its operands and is evaluated when it is
//! visited, typically by an assignment into some target matrix.

use num_traits::Zero;
use crate::{MatExpr, MatTrait, RowMajor};
use crate::props::MatProps;
use crate::storage::{CompressedMatrix, Storage};

pub fn add<'a, A, B>(lhs: &'a A, rhs: &'a B) -> MatAdd<'a, A, B>
where A: MatExpr, B: MatExpr<Elem = A::Elem> {
    assert_eq!(lhs.shape(), rhs.shape(), "matrix sizes do not match");
    MatAdd { lhs, rhs }
}

pub fn sub<'a, A, B>(lhs: &'a A, rhs: &'a B) -> MatSub<'a, A, B>
where A: MatExpr, B: MatExpr<Elem = A::Elem> {
    assert_eq!(lhs.shape(), rhs.shape(), "matrix sizes do not match");
    MatSub { lhs, rhs }
}

pub fn mul<'a, A, B>(lhs: &'a A, rhs: &'a B) -> MatMul<'a, A, B>
where A: MatExpr, B: MatExpr<Elem = A::Elem> {
    assert_eq!(lhs.ncols(), rhs.nrows(), "matrix sizes do not match");
    MatMul { lhs, rhs }
}

pub fn trans<'a, A>(inner: &'a A) -> MatTrans<'a, A>
where A: MatExpr {
    MatTrans { inner }
}

#[derive(Clone, Copy, Debug)]
pub struct MatAdd<'a, A, B> {
    lhs: &'a A,
    rhs: &'a B
}

#[derive(Clone, Copy, Debug)]
pub struct MatSub<'a, A, B> {
    lhs: &'a A,
    rhs: &'a B
}

#[derive(Clone, Copy, Debug)]
pub struct MatMul<'a, A, B> {
    lhs: &'a A,
    rhs: &'a B
}

#[derive(Clone, Copy, Debug)]
pub struct MatTrans<'a, A> {
    inner: &'a A
}

impl<'a, A, B> MatTrait for MatAdd<'a, A, B>
where A: MatTrait {
    fn shape(&self) -> (usize, usize) {
        self.lhs.shape()
    }
}

impl<'a, A, B> MatTrait for MatSub<'a, A, B>
where A: MatTrait {
    fn shape(&self) -> (usize, usize) {
        self.lhs.shape()
    }
}

impl<'a, A, B> MatTrait for MatMul<'a, A, B>
where A: MatTrait, B: MatTrait {
    fn shape(&self) -> (usize, usize) {
        (self.lhs.nrows(), self.rhs.ncols())
    }
}

impl<'a, A> MatTrait for MatTrans<'a, A>
where A: MatTrait {
    fn shape(&self) -> (usize, usize) {
        let (m, n) = self.inner.shape();
        (n, m)
    }
}

impl<'a, A, B> MatAdd<'a, A, B>
where A: MatExpr, B: MatExpr<Elem = A::Elem> {
    pub fn eval(&self) -> CompressedMatrix<A::Elem, RowMajor> {
        let mut c = CompressedMatrix::from_expr(self.lhs);
        c.add_assign_expr(self.rhs);
        c
    }
}

impl<'a, A, B> MatSub<'a, A, B>
where A: MatExpr, B: MatExpr<Elem = A::Elem> {
    pub fn eval(&self) -> CompressedMatrix<A::Elem, RowMajor> {
        let mut c = CompressedMatrix::from_expr(self.lhs);
        c.sub_assign_expr(self.rhs);
        c
    }
}

impl<'a, A, B> MatMul<'a, A, B>
where A: MatExpr, B: MatExpr<Elem = A::Elem> {
    pub fn eval(&self) -> CompressedMatrix<A::Elem, RowMajor> {
        let c = CompressedMatrix::<_, RowMajor>::from_expr(self.lhs);
        c.mul_expr(self.rhs)
    }
}

impl<'a, A, B> MatExpr for MatAdd<'a, A, B>
where A: MatExpr, B: MatExpr<Elem = A::Elem> {
    type Elem = A::Elem;
    const PROPS: MatProps = MatProps::add(A::PROPS, B::PROPS);
    const IS_COMPUTATION: bool = true;

    fn get(&self, i: usize, j: usize) -> A::Elem {
        self.lhs.get(i, j) + self.rhs.get(i, j)
    }

    fn visit<F>(&self, f: F)
    where F: FnMut(usize, usize, &A::Elem) {
        self.eval().visit(f)
    }
}

impl<'a, A, B> MatExpr for MatSub<'a, A, B>
where A: MatExpr, B: MatExpr<Elem = A::Elem> {
    type Elem = A::Elem;
    const PROPS: MatProps = MatProps::sub(A::PROPS, B::PROPS);
    const IS_COMPUTATION: bool = true;

    fn get(&self, i: usize, j: usize) -> A::Elem {
        self.lhs.get(i, j) - self.rhs.get(i, j)
    }

    fn visit<F>(&self, f: F)
    where F: FnMut(usize, usize, &A::Elem) {
        self.eval().visit(f)
    }
}

impl<'a, A, B> MatExpr for MatMul<'a, A, B>
where A: MatExpr, B: MatExpr<Elem = A::Elem> {
    type Elem = A::Elem;
    const PROPS: MatProps = MatProps::mul(A::PROPS, B::PROPS);
    const IS_COMPUTATION: bool = true;

    // a single entry costs a full dot product.
    fn get(&self, i: usize, j: usize) -> A::Elem {
        let n = self.lhs.ncols();
        (0..n).fold(A::Elem::zero(), |acc, k|
            acc + self.lhs.get(i, k) * self.rhs.get(k, j)
        )
    }

    fn visit<F>(&self, f: F)
    where F: FnMut(usize, usize, &A::Elem) {
        self.eval().visit(f)
    }
}

impl<'a, A> MatExpr for MatTrans<'a, A>
where A: MatExpr {
    type Elem = A::Elem;
    const PROPS: MatProps = A::PROPS.trans();
    const IS_COMPUTATION: bool = A::IS_COMPUTATION;

    fn get(&self, i: usize, j: usize) -> A::Elem {
        self.inner.get(j, i)
    }

    fn visit<F>(&self, mut f: F)
    where F: FnMut(usize, usize, &A::Elem) {
        self.inner.visit(|i, j, a| f(j, i, a))
    }
}

#[cfg(test)]
mod tests {
    use crate::pred::*;
    use super::*;

    fn m(data: [i32; 4]) -> CompressedMatrix<i32> {
        CompressedMatrix::from_dense_data((2, 2), data)
    }

    #[test]
    fn add_sub() {
        let a = m([1, 2, 0, 1]);
        let b = m([0, 1, 3, 0]);

        let s = add(&a, &b);
        assert!(<MatAdd<'static, CompressedMatrix<i32>, CompressedMatrix<i32>> as MatExpr>::IS_COMPUTATION);
        assert_eq!(s.shape(), (2, 2));
        assert_eq!(s.get(1, 0), 3);
        assert_eq!(s.eval(), m([1, 3, 3, 1]));

        let d = sub(&a, &b);
        assert_eq!(d.eval(), m([1, 1, -3, 1]));
    }

    #[test]
    fn mul() {
        let a = m([1, 2, 0, 1]);
        let b = m([1, 0, 3, 1]);
        let p = super::mul(&a, &b);
        assert_eq!(p.get(0, 0), 7);
        assert_eq!(p.eval(), m([7, 2, 3, 1]));
        assert!(is_uni_lower(&super::mul(&b, &b)));
    }

    #[test]
    fn trans() {
        let a = CompressedMatrix::<i32>::from_dense_data((2, 3), [1, 2, 3, 4, 5, 6]);
        let t = super::trans(&a);
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.get(2, 1), 6);

        let mut v = vec![];
        t.visit(|i, j, x| v.push((i, j, *x)));
        assert!(v.contains(&(2, 0, 3)));
    }

    #[test]
    #[should_panic]
    fn shape_mismatch() {
        let a = CompressedMatrix::<i32>::zero((2, 2));
        let b = CompressedMatrix::<i32>::zero((2, 3));
        let _ = add(&a, &b);
    }

    #[test]
    fn props() {
        type A<'a> = MatAdd<'a, CompressedMatrix<i32>, CompressedMatrix<i32>>;
        assert_eq!(<A<'static> as MatExpr>::PROPS, MatProps::NONE);
    }
}
