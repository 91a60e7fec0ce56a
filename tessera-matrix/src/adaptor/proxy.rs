use log::debug;
use tessera::{ComplexElem, Elem, Result, err};
use crate::storage::Storage;
use super::Cell;

/// Write access to one cell of a triangular matrix.
///
/// Reading always succeeds. Every write to a cell that is not free fails
/// with `InvalidAccess` and leaves the value as it is.
pub trait GuardedMut {
    type Elem: Elem;

    fn get(&self) -> Self::Elem;

    /// Position `(i, j)` of the cell.
    fn position(&self) -> (usize, usize);

    fn cell(&self) -> Cell;

    /// Applies `f` to the value if the cell is free.
    fn update<F>(&mut self, f: F) -> Result<()>
    where F: FnOnce(&mut Self::Elem);

    fn is_diagonal(&self) -> bool {
        self.cell() == Cell::Diagonal
    }

    fn check(&self) -> Result<()> {
        let cell = self.cell();
        if cell.is_free() {
            Ok(())
        } else {
            let (i, j) = self.position();
            debug!("rejected write to {cell} element ({i}, {j})");
            err!(InvalidAccess, "invalid assignment to {cell} element ({i}, {j})")
        }
    }

    fn assign(&mut self, a: Self::Elem) -> Result<()> {
        self.update(|x| *x = a)
    }

    fn add_assign(&mut self, a: Self::Elem) -> Result<()> {
        self.update(|x| *x += a)
    }

    fn sub_assign(&mut self, a: Self::Elem) -> Result<()> {
        self.update(|x| *x -= a)
    }

    fn mul_assign(&mut self, a: Self::Elem) -> Result<()> {
        self.update(|x| *x *= a)
    }

    fn div_assign(&mut self, a: Self::Elem) -> Result<()> {
        self.update(|x| *x /= a)
    }
}

/// Real and imaginary parts through a [`GuardedMut`].
pub trait GuardedComplex: GuardedMut
where Self::Elem: ComplexElem {
    fn real(&self) -> <Self::Elem as ComplexElem>::Real {
        self.get().re()
    }

    fn imag(&self) -> <Self::Elem as ComplexElem>::Real {
        self.get().im()
    }

    fn set_real(&mut self, r: <Self::Elem as ComplexElem>::Real) -> Result<()> {
        self.update(|x| x.set_re(r))
    }

    fn set_imag(&mut self, r: <Self::Elem as ComplexElem>::Real) -> Result<()> {
        self.update(|x| x.set_im(r))
    }
}

impl<P> GuardedComplex for P
where P: GuardedMut, P::Elem: ComplexElem {}

/// Handle returned by `at_mut`. A permitted write creates the entry when
/// the storage has none.
pub struct ElementProxy<'a, M> {
    storage: &'a mut M,
    i: usize,
    j: usize,
    cell: Cell
}

impl<'a, M> ElementProxy<'a, M>
where M: Storage {
    pub(super) fn new(storage: &'a mut M, i: usize, j: usize, cell: Cell) -> Self {
        Self { storage, i, j, cell }
    }
}

impl<'a, M> GuardedMut for ElementProxy<'a, M>
where M: Storage {
    type Elem = M::Elem;

    fn get(&self) -> M::Elem {
        self.storage.get(self.i, self.j)
    }

    fn position(&self) -> (usize, usize) {
        (self.i, self.j)
    }

    fn cell(&self) -> Cell {
        self.cell
    }

    fn update<F>(&mut self, f: F) -> Result<()>
    where F: FnOnce(&mut M::Elem) {
        self.check()?;
        f(self.storage.get_mut(self.i, self.j));
        Ok(())
    }
}

/// Handle yielded by [`GuardedIter`](super::GuardedIter).
pub struct GuardedValue<'a, T> {
    value: &'a mut T,
    i: usize,
    j: usize,
    cell: Cell
}

impl<'a, T> GuardedValue<'a, T> {
    pub(super) fn new(value: &'a mut T, i: usize, j: usize, cell: Cell) -> Self {
        Self { value, i, j, cell }
    }

    pub fn value(&self) -> &T {
        &*self.value
    }
}

impl<'a, T> GuardedMut for GuardedValue<'a, T>
where T: Elem {
    type Elem = T;

    fn get(&self) -> T {
        self.value.clone()
    }

    fn position(&self) -> (usize, usize) {
        (self.i, self.j)
    }

    fn cell(&self) -> Cell {
        self.cell
    }

    fn update<F>(&mut self, f: F) -> Result<()>
    where F: FnOnce(&mut T) {
        self.check()?;
        f(self.value);
        Ok(())
    }
}
