use std::marker::PhantomData;
use crate::StorageOrder;
use super::{GuardedValue, Triangle};

/// Mutable iterator over the stored entries of one major of a triangular
/// matrix. Each entry is yielded as a [`GuardedValue`], classified by its
/// position relative to the diagonal.
pub struct GuardedIter<I, SO, S> {
    inner: I,
    major: usize,
    front: usize,
    _marker: PhantomData<(SO, S)>
}

impl<I, SO, S> GuardedIter<I, SO, S> {
    pub(super) fn new(inner: I, major: usize) -> Self {
        Self { inner, major, front: 0, _marker: PhantomData }
    }

    pub fn major(&self) -> usize {
        self.major
    }

    /// Position of the next entry from the front, as accepted by `erase_at`.
    pub fn position(&self) -> usize {
        self.front
    }
}

impl<I, SO, S> GuardedIter<I, SO, S>
where SO: StorageOrder, S: Triangle {
    fn guard<'a, T>(&self, l: usize, a: &'a mut T) -> GuardedValue<'a, T> {
        let (i, j) = SO::to_row_col(self.major, l);
        GuardedValue::new(a, i, j, S::cell(i, j))
    }
}

impl<'a, T, I, SO, S> Iterator for GuardedIter<I, SO, S>
where T: 'a, I: Iterator<Item = (usize, &'a mut T)>, SO: StorageOrder, S: Triangle {
    type Item = GuardedValue<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let (l, a) = self.inner.next()?;
        self.front += 1;
        Some(self.guard(l, a))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        let rest = self.inner.size_hint().1;
        match self.inner.nth(n) {
            Some((l, a)) => {
                self.front += n + 1;
                Some(self.guard(l, a))
            }
            None => {
                self.front += rest.map_or(n + 1, |r| r.min(n + 1));
                None
            }
        }
    }
}

impl<'a, T, I, SO, S> DoubleEndedIterator for GuardedIter<I, SO, S>
where T: 'a, I: DoubleEndedIterator<Item = (usize, &'a mut T)>, SO: StorageOrder, S: Triangle {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (l, a) = self.inner.next_back()?;
        Some(self.guard(l, a))
    }
}

impl<'a, T, I, SO, S> ExactSizeIterator for GuardedIter<I, SO, S>
where T: 'a, I: ExactSizeIterator<Item = (usize, &'a mut T)>, SO: StorageOrder, S: Triangle {}
