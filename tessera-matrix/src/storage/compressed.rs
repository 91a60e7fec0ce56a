use std::fmt::{Debug, Display};
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub, SubAssign, Mul, MulAssign, Range};
use auto_impl_ops::auto_ops;
use itertools::{EitherOrBoth, Itertools};
use log::info;
use nalgebra::DMatrix;
use num_traits::Zero;
use tessera::{Elem, Result, err};
use crate::{MatExpr, MatTrait, RowMajor, StorageOrder};
use super::{Storage, SparseStorage};

cfg_if::cfg_if! { if #[cfg(feature = "multithread")] {
    use std::cell::RefCell;
    use rayon::prelude::*;
    use thread_local::ThreadLocal;
}}

const LOG_THRESHOLD: usize = 10_000;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Element<T> {
    index: usize,
    value: T
}

impl<T> Element<T>
where T: Zero {
    fn placeholder() -> Self {
        Self { index: 0, value: T::zero() }
    }
}

/// Compressed sparse matrix.
///
/// All entries live in one array. Major `k` occupies `elems[begin[k] .. end[k]]`,
/// sorted by minor index, followed by its spare capacity up to `begin[k + 1]`.
/// Spare slots always hold placeholders.
#[derive(Clone)]
pub struct CompressedMatrix<T, SO = RowMajor> {
    shape: (usize, usize),
    elems: Vec<Element<T>>,
    begin: Vec<usize>,
    end: Vec<usize>,
    _order: PhantomData<SO>
}

impl<T, SO> MatTrait for CompressedMatrix<T, SO> {
    fn shape(&self) -> (usize, usize) {
        self.shape
    }
}

impl<T, SO> CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    pub fn new() -> Self {
        Self::zero((0, 0))
    }

    pub fn zero(shape: (usize, usize)) -> Self {
        Self::allocate(shape, vec![0; SO::majors(shape)])
    }

    pub fn id(n: usize) -> Self {
        let mut a = Self::with_capacity((n, n), n);
        for k in 0..n {
            a.append(k, k, T::one());
            a.finalize(k);
        }
        a
    }

    pub fn from_entries<I>(shape: (usize, usize), entries: I) -> Self
    where I: IntoIterator<Item = (usize, usize, T)> {
        let entries = entries.into_iter().filter(|e| !e.2.is_zero()).collect();
        Self::build(shape, entries)
    }

    pub fn from_dense_data<I>(shape: (usize, usize), data: I) -> Self
    where I: IntoIterator<Item = T> {
        let n = shape.1;
        Self::from_entries(
            shape,
            data.into_iter().enumerate().map(|(k, a)| {
                let (i, j) = (k / n, k % n);
                (i, j, a)
            })
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        (0..self.majors()).flat_map(move |k|
            self.entries(k).iter().map(move |e| {
                let (i, j) = SO::to_row_col(k, e.index);
                (i, j, &e.value)
            })
        )
    }

    pub fn iter_nz(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.iter().filter(|e| !e.2.is_zero())
    }

    /// The transpose, stored in the opposite order. No entries are moved.
    pub fn transpose(self) -> CompressedMatrix<T, SO::Opposite> {
        let (m, n) = self.shape;
        CompressedMatrix {
            shape: (n, m),
            elems: self.elems,
            begin: self.begin,
            end: self.end,
            _order: PhantomData
        }
    }

    fn allocate<I>(shape: (usize, usize), caps: I) -> Self
    where I: IntoIterator<Item = usize> {
        let mut begin = vec![0];
        for c in caps {
            let last = begin[begin.len() - 1];
            begin.push(last + c);
        }
        assert_eq!(begin.len(), SO::majors(shape) + 1);

        let total = begin[begin.len() - 1];
        let end = begin[.. begin.len() - 1].to_vec();
        let elems = (0..total).map(|_| Element::placeholder()).collect();

        Self { shape, elems, begin, end, _order: PhantomData }
    }

    // entries given as (i, j, a), duplicates are summed.
    fn build(shape: (usize, usize), entries: Vec<(usize, usize, T)>) -> Self {
        let (m, n) = shape;
        let mut entries = entries.into_iter().map(|(i, j, a)| {
            assert!(i < m && j < n, "({i}, {j}) is out of bounds for {m}x{n}");
            let (k, l) = SO::to_major_minor(i, j);
            (k, l, a)
        }).collect_vec();

        entries.sort_by_key(|e| (e.0, e.1));

        let mut majors: Vec<Vec<(usize, T)>> = vec![vec![]; SO::majors(shape)];
        for (k, l, a) in entries {
            match majors[k].last_mut() {
                Some(last) if last.0 == l => last.1 += a,
                _ => majors[k].push((l, a))
            }
        }

        Self::from_majors(shape, majors)
    }

    // each major must be sorted by minor index.
    fn from_majors(shape: (usize, usize), majors: Vec<Vec<(usize, T)>>) -> Self {
        let mut res = Self::allocate(shape, majors.iter().map(|v| v.len()));
        for (k, v) in majors.into_iter().enumerate() {
            for (l, a) in v {
                let p = res.end[k];
                res.elems[p] = Element { index: l, value: a };
                res.end[k] += 1;
            }
        }
        res
    }

    fn range(&self, k: usize) -> Range<usize> {
        self.begin[k] .. self.end[k]
    }

    fn entries(&self, k: usize) -> &[Element<T>] {
        &self.elems[self.range(k)]
    }

    fn locate(&self, i: usize, j: usize) -> (usize, usize) {
        let (m, n) = self.shape;
        assert!(i < m && j < n, "({i}, {j}) is out of bounds for {m}x{n}");
        SO::to_major_minor(i, j)
    }

    fn search(&self, k: usize, l: usize) -> std::result::Result<usize, usize> {
        self.entries(k).binary_search_by_key(&l, |e| e.index)
    }

    fn caps(&self) -> Vec<usize> {
        (0..self.majors()).map(|k| self.capacity_major(k)).collect()
    }

    // moves every major into a fresh array with the given capacities.
    fn relayout(&mut self, caps: &[usize]) {
        let majors = self.majors();
        assert_eq!(caps.len(), majors);

        let total = caps.iter().sum();
        let mut elems = Vec::with_capacity(total);
        let mut begin = Vec::with_capacity(majors + 1);
        let mut end = Vec::with_capacity(majors);

        for k in 0..majors {
            debug_assert!(caps[k] >= self.non_zeros_major(k));

            let b = elems.len();
            begin.push(b);
            for p in self.range(k) {
                let e = std::mem::replace(&mut self.elems[p], Element::placeholder());
                elems.push(e);
            }
            end.push(elems.len());
            elems.resize_with(b + caps[k], Element::placeholder);
        }
        begin.push(elems.len());

        self.elems = elems;
        self.begin = begin;
        self.end = end;
    }

    fn ensure_room(&mut self, k: usize) {
        if self.end[k] == self.begin[k + 1] {
            let nnz = self.non_zeros_major(k);
            self.reserve_major(k, nnz + 1);
        }
    }

    fn insert_at(&mut self, k: usize, pos: usize, l: usize, a: T) -> usize {
        self.ensure_room(k);

        let (b, e) = (self.begin[k], self.end[k]);
        self.elems[b + pos ..= e].rotate_right(1);
        self.elems[b + pos] = Element { index: l, value: a };
        self.end[k] += 1;

        pos
    }

    // passes the spare capacity of major `k` on to major `k + 1`.
    fn hand_over_spare(&mut self, k: usize) {
        if k + 1 >= self.majors() {
            return
        }

        let spare = self.begin[k + 1] - self.end[k];
        if spare == 0 {
            return
        }

        if self.non_zeros_major(k + 1) == 0 {
            self.begin[k + 1] = self.end[k];
            self.end[k + 1] = self.end[k];
        } else {
            let mut caps = self.caps();
            caps[k] -= spare;
            caps[k + 1] += spare;
            self.relayout(&caps);
        }
    }
}

impl<T, SO> MatExpr for CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    type Elem = T;

    fn get(&self, i: usize, j: usize) -> T {
        let (k, l) = self.locate(i, j);
        match self.search(k, l) {
            Ok(p) => self.entries(k)[p].value.clone(),
            Err(_) => T::zero()
        }
    }

    fn visit<F>(&self, mut f: F)
    where F: FnMut(usize, usize, &T) {
        for (i, j, a) in self.iter() {
            f(i, j, a)
        }
    }
}

pub struct MajorIter<'a, T> {
    inner: std::slice::Iter<'a, Element<T>>
}

impl<'a, T> Iterator for MajorIter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (e.index, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for MajorIter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|e| (e.index, &e.value))
    }
}

impl<'a, T> ExactSizeIterator for MajorIter<'a, T> {}

pub struct MajorIterMut<'a, T> {
    inner: std::slice::IterMut<'a, Element<T>>
}

impl<'a, T> Iterator for MajorIterMut<'a, T> {
    type Item = (usize, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (e.index, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for MajorIterMut<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|e| (e.index, &mut e.value))
    }
}

impl<'a, T> ExactSizeIterator for MajorIterMut<'a, T> {}

impl<T, SO> Storage for CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    type Order = SO;
    type Iter<'a> = MajorIter<'a, T> where Self: 'a;
    type IterMut<'a> = MajorIterMut<'a, T> where Self: 'a;

    // the whole capacity initially belongs to the first major,
    // and is passed on by `finalize`.
    fn with_capacity(shape: (usize, usize), nnz: usize) -> Self {
        let majors = SO::majors(shape);
        Self::allocate(shape, (0..majors).map(|k| if k == 0 { nnz } else { 0 }))
    }

    fn from_expr<E>(e: &E) -> Self
    where E: MatExpr<Elem = T> {
        let mut entries = vec![];
        e.visit(|i, j, a|
            if !a.is_zero() {
                entries.push((i, j, a.clone()))
            }
        );
        Self::build(e.shape(), entries)
    }

    fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        let (k, l) = self.locate(i, j);
        let pos = match self.search(k, l) {
            Ok(p) => p,
            Err(p) => self.insert_at(k, p, l, T::zero())
        };
        let b = self.begin[k];
        &mut self.elems[b + pos].value
    }

    fn major_iter(&self, k: usize) -> MajorIter<'_, T> {
        MajorIter { inner: self.entries(k).iter() }
    }

    fn major_iter_mut(&mut self, k: usize) -> MajorIterMut<'_, T> {
        let r = self.range(k);
        MajorIterMut { inner: self.elems[r].iter_mut() }
    }

    fn append(&mut self, i: usize, j: usize, a: T) {
        let (k, l) = self.locate(i, j);
        debug_assert!(self.entries(k).last().map_or(true, |e| e.index < l));

        self.ensure_room(k);

        let p = self.end[k];
        self.elems[p] = Element { index: l, value: a };
        self.end[k] += 1;
    }

    fn finalize(&mut self, k: usize) {
        self.hand_over_spare(k)
    }

    fn reset_range(&mut self, k: usize, minors: Range<usize>) {
        let entries = self.entries(k);
        let p = entries.partition_point(|e| e.index < minors.start);
        let q = entries.partition_point(|e| e.index < minors.end);
        if p < q {
            self.erase_range(k, p .. q);
        }
    }

    fn reset(&mut self) {
        for k in 0..self.majors() {
            self.reset_major(k)
        }
    }

    fn reset_major(&mut self, k: usize) {
        let r = self.range(k);
        for e in &mut self.elems[r] {
            *e = Element::placeholder()
        }
        self.end[k] = self.begin[k];
    }

    fn clear(&mut self) {
        *self = Self::new()
    }

    fn resize(&mut self, shape: (usize, usize), preserve: bool) {
        if !preserve {
            *self = Self::with_capacity(shape, self.capacity());
            return
        }

        let (m0, n0) = (self.majors(), SO::minors(self.shape));
        let (m1, n1) = (SO::majors(shape), SO::minors(shape));

        if n1 < n0 {
            for k in 0..usize::min(m0, m1) {
                self.reset_range(k, n1 .. n0);
            }
        }

        let len = self.elems.len();

        if m1 < m0 {
            for k in m1..m0 {
                self.reset_major(k);
            }
            self.begin.truncate(m1);
            self.begin.push(len);
            self.end.truncate(m1);
        } else if m1 > m0 {
            self.begin.pop();
            for _ in m0..m1 {
                self.begin.push(len);
                self.end.push(len);
            }
            self.begin.push(len);
        }

        self.shape = shape;
    }

    fn capacity(&self) -> usize {
        self.elems.len()
    }

    fn capacity_major(&self, k: usize) -> usize {
        self.begin[k + 1] - self.begin[k]
    }

    fn non_zeros(&self) -> usize {
        (0..self.majors()).map(|k| self.non_zeros_major(k)).sum()
    }

    fn non_zeros_major(&self, k: usize) -> usize {
        self.end[k] - self.begin[k]
    }

    fn mul_expr<E>(&self, e: &E) -> Self
    where E: MatExpr<Elem = T> {
        let b = Self::from_expr(e);
        product(self, &b)
    }

    fn can_smp_assign(&self) -> bool {
        false
    }
}

impl<T, SO> SparseStorage for CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    fn with_capacities(shape: (usize, usize), nnz: &[usize]) -> Self {
        assert_eq!(nnz.len(), SO::majors(shape));
        Self::allocate(shape, nnz.iter().cloned())
    }

    fn set(&mut self, i: usize, j: usize, a: T) -> usize {
        let (k, l) = self.locate(i, j);
        match self.search(k, l) {
            Ok(p) => {
                let b = self.begin[k];
                self.elems[b + p].value = a;
                p
            },
            Err(p) => self.insert_at(k, p, l, a)
        }
    }

    fn insert(&mut self, i: usize, j: usize, a: T) -> Result<usize> {
        let (k, l) = self.locate(i, j);
        match self.search(k, l) {
            Ok(_) => err!(DuplicateEntry, "({i}, {j}) is already stored"),
            Err(p) => Ok(self.insert_at(k, p, l, a))
        }
    }

    fn erase(&mut self, i: usize, j: usize) {
        let (k, l) = self.locate(i, j);
        if let Ok(p) = self.search(k, l) {
            self.erase_at(k, p);
        }
    }

    fn erase_at(&mut self, k: usize, pos: usize) -> usize {
        self.erase_range(k, pos .. pos + 1)
    }

    fn erase_range(&mut self, k: usize, range: Range<usize>) -> usize {
        let (b, e) = (self.begin[k], self.end[k]);
        let (p, q) = (b + range.start, b + range.end);
        assert!(p <= q && q <= e, "invalid range {range:?} for major {k}");

        let d = q - p;
        self.elems[p .. e].rotate_left(d);
        for x in &mut self.elems[e - d .. e] {
            *x = Element::placeholder()
        }
        self.end[k] -= d;

        range.start
    }

    fn find(&self, i: usize, j: usize) -> Option<usize> {
        let (k, l) = self.locate(i, j);
        self.search(k, l).ok()
    }

    fn lower_bound(&self, i: usize, j: usize) -> usize {
        let (k, l) = self.locate(i, j);
        self.entries(k).partition_point(|e| e.index < l)
    }

    fn upper_bound(&self, i: usize, j: usize) -> usize {
        let (k, l) = self.locate(i, j);
        self.entries(k).partition_point(|e| e.index <= l)
    }

    // the additional room goes to the last major.
    fn reserve(&mut self, nnz: usize) {
        let len = self.elems.len();
        let majors = self.majors();
        if nnz <= len || majors == 0 {
            return
        }
        self.elems.resize_with(nnz, Element::placeholder);
        self.begin[majors] = nnz;
    }

    fn reserve_major(&mut self, k: usize, nnz: usize) {
        let cap = self.capacity_major(k);
        if cap >= nnz {
            return
        }

        let mut needed = nnz - cap;
        let mut caps = self.caps();
        caps[k] = nnz;

        // borrow spare room from the other majors, nearest first.
        let others = (k + 1 .. self.majors()).chain((0..k).rev());
        for l in others {
            if needed == 0 {
                break
            }
            let spare = caps[l] - self.non_zeros_major(l);
            let t = usize::min(spare, needed);
            caps[l] -= t;
            needed -= t;
        }

        if needed > 0 {
            let len = self.elems.len();
            let total = len + needed;
            let grown = usize::max(total, 2 * len);
            caps[k] += grown - total;
        }

        self.relayout(&caps);
    }

    fn trim(&mut self) {
        let caps = (0..self.majors()).map(|k| self.non_zeros_major(k)).collect_vec();
        self.relayout(&caps);
    }

    fn trim_major(&mut self, k: usize) {
        let majors = self.majors();
        if k + 1 < majors {
            self.hand_over_spare(k)
        } else {
            let e = self.end[k];
            self.elems.truncate(e);
            self.begin[majors] = e;
        }
    }
}

// row-major: row i of a * b is the sum of a_ik * (row k of b).
// col-major: col j of a * b is the sum of (col k of a) * b_kj.
fn product<T, SO>(a: &CompressedMatrix<T, SO>, b: &CompressedMatrix<T, SO>) -> CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    assert_eq!(a.ncols(), b.nrows());

    let shape = (a.nrows(), b.ncols());
    let (x, y) = if SO::IS_ROW_MAJOR { (a, b) } else { (b, a) };
    let (majors, minors) = (SO::majors(shape), SO::minors(shape));

    if a.non_zeros() + b.non_zeros() >= LOG_THRESHOLD {
        info!("sparse product: {:?} * {:?}, nnz = {} + {}", a.shape(), b.shape(), a.non_zeros(), b.non_zeros());
    }

    cfg_if::cfg_if! {
        if #[cfg(feature = "multithread")] {
            let res = if crate::config::is_multithread_enabled() {
                product_m(x, y, majors, minors)
            } else {
                product_s(x, y, majors, minors)
            };
        } else {
            let res = product_s(x, y, majors, minors);
        }
    }

    CompressedMatrix::from_majors(shape, res)
}

fn product_s<T, SO>(x: &CompressedMatrix<T, SO>, y: &CompressedMatrix<T, SO>, majors: usize, minors: usize) -> Vec<Vec<(usize, T)>>
where T: Elem, SO: StorageOrder {
    let mut buf = vec![None; minors];
    (0..majors).map(|p|
        product_major(x, y, p, &mut buf)
    ).collect()
}

#[cfg(feature = "multithread")]
fn product_m<T, SO>(x: &CompressedMatrix<T, SO>, y: &CompressedMatrix<T, SO>, majors: usize, minors: usize) -> Vec<Vec<(usize, T)>>
where T: Elem, SO: StorageOrder {
    let tl_buf = ThreadLocal::new();
    (0..majors).into_par_iter().map(|p| {
        let mut buf = tl_buf.get_or(||
            RefCell::new(vec![None; minors])
        ).borrow_mut();
        product_major(x, y, p, &mut buf)
    }).collect()
}

#[inline(never)] // for profilability
fn product_major<T, SO>(x: &CompressedMatrix<T, SO>, y: &CompressedMatrix<T, SO>, p: usize, buf: &mut [Option<T>]) -> Vec<(usize, T)>
where T: Elem, SO: StorageOrder {
    let mut touched = vec![];

    for (q, u) in x.major_iter(p) {
        for (l, v) in y.major_iter(q) {
            let w = if SO::IS_ROW_MAJOR {
                u.clone() * v.clone()
            } else {
                v.clone() * u.clone()
            };
            if let Some(acc) = &mut buf[l] {
                *acc += w;
            } else {
                buf[l] = Some(w);
                touched.push(l);
            }
        }
    }

    touched.sort_unstable();
    touched.into_iter().filter_map(|l|
        buf[l].take().filter(|w| !w.is_zero()).map(|w| (l, w))
    ).collect()
}

fn merge<T, SO, F>(a: &CompressedMatrix<T, SO>, b: &CompressedMatrix<T, SO>, f: F) -> CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder, F: Fn(T, T) -> T {
    assert_eq!(a.shape(), b.shape());

    let majors: Vec<Vec<(usize, T)>> = (0..a.majors()).map(|k| {
        let itr = Itertools::merge_join_by(
            a.entries(k).iter(),
            b.entries(k).iter(),
            |x, y| x.index.cmp(&y.index)
        );
        itr.map(|e| match e {
            EitherOrBoth::Both(x, y) => (x.index, f(x.value.clone(), y.value.clone())),
            EitherOrBoth::Left(x)    => (x.index, f(x.value.clone(), T::zero())),
            EitherOrBoth::Right(y)   => (y.index, f(T::zero(), y.value.clone())),
        }).filter(|e| !e.1.is_zero()).collect()
    }).collect();

    CompressedMatrix::from_majors(a.shape(), majors)
}

#[auto_ops]
impl<'a, 'b, T, SO> Add<&'b CompressedMatrix<T, SO>> for &'a CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    type Output = CompressedMatrix<T, SO>;
    fn add(self, rhs: &'b CompressedMatrix<T, SO>) -> Self::Output {
        merge(self, rhs, |x, y| x + y)
    }
}

#[auto_ops]
impl<'a, 'b, T, SO> Sub<&'b CompressedMatrix<T, SO>> for &'a CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    type Output = CompressedMatrix<T, SO>;
    fn sub(self, rhs: &'b CompressedMatrix<T, SO>) -> Self::Output {
        merge(self, rhs, |x, y| x - y)
    }
}

#[auto_ops]
impl<'a, 'b, T, SO> Mul<&'b CompressedMatrix<T, SO>> for &'a CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    type Output = CompressedMatrix<T, SO>;
    fn mul(self, rhs: &'b CompressedMatrix<T, SO>) -> Self::Output {
        product(self, rhs)
    }
}

impl<T, SO> Default for CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, SO> PartialEq for CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && (0..self.majors()).all(|k|
            self.entries(k) == other.entries(k)
        )
    }
}

impl<T, SO> Eq for CompressedMatrix<T, SO>
where T: Elem + Eq, SO: StorageOrder {}

impl<T, SO> Display for CompressedMatrix<T, SO>
where T: Elem + Display, SO: StorageOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (m, n) = self.shape;
        let d = DMatrix::from_fn(m, n, |i, j| self.get(i, j));
        Display::fmt(&d, f)
    }
}

impl<T, SO> Debug for CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompressedMatrix")
            .field("shape", &self.shape)
            .field("row_major", &SO::IS_ROW_MAJOR)
            .field("entries", &self.iter().collect_vec())
            .finish()
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct CompressedRepr<T> {
    shape: (usize, usize),
    entries: Vec<(usize, usize, T)>
}

#[cfg(feature = "serde")]
impl<T, SO> serde::Serialize for CompressedMatrix<T, SO>
where T: Elem + serde::Serialize, SO: StorageOrder {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where S: serde::Serializer {
        let repr = CompressedRepr {
            shape: self.shape,
            entries: self.iter().map(|(i, j, a)| (i, j, a.clone())).collect()
        };
        serde::Serialize::serialize(&repr, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, SO> serde::Deserialize<'de> for CompressedMatrix<T, SO>
where T: Elem + serde::Deserialize<'de>, SO: StorageOrder {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where D: serde::Deserializer<'de> {
        use serde::de::Error;

        let repr = <CompressedRepr<T> as serde::Deserialize>::deserialize(deserializer)?;
        let (m, n) = repr.shape;
        if let Some((i, j, _)) = repr.entries.iter().find(|(i, j, _)| *i >= m || *j >= n) {
            return Err(D::Error::custom(format!("({i}, {j}) is out of bounds for {m}x{n}")))
        }
        Ok(Self::build(repr.shape, repr.entries))
    }
}

#[cfg(test)]
impl<T, SO> CompressedMatrix<T, SO>
where T: Elem, SO: StorageOrder {
    pub fn rand(shape: (usize, usize), density: f64) -> Self {
        use cartesian::cartesian;
        use rand::Rng;

        let (m, n) = shape;
        let range = cartesian!(0..m, 0..n);
        let mut rng = rand::thread_rng();

        Self::from_entries(shape, range.filter_map(|(i, j)|
            if rng.gen::<f64>() < density {
                Some((i, j, T::one()))
            } else {
                None
            }
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::ColMajor;
    use super::*;

    fn dump<T, SO>(a: &CompressedMatrix<T, SO>) -> (Vec<usize>, Vec<usize>, Vec<T>)
    where T: Elem, SO: StorageOrder {
        let mut ptr = vec![0];
        let mut idx = vec![];
        let mut val = vec![];
        for k in 0..a.majors() {
            for (l, x) in a.major_iter(k) {
                idx.push(l);
                val.push(x.clone());
            }
            ptr.push(idx.len());
        }
        (ptr, idx, val)
    }

    #[test]
    fn init() {
        let a = CompressedMatrix::<_, RowMajor>::from_entries((2, 2), [
            (0, 0, 1),
            (0, 1, 2),
            (1, 0, 3),
            (1, 1, 4)
        ]);
        assert_eq!(dump(&a), (vec![0, 2, 4], vec![0, 1, 0, 1], vec![1, 2, 3, 4]));
    }

    #[test]
    fn init_col_major() {
        let a = CompressedMatrix::<_, ColMajor>::from_entries((2, 2), [
            (0, 0, 1),
            (0, 1, 2),
            (1, 0, 3),
            (1, 1, 4)
        ]);
        assert_eq!(dump(&a), (vec![0, 2, 4], vec![0, 1, 0, 1], vec![1, 3, 2, 4]));
    }

    #[test]
    fn init_duplicates() {
        let a = CompressedMatrix::<_, RowMajor>::from_entries((2, 2), [
            (1, 0, 3),
            (0, 1, 2),
            (1, 0, 4),
        ]);
        assert_eq!(dump(&a), (vec![0, 1, 2], vec![1, 0], vec![2, 7]));
    }

    #[test]
    fn from_dense_data() {
        let a = CompressedMatrix::<_, RowMajor>::from_dense_data((2, 3), [1, 0, 2, 0, 3, 0]);
        assert_eq!(dump(&a), (vec![0, 2, 3], vec![0, 2, 1], vec![1, 2, 3]));
        assert_eq!(a.get(0, 2), 2);
        assert_eq!(a.get(1, 2), 0);
        assert_eq!(a.non_zeros(), 3);
    }

    #[test]
    fn id() {
        let a = CompressedMatrix::<i32>::id(3);
        assert_eq!(a, CompressedMatrix::from_dense_data((3, 3), [
            1, 0, 0,
            0, 1, 0,
            0, 0, 1
        ]));
        assert_eq!(a.capacity(), 3);
        assert!((0..3).all(|k| a.capacity_major(k) == 1));
    }

    #[test]
    fn set_and_insert() {
        let mut a = CompressedMatrix::<i32>::zero((3, 3));
        assert_eq!(a.set(1, 2, 5), 0);
        assert_eq!(a.set(1, 0, 4), 0);
        assert_eq!(a.set(1, 2, 6), 1);
        assert_eq!(a.insert(1, 1, 7), Ok(1));

        let e = a.insert(1, 1, 8).unwrap_err();
        assert_eq!(e.kind(), tessera::ErrorKind::DuplicateEntry);

        assert_eq!(a, CompressedMatrix::from_dense_data((3, 3), [
            0, 0, 0,
            4, 7, 6,
            0, 0, 0
        ]));
    }

    #[test]
    fn get_mut_creates_entry() {
        let mut a = CompressedMatrix::<i32>::zero((2, 2));
        *a.get_mut(0, 1) += 3;
        *a.get_mut(0, 1) += 3;
        assert_eq!(a.get(0, 1), 6);
        assert_eq!(a.non_zeros(), 1);
    }

    #[test]
    fn iter_nz_skips_explicit_zeros() {
        let mut a = CompressedMatrix::<i32, ColMajor>::from_dense_data((2, 2), [
            1, 2,
            0, 3
        ]);
        a.set(1, 0, 0);
        assert_eq!(a.iter().count(), 4);
        assert_eq!(
            a.iter_nz().map(|(i, j, x)| (i, j, *x)).collect::<Vec<_>>(),
            vec![(0, 0, 1), (0, 1, 2), (1, 1, 3)]
        );
    }

    #[test]
    fn erase() {
        let mut a = CompressedMatrix::<_, RowMajor>::from_dense_data((2, 4), [
            1, 2, 3, 4,
            5, 6, 7, 8
        ]);
        a.erase(0, 1);
        assert_eq!(a.non_zeros_major(0), 3);
        assert_eq!(a.erase_at(1, 0), 0);
        assert_eq!(a.erase_range(1, 1 .. 3), 1);
        a.erase(0, 1); // absent

        assert_eq!(a, CompressedMatrix::from_dense_data((2, 4), [
            1, 0, 3, 4,
            0, 6, 0, 0
        ]));
        assert_eq!(a.capacity(), 8);
    }

    #[test]
    fn bounds() {
        let a = CompressedMatrix::<_, RowMajor>::from_dense_data((1, 6), [
            0, 1, 0, 1, 1, 0
        ]);
        assert_eq!(a.find(0, 3), Some(1));
        assert_eq!(a.find(0, 2), None);
        assert_eq!(a.lower_bound(0, 2), 1);
        assert_eq!(a.lower_bound(0, 3), 1);
        assert_eq!(a.upper_bound(0, 3), 2);
        assert_eq!(a.upper_bound(0, 5), 3);
    }

    #[test]
    fn append_finalize() {
        let mut a = CompressedMatrix::<i32, RowMajor>::with_capacity((3, 3), 4);
        a.append(0, 0, 1);
        a.append(0, 2, 2);
        a.finalize(0);
        a.finalize(1);
        a.append(2, 1, 3);
        a.append(2, 2, 4);
        a.finalize(2);

        assert_eq!(a, CompressedMatrix::from_dense_data((3, 3), [
            1, 0, 2,
            0, 0, 0,
            0, 3, 4
        ]));
        assert_eq!(a.capacity(), 4);
    }

    #[test]
    fn append_beyond_capacity() {
        let mut a = CompressedMatrix::<i32, RowMajor>::with_capacity((2, 3), 1);
        a.append(0, 0, 1);
        a.append(0, 1, 2);
        a.finalize(0);
        a.append(1, 2, 3);
        a.finalize(1);

        assert_eq!(a, CompressedMatrix::from_dense_data((2, 3), [
            1, 2, 0,
            0, 0, 3
        ]));
    }

    #[test]
    fn reserve_major_borrows() {
        let mut a = CompressedMatrix::<i32, RowMajor>::with_capacities((3, 3), &[1, 1, 4]);
        a.set(2, 0, 1);
        a.reserve_major(0, 3);
        assert_eq!(a.capacity(), 6);
        assert_eq!(a.capacity_major(0), 3);
        assert_eq!(a.capacity_major(1), 0);
        assert_eq!(a.capacity_major(2), 3);
        assert_eq!(a.get(2, 0), 1);
    }

    #[test]
    fn reserve_major_grows() {
        let mut a = CompressedMatrix::<i32, RowMajor>::id(2);
        a.reserve_major(1, 3);
        assert!(a.capacity_major(1) >= 3);
        assert_eq!(a, CompressedMatrix::id(2));
    }

    #[test]
    fn reserve_and_trim() {
        let mut a = CompressedMatrix::<i32, RowMajor>::id(3);
        a.reserve(10);
        assert_eq!(a.capacity(), 10);
        assert_eq!(a.capacity_major(2), 8);

        a.trim_major(2);
        assert_eq!(a.capacity(), 3);

        a.reserve_major(0, 4);
        a.trim();
        assert_eq!(a.capacity(), 3);
        assert_eq!(a, CompressedMatrix::id(3));
    }

    #[test]
    fn resize() {
        let mut a = CompressedMatrix::<_, RowMajor>::from_dense_data((2, 2), [
            1, 2,
            3, 4
        ]);
        a.resize((3, 3), true);
        assert_eq!(a, CompressedMatrix::from_dense_data((3, 3), [
            1, 2, 0,
            3, 4, 0,
            0, 0, 0
        ]));

        a.set(2, 2, 5);
        a.resize((1, 1), true);
        assert_eq!(a, CompressedMatrix::from_dense_data((1, 1), [1]));

        a.resize((2, 2), false);
        assert_eq!(a, CompressedMatrix::zero((2, 2)));
    }

    #[test]
    fn reset_range() {
        let mut a = CompressedMatrix::<_, ColMajor>::from_dense_data((3, 3), [
            1, 2, 3,
            4, 5, 6,
            7, 8, 9
        ]);
        a.reset_range(1, 1 .. 3);
        assert_eq!(a, CompressedMatrix::from_dense_data((3, 3), [
            1, 2, 3,
            4, 0, 6,
            7, 0, 9
        ]));
    }

    #[test]
    fn transpose() {
        let a = CompressedMatrix::<_, RowMajor>::from_dense_data((2, 3), 0..6);
        let b = a.transpose();
        assert_eq!(b, CompressedMatrix::<_, ColMajor>::from_dense_data((3, 2), [
            0, 3,
            1, 4,
            2, 5
        ]));
    }

    #[test]
    fn add_sub() {
        let a = CompressedMatrix::<_, RowMajor>::from_dense_data((2, 2), [1, 0, 2, 3]);
        let b = CompressedMatrix::<_, RowMajor>::from_dense_data((2, 2), [0, 5, -2, 1]);
        assert_eq!(&a + &b, CompressedMatrix::from_dense_data((2, 2), [1, 5, 0, 4]));
        assert_eq!(a - b, CompressedMatrix::from_dense_data((2, 2), [1, -5, 4, 2]));
    }

    #[test]
    fn mul() {
        let a = CompressedMatrix::<_, RowMajor>::from_dense_data((2, 3), [
            1, 0, 2,
            0, 3, 0
        ]);
        let b = CompressedMatrix::<_, RowMajor>::from_dense_data((3, 2), [
            1, 2,
            0, 1,
            4, 0
        ]);
        assert_eq!(&a * &b, CompressedMatrix::from_dense_data((2, 2), [
            9, 2,
            0, 3
        ]));
    }

    #[test]
    fn mul_col_major() {
        let a = CompressedMatrix::<_, ColMajor>::from_dense_data((2, 3), [
            1, 0, 2,
            0, 3, 0
        ]);
        let b = CompressedMatrix::<_, ColMajor>::from_dense_data((3, 2), [
            1, 2,
            0, 1,
            4, 0
        ]);
        assert_eq!(a * b, CompressedMatrix::from_dense_data((2, 2), [
            9, 2,
            0, 3
        ]));
    }

    #[test]
    fn mul_single_thread() {
        let a = CompressedMatrix::<i64, RowMajor>::rand((30, 20), 0.3);
        let b = CompressedMatrix::<i64, RowMajor>::rand((20, 25), 0.3);

        crate::config::set_multithread_enabled(false);
        let c1 = &a * &b;
        crate::config::set_multithread_enabled(true);
        let c2 = &a * &b;

        assert_eq!(c1, c2);
    }

    #[test]
    fn mul_expr_mixed_order() {
        let a = CompressedMatrix::<_, RowMajor>::from_dense_data((2, 2), [1, 1, 0, 1]);
        let b = CompressedMatrix::<_, ColMajor>::from_dense_data((2, 2), [1, 0, 2, 1]);
        assert_eq!(a.mul_expr(&b), CompressedMatrix::from_dense_data((2, 2), [3, 1, 2, 1]));
    }

    #[test]
    fn display() {
        let a = CompressedMatrix::<i32, RowMajor>::id(2);
        let s = a.to_string();
        assert!(s.contains('1'));
        assert!(s.contains('0'));
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serialize() {
        let a = CompressedMatrix::<_, RowMajor>::from_dense_data((3, 4), (0..12).map(|x| x % 5));
        let ser = serde_json::to_string(&a).unwrap();
        let des: CompressedMatrix<i32, RowMajor> = serde_json::from_str(&ser).unwrap();
        assert_eq!(a, des);
    }
}
