//! Structural predicates evaluated on the actual entries of a matrix. 
//! 
//! Each is a single scan over the visited entries. Explicitly stored zeros 
//! are treated as zero.

use num_traits::{Zero, One};
use crate::{MatExpr, MatTrait};

pub fn is_square<E>(e: &E) -> bool
where E: MatTrait { 
    e.is_square()
}

pub fn is_lower<E>(e: &E) -> bool
where E: MatExpr { 
    e.is_square() && all_entries(e, |i, j, a| i >= j || a.is_zero())
}

pub fn is_upper<E>(e: &E) -> bool
where E: MatExpr { 
    e.is_square() && all_entries(e, |i, j, a| i <= j || a.is_zero())
}

pub fn is_strictly_lower<E>(e: &E) -> bool
where E: MatExpr { 
    e.is_square() && all_entries(e, |i, j, a| i > j || a.is_zero())
}

pub fn is_strictly_upper<E>(e: &E) -> bool
where E: MatExpr { 
    e.is_square() && all_entries(e, |i, j, a| i < j || a.is_zero())
}

pub fn is_uni_lower<E>(e: &E) -> bool
where E: MatExpr { 
    is_unit_with(e, |i, j| i < j)
}

pub fn is_uni_upper<E>(e: &E) -> bool
where E: MatExpr { 
    is_unit_with(e, |i, j| i > j)
}

pub fn is_identity<E>(e: &E) -> bool
where E: MatExpr { 
    is_unit_with(e, |i, j| i != j)
}

fn all_entries<E, F>(e: &E, f: F) -> bool
where E: MatExpr, F: Fn(usize, usize, &E::Elem) -> bool { 
    let mut res = true;
    e.visit(|i, j, a| { 
        if res && !f(i, j, a) { 
            res = false
        }
    });
    res
}

// every diagonal entry is present and one, every `fixed` entry is zero.
fn is_unit_with<E, F>(e: &E, fixed: F) -> bool
where E: MatExpr, F: Fn(usize, usize) -> bool { 
    if !e.is_square() { 
        return false
    }

    let n = e.nrows();
    let mut diag = vec![false; n];
    let mut res = true;

    e.visit(|i, j, a| { 
        if !res { 
            return
        }
        if i == j { 
            if a.is_one() { 
                diag[i] = true
            } else { 
                res = false
            }
        } else if fixed(i, j) && !a.is_zero() { 
            res = false
        }
    });

    res && diag.into_iter().all(|d| d)
}

#[cfg(test)]
mod tests { 
    use super::*;
    use crate::storage::{CompressedMatrix, SparseStorage, Storage};

    #[test]
    fn uni_lower() { 
        let a = CompressedMatrix::<i32>::from_dense_data((3, 3), [
            1, 0, 0,
            2, 1, 0,
            3, 4, 1
        ]);
        assert!(is_uni_lower(&a));
        assert!(is_lower(&a));
        assert!(!is_uni_upper(&a));
        assert!(!is_strictly_lower(&a));
    }

    #[test]
    fn uni_lower_missing_diag() { 
        let a = CompressedMatrix::<i32>::from_dense_data((3, 3), [
            1, 0, 0,
            2, 0, 0,
            3, 4, 1
        ]);
        assert!(!is_uni_lower(&a));
        assert!(is_lower(&a));
    }

    #[test]
    fn uni_lower_wrong_diag() { 
        let a = CompressedMatrix::<i32>::from_dense_data((2, 2), [
            1, 0,
            2, 5
        ]);
        assert!(!is_uni_lower(&a));
    }

    #[test]
    fn uni_lower_explicit_zero() { 
        let mut a = CompressedMatrix::<i32>::from_dense_data((2, 2), [
            1, 0,
            2, 1
        ]);
        a.set(0, 1, 0);
        assert_eq!(a.non_zeros(), 4);
        assert!(is_uni_lower(&a));
    }

    #[test]
    fn strictly() { 
        let a = CompressedMatrix::<i32>::from_dense_data((3, 3), [
            0, 5, 7,
            0, 0, 2,
            0, 0, 0
        ]);
        assert!(is_strictly_upper(&a));
        assert!(is_upper(&a));
        assert!(!is_strictly_lower(&a));
        assert!(!is_uni_upper(&a));
    }

    #[test]
    fn upper() {
        let a = CompressedMatrix::<i32>::from_dense_data((3, 3), [
            2, 5, 7,
            0, 0, 2,
            0, 0, 3
        ]);
        assert!(is_upper(&a));
        assert!(!is_lower(&a));
        assert!(!is_uni_upper(&a));

        let b = CompressedMatrix::<i32>::from_dense_data((3, 3), [
            2, 5, 7,
            0, 0, 2,
            0, 1, 3
        ]);
        assert!(!is_upper(&b));
    }

    #[test]
    fn non_square() {
        let a = CompressedMatrix::<i32>::zero((2, 3));
        assert!(!is_square(&a));
        assert!(!is_lower(&a));
        assert!(!is_strictly_lower(&a));
        assert!(!is_uni_lower(&a));
    }

    #[test]
    fn identity() { 
        let a = CompressedMatrix::<i32>::id(4);
        assert!(is_identity(&a));
        assert!(is_uni_lower(&a));
        assert!(is_uni_upper(&a));
    }
}
