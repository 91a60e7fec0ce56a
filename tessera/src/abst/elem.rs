use std::fmt::Debug;
use std::ops::{Add, Sub, Mul, AddAssign, SubAssign, MulAssign, DivAssign};
use num_traits::{Zero, One};

pub trait ElemBase: 
    Clone + 
    PartialEq + 
    Send + 
    Sync + 
    Debug + 
    'static
{}

impl<T> ElemBase for T where T: 
    Clone + 
    PartialEq + 
    Send + 
    Sync + 
    Debug + 
    'static
{}

// Scalars that can be stored in a matrix. 
// `zero()` is the structural zero, `one()` the identity.

pub trait Elem: 
    ElemBase + 
    Zero + 
    One + 
    Add<Output = Self> + 
    Sub<Output = Self> + 
    Mul<Output = Self> + 
    AddAssign + 
    SubAssign + 
    MulAssign + 
    DivAssign
{
    fn is_default(&self) -> bool { 
        self.is_zero()
    }
}

impl<T> Elem for T where T: 
    ElemBase + 
    Zero + 
    One + 
    Add<Output = Self> + 
    Sub<Output = Self> + 
    Mul<Output = Self> + 
    AddAssign + 
    SubAssign + 
    MulAssign + 
    DivAssign
{}

#[cfg(test)]
mod tests { 
    use super::*;

    fn assert_elem<T: Elem>() {}

    #[test]
    fn primitives() { 
        assert_elem::<i32>();
        assert_elem::<i64>();
        assert_elem::<f64>();
    }

    #[test]
    fn is_default() { 
        assert!(0.is_default());
        assert!(!1.is_default());
        assert!(0.0.is_default());
    }
}
