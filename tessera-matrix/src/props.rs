/// Structural facts known from a matrix *type*, without looking at its entries.
/// 
/// These are the type-level counterparts of the predicates in [`crate::pred`]. 
/// A `true` field is a guarantee; a `false` field only means "not known".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MatProps { 
    pub square: bool,
    pub lower: bool,
    pub upper: bool,
    pub strictly_lower: bool,
    pub strictly_upper: bool,
    pub uni_lower: bool,
    pub uni_upper: bool,
}

impl MatProps { 
    pub const NONE: Self = Self { 
        square: false,
        lower: false,
        upper: false,
        strictly_lower: false,
        strictly_upper: false,
        uni_lower: false,
        uni_upper: false,
    };

    pub const SQUARE: Self = Self { 
        square: true,
        ..Self::NONE
    };

    pub const UNI_LOWER: Self = Self { 
        square: true,
        lower: true,
        uni_lower: true,
        ..Self::NONE
    };

    pub const UNI_UPPER: Self = Self::UNI_LOWER.trans();

    pub const STRICTLY_LOWER: Self = Self { 
        square: true,
        lower: true,
        strictly_lower: true,
        ..Self::NONE
    };

    pub const STRICTLY_UPPER: Self = Self::STRICTLY_LOWER.trans();

    pub const fn trans(self) -> Self { 
        Self { 
            square: self.square,
            lower: self.upper,
            upper: self.lower,
            strictly_lower: self.strictly_upper,
            strictly_upper: self.strictly_lower,
            uni_lower: self.uni_upper,
            uni_upper: self.uni_lower,
        }
    }

    // a + b, shapes already agree.
    pub const fn add(a: Self, b: Self) -> Self { 
        Self { 
            square: a.square || b.square,
            lower: a.lower && b.lower,
            upper: a.upper && b.upper,
            strictly_lower: a.strictly_lower && b.strictly_lower,
            strictly_upper: a.strictly_upper && b.strictly_upper,
            uni_lower: (a.uni_lower && b.strictly_lower) || (a.strictly_lower && b.uni_lower),
            uni_upper: (a.uni_upper && b.strictly_upper) || (a.strictly_upper && b.uni_upper),
        }
    }

    // a - b, shapes already agree.
    pub const fn sub(a: Self, b: Self) -> Self { 
        Self { 
            uni_lower: a.uni_lower && b.strictly_lower,
            uni_upper: a.uni_upper && b.strictly_upper,
            ..Self::add(a, b)
        }
    }

    pub const fn mul(a: Self, b: Self) -> Self { 
        Self { 
            square: a.square && b.square,
            lower: a.lower && b.lower,
            upper: a.upper && b.upper,
            strictly_lower: (a.strictly_lower && b.lower) || (a.lower && b.strictly_lower),
            strictly_upper: (a.strictly_upper && b.upper) || (a.upper && b.strictly_upper),
            uni_lower: a.uni_lower && b.uni_lower,
            uni_upper: a.uni_upper && b.uni_upper,
        }
    }
}

#[cfg(test)]
mod tests { 
    use super::*;

    #[test]
    fn trans() { 
        assert_eq!(MatProps::UNI_LOWER.trans(), MatProps::UNI_UPPER);
        assert_eq!(MatProps::STRICTLY_UPPER.trans(), MatProps::STRICTLY_LOWER);
        assert!(MatProps::UNI_UPPER.upper);
    }

    #[test]
    fn add() { 
        let p = MatProps::add(MatProps::UNI_LOWER, MatProps::STRICTLY_LOWER);
        assert!(p.uni_lower);
        assert!(p.lower);
        assert!(!p.strictly_lower);

        let p = MatProps::add(MatProps::UNI_LOWER, MatProps::UNI_LOWER);
        assert!(!p.uni_lower);
        assert!(p.lower);
    }

    #[test]
    fn sub() { 
        let p = MatProps::sub(MatProps::STRICTLY_LOWER, MatProps::UNI_LOWER);
        assert!(!p.uni_lower);
        let p = MatProps::sub(MatProps::UNI_LOWER, MatProps::STRICTLY_LOWER);
        assert!(p.uni_lower);
    }

    #[test]
    fn mul() { 
        let p = MatProps::mul(MatProps::UNI_LOWER, MatProps::UNI_LOWER);
        assert!(p.uni_lower);
        assert!(p.square);

        let p = MatProps::mul(MatProps::UNI_LOWER, MatProps::STRICTLY_LOWER);
        assert!(p.strictly_lower);
        assert!(!p.uni_lower);

        let p = MatProps::mul(MatProps::UNI_LOWER, MatProps::UNI_UPPER);
        assert_eq!(p, MatProps::SQUARE);
    }
}
