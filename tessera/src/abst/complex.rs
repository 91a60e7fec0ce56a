use nalgebra::Complex;
use crate::Elem;

// Elements with separately accessible real and imaginary parts.

pub trait ComplexElem: Elem { 
    type Real;

    fn re(&self) -> Self::Real;
    fn im(&self) -> Self::Real;
    fn set_re(&mut self, value: Self::Real);
    fn set_im(&mut self, value: Self::Real);
}

impl<R> ComplexElem for Complex<R>
where R: Clone, Complex<R>: Elem {
    type Real = R;

    fn re(&self) -> R {
        self.re.clone()
    }

    fn im(&self) -> R {
        self.im.clone()
    }

    fn set_re(&mut self, value: R) {
        self.re = value
    }

    fn set_im(&mut self, value: R) {
        self.im = value
    }
}

#[cfg(test)]
mod tests { 
    use super::*;

    #[test]
    fn parts() { 
        let mut z = Complex::new(1.0, 2.0);
        assert_eq!(z.re(), 1.0);
        assert_eq!(z.im(), 2.0);

        z.set_re(3.0);
        z.set_im(-1.0);
        assert_eq!(z, Complex::new(3.0, -1.0));
    }
}
