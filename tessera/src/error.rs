use derive_more::Display;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum ErrorKind { 
    #[display("invalid access")]
    InvalidAccess,
    #[display("invalid assignment")]
    InvalidAssignment,
    #[display("invalid capacity")]
    InvalidCapacity,
    #[display("duplicate entry")]
    DuplicateEntry,
}

#[derive(Clone, Debug, Display, PartialEq, Eq)]
#[display("{kind}: {msg}")]
pub struct Error { 
    pub kind: ErrorKind,
    pub msg: String
}

impl Error { 
    pub fn new<S>(kind: ErrorKind, msg: S) -> Self
    where S: Into<String> { 
        Self { kind, msg: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind { 
        self.kind
    }

    // every kind is raised on a bad argument and leaves the target untouched.
    pub fn is_invalid_argument(&self) -> bool { 
        use ErrorKind::*;
        matches!(self.kind, InvalidAccess | InvalidAssignment | InvalidCapacity | DuplicateEntry)
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[macro_export]
macro_rules! err {
    ($kind:ident, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        let e = $crate::Error::new($crate::ErrorKind::$kind, msg);
        Err(e)
    }}
}

#[cfg(test)]
mod tests { 
    use super::*;

    fn fail(i: usize) -> Result<()> { 
        err!(InvalidAccess, "cannot write to ({i}, {i})")
    }

    #[test]
    fn err_macro() { 
        let e = fail(2).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidAccess);
        assert!(e.is_invalid_argument());
        assert_eq!(e.to_string(), "invalid access: cannot write to (2, 2)");
    }
}
