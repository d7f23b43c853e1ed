use std::fmt;

use serde::{de, ser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedKey,
    MalformedValue,
    UnsupportedRootShape,
    UnsupportedNesting,
    DuplicateKey,
    KeyNotFound,
    TypeMismatch,
    EndOfSequence,
    Message,
    Io,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("malformed key `{key}`: {reason}")]
    MalformedKey { key: String, reason: &'static str },

    #[error("malformed value: {0}")]
    MalformedValue(String),

    #[error("unsupported root shape: expected a keyed value, found {found}")]
    UnsupportedRootShape { found: String },

    #[error("unsupported nesting at `{path}`: {reason}")]
    UnsupportedNesting { path: String, reason: &'static str },

    #[error("duplicate key `{path}`")]
    DuplicateKey { path: String },

    #[error("key not found: `{key}`")]
    KeyNotFound { key: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("end of sequence: no element at index {index}")]
    EndOfSequence { index: usize },

    #[error("{0}")]
    Message(String),

    #[error("io error: {0}")]
    Io(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedKey { .. } => ErrorKind::MalformedKey,
            Error::MalformedValue(_) => ErrorKind::MalformedValue,
            Error::UnsupportedRootShape { .. } => ErrorKind::UnsupportedRootShape,
            Error::UnsupportedNesting { .. } => ErrorKind::UnsupportedNesting,
            Error::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Error::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::EndOfSequence { .. } => ErrorKind::EndOfSequence,
            Error::Message(_) => ErrorKind::Message,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn malformed_key(key: impl Into<String>, reason: &'static str) -> Self {
        Error::MalformedKey {
            key: key.into(),
            reason,
        }
    }

    pub(crate) fn unsupported_root(found: impl Into<String>) -> Self {
        Error::UnsupportedRootShape {
            found: found.into(),
        }
    }

    pub(crate) fn unsupported_nesting(path: impl Into<String>) -> Self {
        Error::UnsupportedNesting {
            path: path.into(),
            reason: "arrays cannot directly contain arrays",
        }
    }

    /// An array element whose pairs would read back as part of the element
    /// before it.
    pub(crate) fn ambiguous_element(path: impl Into<String>) -> Self {
        Error::UnsupportedNesting {
            path: path.into(),
            reason: "element would merge into the previous one",
        }
    }

    pub(crate) fn duplicate_key(path: impl Into<String>) -> Self {
        Error::DuplicateKey { path: path.into() }
    }

    pub(crate) fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// True for failures caused by the shape or content of the input, as
    /// opposed to I/O on the surrounding reader or writer.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Error::Io(_))
    }
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }

    fn invalid_type(unexp: de::Unexpected<'_>, exp: &dyn de::Expected) -> Self {
        Error::type_mismatch(exp.to_string(), unexp.to_string())
    }

    fn invalid_value(unexp: de::Unexpected<'_>, exp: &dyn de::Expected) -> Self {
        Error::type_mismatch(exp.to_string(), unexp.to_string())
    }

    fn invalid_length(len: usize, _exp: &dyn de::Expected) -> Self {
        Error::EndOfSequence { index: len }
    }

    fn missing_field(field: &'static str) -> Self {
        Error::KeyNotFound {
            key: field.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
