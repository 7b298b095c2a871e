use std::borrow::Cow;

use thiserror::Error;

use crate::key::TypeKey;
use crate::value::{Number, ValueKind};

// -----------------------------------------------------------------------------
// ResolveError

/// Failures raised while resolving a handler.
///
/// Panics inside factories are not converted, they unwind through the
/// registry unchanged.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No factory in the chain produced a handler.
    ///
    /// Only raised by the `force_*` entry points, the `try_*` entry points
    /// return `Ok(None)` instead.
    #[error("no {category} available for `{key}`")]
    Unsatisfiable { category: &'static str, key: TypeKey },
    /// A factory recognized the key but its configuration cannot work.
    #[error("cannot build a handler for `{key}`: {message}")]
    Broken {
        key: TypeKey,
        message: Cow<'static, str>,
    },
    /// A failure escaped from a factory.
    #[error("`{factory}` failed to build a {category} for `{key}`")]
    Factory {
        category: &'static str,
        key: TypeKey,
        factory: Cow<'static, str>,
        #[source]
        source: Box<ResolveError>,
    },
}

impl ResolveError {
    /// Creates a [`ResolveError::Broken`].
    #[inline]
    pub fn broken(key: &TypeKey, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Broken {
            key: key.clone(),
            message: message.into(),
        }
    }

    /// Returns the innermost error of a [`ResolveError::Factory`] chain.
    pub fn root_cause(&self) -> &ResolveError {
        let mut current = self;
        while let Self::Factory { source, .. } = current {
            current = &**source;
        }
        current
    }

    /// Returns `true` if the root cause is [`ResolveError::Unsatisfiable`].
    #[inline]
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self.root_cause(), Self::Unsatisfiable { .. })
    }
}

// -----------------------------------------------------------------------------
// CodecError

/// Failures raised while invoking a handler.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The wire value has the wrong kind.
    #[error("expected {expected}, found {found}")]
    UnexpectedKind {
        expected: ValueKind,
        found: ValueKind,
    },
    /// The application value is not of the handler's type.
    #[error("value is not a `{expected}`")]
    TypeMismatch { expected: Cow<'static, str> },
    /// The wire number does not fit in the target type.
    #[error("number {value} does not fit in `{target}`")]
    OutOfRange {
        value: Number,
        target: &'static str,
    },
    #[error("missing field `{field}`")]
    MissingField { field: Cow<'static, str> },
    #[error("unknown variant `{variant}`, expected one of {expected:?}")]
    UnknownVariant {
        variant: String,
        expected: Vec<&'static str>,
    },
    /// A validator rejected the value.
    #[error("invalid value: {message}")]
    Invalid { message: Cow<'static, str> },
    /// A forwarding handle was invoked, but the resolution it stood in for failed.
    #[error("handler for `{key}` was never resolved")]
    Unresolved { key: TypeKey },
    #[error("in field `{field}`: {source}")]
    Field {
        field: Cow<'static, str>,
        #[source]
        source: Box<CodecError>,
    },
    #[error("at index {index}: {source}")]
    Index {
        index: usize,
        #[source]
        source: Box<CodecError>,
    },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("{0}")]
    Custom(Cow<'static, str>),
}

impl CodecError {
    #[inline]
    pub fn custom(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(message.into())
    }

    #[inline]
    pub fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Creates a [`CodecError::TypeMismatch`] naming `T`.
    #[inline]
    pub fn mismatch<T: ?Sized + 'static>() -> Self {
        Self::TypeMismatch {
            expected: Cow::Borrowed(core::any::type_name::<T>()),
        }
    }

    /// Wraps the error with the name of the record field it occurred in.
    #[inline]
    pub fn in_field(self, field: impl Into<Cow<'static, str>>) -> Self {
        Self::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Wraps the error with the sequence index it occurred at.
    #[inline]
    pub fn at_index(self, index: usize) -> Self {
        Self::Index {
            index,
            source: Box::new(self),
        }
    }

    /// Returns the error with all field and index context removed.
    pub fn innermost(&self) -> &CodecError {
        let mut current = self;
        while let Self::Field { source, .. } | Self::Index { source, .. } = current {
            current = &**source;
        }
        current
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{CodecError, ResolveError};
    use crate::key::TypeKey;
    use crate::value::ValueKind;

    #[test]
    fn nested_context_message() {
        let error = CodecError::UnexpectedKind {
            expected: ValueKind::Number,
            found: ValueKind::String,
        }
        .at_index(2)
        .in_field("points");

        assert_eq!(
            error.to_string(),
            "in field `points`: at index 2: expected number, found string"
        );
        assert!(matches!(
            error.innermost(),
            CodecError::UnexpectedKind { .. }
        ));
    }

    #[test]
    fn root_cause_walks_factory_chain() {
        let inner = ResolveError::Unsatisfiable {
            category: "decoder",
            key: TypeKey::of::<u8>(),
        };
        let outer = ResolveError::Factory {
            category: "decoder",
            key: TypeKey::of::<Vec<u8>>(),
            factory: "SequenceFactory".into(),
            source: Box::new(inner),
        };

        assert!(outer.is_unsatisfiable());
        assert_eq!(outer.root_cause().to_string(), "no decoder available for `u8`");
        assert_eq!(
            outer.to_string(),
            "`SequenceFactory` failed to build a decoder for `Vec<u8>`"
        );
    }
}
