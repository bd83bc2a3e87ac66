//! Error types for Pact
//!
//! Two layers:
//! - [`BindingError`]: the low-level failure of binding call arguments to a
//!   declared [`Signature`](crate::Signature).
//! - [`Error`]: everything that can come back from a contracted call.
//!
//! Errors raised by contract stages and by implementations travel through the
//! dispatcher untouched. The one translation performed is from a raw
//! `BindingError` into [`Error::Binding`], which names the call target so a
//! caller can tell "you called this wrong" apart from "the operation failed".
//!
//! | Category | Variants |
//! |----------|----------|
//! | Call shape | `Binding`, `UnknownArgument`, `WrongMode` |
//! | Raised by stages/implementations | `Failed`, `Custom` |
//! | Registration | `InvalidSignature`, `StageMismatch`, `Duplicate` |
//! | Contract checks | `ContractNotFound`, `ContractSignature` |
//! | Lookup / config | `NotFound`, `Config` |

use thiserror::Error;

/// Result type alias for Pact operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to bind call arguments against a signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// More positional arguments than positional parameters and no `*args`
    #[error("takes {expected} positional arguments but {given} were given")]
    TooManyPositional {
        /// Number of positional parameters declared
        expected: usize,
        /// Number of positional arguments supplied
        given: usize,
    },

    /// Keyword that matches no parameter and no `**kwargs` to absorb it
    #[error("got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword {
        /// The offending keyword
        name: String,
    },

    /// Required parameter with neither a supplied value nor a default
    #[error("missing a required argument: '{name}'")]
    MissingArgument {
        /// The parameter name
        name: String,
    },

    /// Parameter supplied both positionally and by keyword
    #[error("multiple values for argument '{name}'")]
    MultipleValues {
        /// The parameter name
        name: String,
    },

    /// Positional-only parameter passed by keyword
    #[error("positional-only argument '{name}' passed as keyword")]
    PositionalOnlyAsKeyword {
        /// The parameter name
        name: String,
    },
}

/// Errors returned by contracted calls and by hub registration.
#[derive(Debug, Error)]
pub enum Error {
    /// Call arguments do not fit the target's declared signature
    #[error("invalid call to {target}: {source}")]
    Binding {
        /// Qualified name of the call target
        target: String,
        /// Underlying binder failure
        #[source]
        source: BindingError,
    },

    /// A stage asked for an argument the signature does not declare
    #[error("unknown argument: {name}")]
    UnknownArgument {
        /// The requested parameter name
        name: String,
    },

    /// A dispatcher was invoked through a surface its nature cannot serve
    #[error("{target} is a {nature} implementation and cannot be invoked as {requested}")]
    WrongMode {
        /// Qualified name of the call target
        target: String,
        /// The implementation's execution nature
        nature: &'static str,
        /// The surface that was used
        requested: &'static str,
    },

    /// Domain failure raised by a stage or an implementation
    #[error("{reason}")]
    Failed {
        /// Human-readable reason
        reason: String,
    },

    /// Arbitrary error raised by a stage or an implementation
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),

    /// A declared signature breaks parameter ordering rules
    #[error("invalid signature: {reason}")]
    InvalidSignature {
        /// What is wrong with it
        reason: String,
    },

    /// A stage hook's nature cannot be driven by the dispatcher's nature
    #[error("{stage} cannot run inside a {nature} call")]
    StageMismatch {
        /// Stage name, e.g. `pre_ping`
        stage: String,
        /// Dispatcher execution nature
        nature: &'static str,
    },

    /// A configured contract source does not exist
    #[error("contract not found: {name}")]
    ContractNotFound {
        /// Contract source name
        name: String,
    },

    /// An implementation does not conform to the signature a contract expects
    #[error("contract signature mismatch for {target}: {}", .violations.join("; "))]
    ContractSignature {
        /// Qualified name of the implementation
        target: String,
        /// Every violation found
        violations: Vec<String>,
    },

    /// Two implementations registered under the same path
    #[error("already registered: {path}")]
    Duplicate {
        /// The contested path
        path: String,
    },

    /// No implementation registered under a path
    #[error("not found: {path}")]
    NotFound {
        /// The requested path
        path: String,
    },

    /// Invalid configuration
    #[error("configuration error: {reason}")]
    Config {
        /// What is wrong with it
        reason: String,
    },
}

impl Error {
    /// Domain failure with a message.
    pub fn failed(reason: impl Into<String>) -> Self {
        Error::Failed {
            reason: reason.into(),
        }
    }

    /// Wrap any error raised by stage or implementation code.
    pub fn custom<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Custom(Box::new(err))
    }

    /// Attach a call target to a binder failure.
    pub fn binding(target: impl Into<String>, source: BindingError) -> Self {
        Error::Binding {
            target: target.into(),
            source,
        }
    }

    /// True when the caller supplied arguments that do not fit the signature.
    pub fn is_binding(&self) -> bool {
        matches!(self, Error::Binding { .. })
    }

    /// The underlying binder failure, if this is a binding error.
    pub fn binding_error(&self) -> Option<&BindingError> {
        match self {
            Error::Binding { source, .. } => Some(source),
            _ => None,
        }
    }
}
