//! Errors raised while reading declarations.
//!
//! Every variant is recoverable: the resolver drops the failing declaration,
//! records a warning and carries on with the remaining ones.

use thiserror::Error;

/// A declaration that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// The property name is not one this engine knows.
    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    /// The value does not match the property grammar.
    #[error("invalid value '{value}' for '{property}'")]
    InvalidValue {
        /// Property name.
        property: String,
        /// Offending value text.
        value: String,
    },

    /// A `var()` reference has no value and no fallback, or sits on a
    /// dependency cycle.
    #[error("'{property}' is invalid at computed-value time: {reason}")]
    InvalidAtComputedValueTime {
        /// Property name.
        property: String,
        /// What went wrong during substitution.
        reason: String,
    },

    /// A rule or at-rule that could not be read.
    #[error("malformed rule near '{0}'")]
    MalformedRule(String),
}

impl StyleError {
    /// Shorthand for [`StyleError::InvalidValue`].
    #[must_use]
    pub fn invalid(property: &str, value: &str) -> Self {
        Self::InvalidValue {
            property: property.to_string(),
            value: value.to_string(),
        }
    }
}
