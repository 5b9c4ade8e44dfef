#![forbid(unsafe_code)]

//! Error types for lightbox construction and configuration.
//!
//! The widget is best-effort: nothing here is recoverable in the sense of a
//! retry. Errors exist so that one viewer failing to mount does not take the
//! rest of the page down with it.

use std::fmt;

/// The host document refused an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomError {
    op: &'static str,
    message: String,
}

impl DomError {
    /// Create an error for the named host operation.
    pub fn new(op: &'static str, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }

    /// The host operation that failed (e.g. `"create_element"`).
    #[must_use]
    pub fn op(&self) -> &'static str {
        self.op
    }

    /// Host-provided detail.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.op, self.message)
    }
}

impl std::error::Error for DomError {}

/// Errors from mounting a lightbox or building one of its viewers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightboxError {
    /// A viewer was requested for zero images.
    EmptyGroup,
    /// The document already has a mounted lightbox.
    AlreadyMounted,
    /// The configuration was rejected before anything was built.
    Config(ConfigError),
    /// The overlay structure could not be built.
    Dom(DomError),
}

impl fmt::Display for LightboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGroup => write!(f, "a viewer needs at least one image"),
            Self::AlreadyMounted => write!(f, "a lightbox is already mounted on this document"),
            Self::Config(err) => write!(f, "configuration: {err}"),
            Self::Dom(err) => write!(f, "overlay construction: {err}"),
        }
    }
}

impl std::error::Error for LightboxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EmptyGroup | Self::AlreadyMounted => None,
            Self::Dom(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<DomError> for LightboxError {
    fn from(err: DomError) -> Self {
        Self::Dom(err)
    }
}

impl From<ConfigError> for LightboxError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Errors from loading a [`LightboxConfig`](crate::LightboxConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration text was not valid.
    Parse(String),
    /// A field held a value the widget cannot work with.
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Invalid { field, reason } => write!(f, "invalid `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn dom_error_display_names_operation() {
        let err = DomError::new("create_element", "document is gone");
        assert_eq!(err.to_string(), "create_element failed: document is gone");
        assert_eq!(err.op(), "create_element");
    }

    #[test]
    fn lightbox_error_wraps_dom_error_as_source() {
        let err = LightboxError::from(DomError::new("append_child", "detached"));
        assert!(err.source().is_some());
        assert!(LightboxError::EmptyGroup.source().is_none());
        assert!(LightboxError::AlreadyMounted.source().is_none());
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Invalid {
            field: "transition_ms",
            reason: "must be positive".into(),
        };
        assert_eq!(err.to_string(), "invalid `transition_ms`: must be positive");
    }
}
