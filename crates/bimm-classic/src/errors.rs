//! # Construction Errors
//!
//! [`NetworkError`] is raised while validating or initializing a network config;
//! before any tensor is allocated.

use thiserror::Error;

/// Construction-time network error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// A stage received an input whose dimensions disagree with its declaration.
    #[error("shape mismatch at `{stage}`: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Dotted path of the offending stage.
        stage: String,
        /// The expected dimension(s).
        expected: String,
        /// The actual dimension(s).
        actual: String,
    },

    /// A stage carries parameters which can never be valid.
    #[error("invalid configuration at `{stage}`: {message}")]
    Configuration {
        /// Dotted path of the offending stage.
        stage: String,
        /// What is wrong.
        message: String,
    },
}

/// Result alias for network construction.
pub type NetworkResult<T> = Result<T, NetworkError>;

impl NetworkError {
    /// Build a [`NetworkError::ShapeMismatch`].
    pub fn shape_mismatch<S, E, A>(
        stage: S,
        expected: E,
        actual: A,
    ) -> Self
    where
        S: Into<String>,
        E: ToString,
        A: ToString,
    {
        Self::ShapeMismatch {
            stage: stage.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Build a [`NetworkError::Configuration`].
    pub fn configuration<S, M>(
        stage: S,
        message: M,
    ) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::Configuration {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// The dotted path of the offending stage.
    pub fn stage(&self) -> &str {
        match self {
            Self::ShapeMismatch { stage, .. } => stage,
            Self::Configuration { stage, .. } => stage,
        }
    }

    /// Prefix the stage path with an enclosing stage name.
    ///
    /// Errors are raised by the innermost config, and re-scoped
    /// by each enclosing config as they propagate outward.
    pub fn within(
        self,
        prefix: &str,
    ) -> Self {
        let join = |stage: String| {
            if stage.is_empty() {
                prefix.to_string()
            } else {
                format!("{prefix}.{stage}")
            }
        };
        match self {
            Self::ShapeMismatch {
                stage,
                expected,
                actual,
            } => Self::ShapeMismatch {
                stage: join(stage),
                expected,
                actual,
            },
            Self::Configuration { stage, message } => Self::Configuration {
                stage: join(stage),
                message,
            },
        }
    }
}
