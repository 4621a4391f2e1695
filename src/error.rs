use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{context}: {message}")]
    Runtime {
        context: &'static str,
        message: String,
    },
    #[error(
        "emission probability out of range at batch {batch}, position {position}: {value} (expected 0 <= p <= 1)"
    )]
    InvalidProbability {
        batch: usize,
        position: usize,
        value: f64,
    },
    #[error("shape mismatch: {message}")]
    ShapeMismatch { message: String },
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

impl AlignmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn runtime(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Runtime {
            context,
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_probability(batch: usize, position: usize, value: f64) -> Self {
        Self::InvalidProbability {
            batch,
            position,
            value,
        }
    }

    pub(crate) fn shape_mismatch(message: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
