//! Error types for ProbRank

/// Result type alias using ProbRank's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to callers that submit an empty or absent batch
pub const NO_INPUT_MESSAGE: &str = "No input data provided";

/// Core error type for ProbRank operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request carried no usable input
    #[error("{0}")]
    InvalidRequest(String),

    /// Classifier output cardinality disagrees with the label table
    #[error(
        "schema mismatch: classifier returned {actual} probabilities but the label table has {expected} labels"
    )]
    SchemaMismatch { expected: usize, actual: usize },

    /// Failure while processing an instance of a batch
    #[error("{0}")]
    Processing(String),

    /// Classifier execution errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Caller-facing classification of a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Client error: nothing to predict
    InvalidRequest,
    /// Internal fault: label table and classifier disagree
    SchemaMismatch,
    /// Any other failure during prediction
    Processing,
}

impl ErrorKind {
    /// Stable lowercase name, used as a metrics label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::SchemaMismatch => "schema_mismatch",
            Self::Processing => "processing",
        }
    }
}

impl Error {
    /// Create the error returned for an empty or absent batch
    pub fn no_input() -> Self {
        Self::InvalidRequest(NO_INPUT_MESSAGE.to_string())
    }

    /// Create a new processing error
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Caller-facing kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            _ => ErrorKind::Processing,
        }
    }

    /// Promote an instance-level failure to a batch-level one.
    ///
    /// `InvalidRequest` and `SchemaMismatch` keep their identity; everything
    /// else becomes `Processing` carrying the underlying message.
    pub fn into_batch_failure(self) -> Self {
        match self {
            Self::InvalidRequest(_) | Self::SchemaMismatch { .. } | Self::Processing(_) => self,
            Self::Classifier(msg) => Self::Processing(msg),
            Self::Config(_) | Self::Internal(_) => Self::Processing(self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_message_is_verbatim() {
        assert_eq!(Error::no_input().to_string(), "No input data provided");
        assert_eq!(Error::no_input().kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_schema_mismatch_message() {
        let err = Error::SchemaMismatch { expected: 2, actual: 3 };
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
        assert!(err.to_string().contains("returned 3 probabilities"));
        assert!(err.to_string().contains("has 2 labels"));
    }

    #[test]
    fn test_classifier_error_promotes_with_bare_message() {
        let err = Error::classifier("could not convert string to float: 'abc'").into_batch_failure();
        assert_eq!(err.kind(), ErrorKind::Processing);
        assert_eq!(err.to_string(), "could not convert string to float: 'abc'");
    }

    #[test]
    fn test_schema_mismatch_survives_promotion() {
        let err = Error::SchemaMismatch { expected: 6, actual: 5 }.into_batch_failure();
        assert!(matches!(err, Error::SchemaMismatch { expected: 6, actual: 5 }));
    }

    #[test]
    fn test_other_errors_promote_to_processing() {
        let err = Error::internal("boom").into_batch_failure();
        assert!(matches!(err, Error::Processing(ref msg) if msg == "internal error: boom"));
    }

    #[test]
    fn test_config_error_promotes_with_prefix() {
        let err = Error::config("bad label").into_batch_failure();
        assert_eq!(err.kind(), ErrorKind::Processing);
        assert!(matches!(err, Error::Processing(ref msg) if msg == "configuration error: bad label"));
    }
}
