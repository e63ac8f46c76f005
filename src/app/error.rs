use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThicketError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Item not found: {0}")]
    NotFound(i64),

    #[error("Item {0} is deleted or dead")]
    Removed(i64),

    #[error("Requested item {requested} but the body is item {received}")]
    IdMismatch { requested: i64, received: i64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl ThicketError {
    /// Errors that only affect a single item and are dropped by the engine
    /// rather than surfaced to the user.
    pub fn is_item_local(&self) -> bool {
        matches!(
            self,
            ThicketError::Network(_)
                | ThicketError::Parse(_)
                | ThicketError::NotFound(_)
                | ThicketError::Removed(_)
                | ThicketError::IdMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ThicketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_local_errors() {
        assert!(ThicketError::NotFound(1).is_item_local());
        assert!(ThicketError::Removed(1).is_item_local());
        assert!(ThicketError::IdMismatch {
            requested: 2,
            received: 1
        }
        .is_item_local());
        assert!(!ThicketError::Other("bad".into()).is_item_local());
    }

    #[test]
    fn test_io_error_is_not_item_local() {
        let err: ThicketError = std::io::Error::other("tty gone").into();
        assert!(matches!(err, ThicketError::Io(_)));
        assert!(!err.is_item_local());
    }

    #[test]
    fn test_parse_error_converts() {
        let err: ThicketError = serde_json::from_str::<i64>("{").unwrap_err().into();
        assert!(matches!(err, ThicketError::Parse(_)));
        assert!(err.to_string().starts_with("Malformed JSON"));
    }
}
