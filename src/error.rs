use thiserror::Error;

/// Failure of a single external assessor call.
///
/// Kept separate from [`CredenceError`] because the controller recovers
/// these locally (neutral defaults, degraded record) instead of failing the
/// run. Transience decides whether a retry is worthwhile.
#[derive(Debug, Clone, Error)]
pub enum AssessorError {
    #[error("assessor call timed out after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    #[error("assessor unavailable: {0}")]
    Unavailable(String),

    #[error("malformed assessor output: {0}")]
    Malformed(String),
}

impl AssessorError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable(_))
    }

    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

#[derive(Debug, Error)]
pub enum CredenceError {
    /// Mathematically invalid input: prior outside the open interval (0, 1)
    /// or NaN/Inf anywhere in an update. Never recovered, never clamped.
    #[error("domain error: {0}")]
    Domain(String),

    /// Invalid constraints or controller configuration. Raised at run
    /// start, before any evidence is processed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed evidence item (missing content, non-finite reliability).
    #[error("data error: {0}")]
    Data(String),

    #[error("assessor error: {0}")]
    Assessor(#[from] AssessorError),

    #[error("aggregation cancelled after {completed} items")]
    Cancelled { completed: usize },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CredenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assessor_transience() {
        assert!(AssessorError::Timeout { duration_secs: 30 }.is_transient());
        assert!(AssessorError::Unavailable("503".into()).is_transient());
        assert!(AssessorError::Malformed("score out of range".into()).is_permanent());
    }
}
