use thiserror::Error;

/// Errors returned by clustering algorithms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    #[error("cluster: invalid input: {0}")]
    InvalidInput(String),

    #[error("cluster: invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Singular, non positive definite or non-convergent matrix.
    #[error("cluster: linear algebra failure: {0}")]
    LinAlg(String),

    /// An internal consistency check failed for this particular draw.
    #[error("cluster: assertion failed: {0}")]
    Assertion(String),
}

impl ClusterError {
    /// Reports whether the failure depends on the random draw and a fresh
    /// attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClusterError::LinAlg(_) | ClusterError::Assertion(_))
    }

    pub(crate) fn param(name: &'static str, reason: impl Into<String>) -> Self {
        ClusterError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classes() {
        assert!(ClusterError::LinAlg("x".into()).is_transient());
        assert!(ClusterError::Assertion("x".into()).is_transient());
        assert!(!ClusterError::InvalidInput("x".into()).is_transient());
        assert!(!ClusterError::param("damping", "out of range").is_transient());
    }

    #[test]
    fn display_is_prefixed() {
        let err = ClusterError::param("eps", "must be positive");
        assert_eq!(err.to_string(), "cluster: invalid parameter eps: must be positive");
    }
}
