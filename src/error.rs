use std::fmt;

/// Failure of a whole ingestion cycle. The previously published snapshot is
/// left in place whenever one of these is returned.
#[derive(Debug)]
pub enum IngestError {
    /// The search capability errored while collecting candidates.
    SourceUnavailable(anyhow::Error),
    /// Upstream data could not be turned into a cached record.
    Transform { full_name: String, reason: String },
}

impl IngestError {
    pub fn transform(full_name: &str, reason: impl Into<String>) -> Self {
        Self::Transform {
            full_name: full_name.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnavailable(e) => write!(f, "repository source unavailable: {e:#}"),
            Self::Transform { full_name, reason } => {
                write!(f, "failed to transform {full_name}: {reason}")
            }
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SourceUnavailable(e) => Some(&**e),
            Self::Transform { .. } => None,
        }
    }
}
