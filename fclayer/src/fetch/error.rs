//! Error types for the fetch pipeline.
//!
//! Every error names the region, layer and endpoint it came from so a
//! failing data source can be diagnosed from the status line alone.

use thiserror::Error;

use crate::source::SourceError;

/// A layer-level fetch failure.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The identifier query failed; the whole layer is unusable.
    #[error("Failed to fetch layer: region {region}, layer {layer}, endpoint {endpoint}: {source}")]
    Enumerate {
        region: String,
        layer: String,
        endpoint: String,
        source: SourceError,
    },

    /// One identifier range could not be retrieved.
    #[error(
        "Failed to fetch layer: region {region}, layer {layer}, ids {low}..={high}, endpoint {endpoint}: {source}"
    )]
    Batch {
        region: String,
        layer: String,
        endpoint: String,
        low: i64,
        high: i64,
        source: SourceError,
    },

    /// A fetch task panicked.
    #[error("Fetch task for region {region}, layer {layer} failed: {message}")]
    TaskFailed {
        region: String,
        layer: String,
        message: String,
    },
}

impl FetchError {
    pub fn region(&self) -> &str {
        match self {
            FetchError::Enumerate { region, .. }
            | FetchError::Batch { region, .. }
            | FetchError::TaskFailed { region, .. } => region,
        }
    }

    pub fn layer(&self) -> &str {
        match self {
            FetchError::Enumerate { layer, .. }
            | FetchError::Batch { layer, .. }
            | FetchError::TaskFailed { layer, .. } => layer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = FetchError::Batch {
            region: "MD".to_string(),
            layer: "0".to_string(),
            endpoint: "https://example.test/0/query".to_string(),
            low: 1,
            high: 1000,
            source: SourceError::Status {
                status: 500,
                url: "https://example.test/0/query?f=json".to_string(),
            },
        };
        let text = err.to_string();
        assert!(text.contains("region MD"));
        assert!(text.contains("layer 0"));
        assert!(text.contains("ids 1..=1000"));
        assert!(text.contains("https://example.test/0/query"));
        assert!(text.contains("HTTP 500"));
        assert_eq!(err.region(), "MD");
        assert_eq!(err.layer(), "0");
    }

    #[test]
    fn test_source_is_exposed() {
        use std::error::Error as _;
        let err = FetchError::Enumerate {
            region: "TX".to_string(),
            layer: "0".to_string(),
            endpoint: "e".to_string(),
            source: SourceError::Http("timeout".to_string()),
        };
        assert!(err.source().is_some());
    }
}
