use thiserror::Error;

/// Rejected included-ranges configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IncludedRangesError {
    #[error("included range {index} ends before it starts")]
    Inverted { index: usize },
    #[error("included range {index} starts before the previous range ends")]
    Unordered { index: usize },
}
