//! Outcome of the most recent feed attempt.

/// Result of the previous feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// No feed has been performed yet.
    None,
    /// Successful feed; amount in milligrams.
    Success(i32),
    /// Feed aborted due to noise on the sensors; number of
    /// consecutively failed attempts.
    SensorRetry(u16),
}

/// Report for the result of the previous feed, overwritten on each
/// attempt or completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedReport {
    pub outcome: FeedOutcome,
    /// Controller time of the attempt (ms since construction).
    pub at_ms: u64,
}

impl Default for FeedReport {
    fn default() -> Self {
        Self {
            outcome: FeedOutcome::None,
            at_ms: 0,
        }
    }
}
