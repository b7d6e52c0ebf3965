//! Offset-based pagination over a [`FeatureSource`].
//!
//! A pass walks the remote result window in fixed-size batches, continuing
//! while the service signals more records (or returns an exactly full
//! batch), waiting briefly between batches, and stopping unconditionally
//! at a hard offset ceiling. Batch errors end the pass but keep whatever
//! was accumulated: partial results are preferred over none, and failure
//! is reported through the `truncated` flag rather than an error.

use std::time::Duration;

use locus_core::events::{EventSink, PassKind, ResolverEvent};

use crate::service::{FeaturePage, FeatureSource, PageQuery, RawFeature, SourceError};

/// Batch size requested per page.
pub const PAGE_SIZE: usize = 2000;

/// Hard safety ceiling on the cumulative offset.
///
/// Bounds worst-case remote misbehaviour (a service that always signals
/// "more records").
pub const OFFSET_CEILING: usize = 100_000;

/// Delay between consecutive batches of one pass.
const DEFAULT_INTER_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Fixed-delay backoff applied between batches.
///
/// The wait suspends only the calling task; unrelated concurrent
/// resolutions are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_INTER_BATCH_DELAY,
        }
    }
}

impl BackoffPolicy {
    /// A policy with an explicit inter-batch delay.
    #[must_use]
    pub const fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    /// A policy that does not wait between batches.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    async fn wait(self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Pagination settings for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    /// Batch size requested per page.
    pub page_size: usize,
    /// Hard ceiling on the cumulative offset.
    pub offset_ceiling: usize,
    /// Backoff between batches.
    pub backoff: BackoffPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            offset_ceiling: OFFSET_CEILING,
            backoff: BackoffPolicy::default(),
        }
    }
}

/// The accumulated result of one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassOutcome {
    /// Every feature accumulated before exhaustion, failure or the ceiling.
    pub features: Vec<RawFeature>,
    /// Whether the pass stopped before the remote window was exhausted.
    pub truncated: bool,
}

/// Pagination states; batches within a pass are strictly sequential
/// because each offset depends on the previous batch's outcome.
enum FetchState {
    Idle,
    Fetching { offset: usize },
    Accumulating { offset: usize, page: FeaturePage },
    Exhausted,
    Failed { error: SourceError },
}

/// Drive one pass to completion, accumulating every batch.
///
/// Never fails: remote errors degrade the pass to its partial accumulation
/// and set `truncated`.
pub async fn fetch_all(
    source: &dyn FeatureSource,
    template: &PageQuery,
    settings: &FetchSettings,
    sink: &dyn EventSink,
    pass: PassKind,
) -> PassOutcome {
    let mut accumulated = Vec::new();
    let mut truncated = false;
    let mut state = FetchState::Idle;

    loop {
        state = match state {
            FetchState::Idle => FetchState::Fetching { offset: 0 },
            FetchState::Fetching { offset } => {
                let query = template.at_offset(offset);
                match source.fetch_page(&query).await {
                    Ok(page) => FetchState::Accumulating { offset, page },
                    Err(error) => FetchState::Failed { error },
                }
            }
            FetchState::Accumulating { offset, page } => {
                let count = page.features.len();
                let full_batch = count >= settings.page_size;
                let more = page.more || full_batch;
                sink.record(&ResolverEvent::PageFetched {
                    pass,
                    offset,
                    count,
                    more,
                });
                accumulated.extend(page.features);

                let next_offset = offset + settings.page_size;
                if !more {
                    FetchState::Exhausted
                } else if next_offset >= settings.offset_ceiling {
                    truncated = true;
                    sink.record(&ResolverEvent::PassTruncated {
                        pass,
                        offset: next_offset,
                    });
                    FetchState::Exhausted
                } else {
                    settings.backoff.wait().await;
                    FetchState::Fetching {
                        offset: next_offset,
                    }
                }
            }
            FetchState::Exhausted => break,
            FetchState::Failed { error } => {
                truncated = true;
                sink.record(&ResolverEvent::PassDegraded {
                    pass,
                    message: error.to_string(),
                });
                break;
            }
        };
    }

    PassOutcome {
        features: accumulated,
        truncated,
    }
}
