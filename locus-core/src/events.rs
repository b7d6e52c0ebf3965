//! Structured observability events emitted during resolution.
//!
//! The resolver reports progress through an injected [`EventSink`] instead
//! of writing to any particular output. Sinks must tolerate concurrent
//! calls: the containment and proximity passes may run at the same time.

use std::fmt;

/// Which of the two query passes an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// The "does this polygon contain the origin?" pass.
    Containment,
    /// The "which features lie within the radius?" pass.
    Proximity,
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Containment => write!(f, "containment"),
            Self::Proximity => write!(f, "proximity"),
        }
    }
}

/// Progress and degradation events from one resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolverEvent {
    /// A pass began issuing batch requests.
    PassStarted {
        /// Originating pass.
        pass: PassKind,
    },
    /// One batch completed.
    PageFetched {
        /// Originating pass.
        pass: PassKind,
        /// Offset of the batch within the result window.
        offset: usize,
        /// Number of features in the batch.
        count: usize,
        /// Whether the service signalled or implied further records.
        more: bool,
    },
    /// A pass stopped early on a batch error, keeping its partial
    /// accumulation.
    PassDegraded {
        /// Originating pass.
        pass: PassKind,
        /// Description of the batch error.
        message: String,
    },
    /// A pass hit the hard offset ceiling before exhaustion.
    PassTruncated {
        /// Originating pass.
        pass: PassKind,
        /// Offset at which pagination was cut off.
        offset: usize,
    },
    /// The resolution produced its final ranked list.
    Resolved {
        /// Number of features returned.
        count: usize,
        /// Whether either pass was degraded or truncated.
        truncated: bool,
    },
}

/// Receiver for [`ResolverEvent`]s.
pub trait EventSink: Send + Sync {
    /// Record one event. Implementations must not panic.
    fn record(&self, event: &ResolverEvent);
}

/// An [`EventSink`] that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &ResolverEvent) {}
}
