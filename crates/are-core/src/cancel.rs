//! Cooperative cancellation for pipeline invocations.
//!
//! The pipeline has no I/O and only two suspension points: the normalizer
//! and the conflict resolver check the token at entry and abort with
//! [`CompileError::Cancelled`](crate::error::CompileError::Cancelled)
//! before doing work. Once past the resolver, cancellation is no longer
//! honored and the remaining stages run to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply clonable cancellation handle.
///
/// All clones share the same flag; cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the token to cancelled. Irreversible.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any
    /// clone of this token.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
