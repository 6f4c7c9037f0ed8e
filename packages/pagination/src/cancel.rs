use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Cooperative cancellation, checked between pages
pub trait CancelToken {
    fn is_cancelled(&self) -> bool;
}

/// Token for runs that can't be cancelled
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancelToken for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: CancelToken + ?Sized> CancelToken for Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<F: Fn() -> bool> CancelToken for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// A cancelled run produces no pages
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Pagination was cancelled")]
pub struct Cancelled;
