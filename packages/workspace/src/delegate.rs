use crate::error::ManagerError;
use scriptform_pagination::{Pagination, PaginationSettings};

/// Owner-side hooks of a [`PaginationManager`](crate::PaginationManager).
///
/// Called on the owner's context only, never from a worker.
pub trait PaginationDelegate {
    /// Settings for the next run
    fn pagination_settings(&self) -> PaginationSettings;

    /// A result was accepted and cached
    fn pagination_finished(&mut self, pagination: &Pagination);

    fn pagination_failed(&mut self, _error: &ManagerError) {}
}

/// Delegate with fixed settings that ignores results
#[derive(Debug, Clone, Default)]
pub struct StaticDelegate {
    pub settings: PaginationSettings,
}

impl StaticDelegate {
    pub fn new(settings: PaginationSettings) -> Self {
        Self { settings }
    }
}

impl PaginationDelegate for StaticDelegate {
    fn pagination_settings(&self) -> PaginationSettings {
        self.settings.clone()
    }

    fn pagination_finished(&mut self, _pagination: &Pagination) {}
}
