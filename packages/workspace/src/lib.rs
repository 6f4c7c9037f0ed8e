//! # Scriptform Workspace
//!
//! Background pagination for live documents. See [`PaginationManager`].

pub mod delegate;
pub mod error;
pub mod manager;

#[cfg(test)]
mod tests_manager;

pub use delegate::{PaginationDelegate, StaticDelegate};
pub use error::ManagerError;
pub use manager::{Delivery, PaginationManager, RunId};
