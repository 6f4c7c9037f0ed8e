//! # Scriptform Pagination
//!
//! Lays a parsed [`Screenplay`](scriptform_parser::Screenplay) out into
//! fixed-height pages under screenplay typesetting rules.
//!
//! Heights are logical: every wrapped line takes one `line-height` of its
//! style and no glyph shaping happens here. A renderer draws the resulting
//! [`Page`]s; the layout itself never looks at fonts.
//!
//! ```text
//! Screenplay ──► blocks ──► layout ──► Vec<Page>
//!                  ▲           ▲
//!               Styles   PaginationSettings
//! ```
//!
//! [`Paginator::paginate_incremental`] reuses the pages of a previous run
//! that end before the edited scene.

mod block;
pub mod cancel;
mod layout;
pub mod measure;
pub mod page;
pub mod pagination;
pub mod paginator;
pub mod settings;

#[cfg(test)]
mod tests_incremental;
#[cfg(test)]
mod tests_layout;

pub use cancel::{CancelToken, Cancelled, NeverCancel};
pub use measure::{display_text, wrap};
pub use page::{ElementKind, Page, PageElement};
pub use pagination::{Pagination, SceneLength};
pub use paginator::{paginate, Paginator};
pub use settings::PaginationSettings;
