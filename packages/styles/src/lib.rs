//! # Scriptform Styles
//!
//! Stylesheets map element style names (`heading`, `dialogue`, …) to
//! [`RenderStyle`]s used for measurement and rendering.
//!
//! ## Pipeline
//!
//! 1. Comments are stripped and the source is split into rules
//! 2. `setting(key)` / `userSetting(key)` macros are substituted from a
//!    [`SettingsProvider`]
//! 3. Each declaration is decoded into a typed [`StyleProperty`]; numeric
//!    values are unit expressions (`ch`, `l`, `px`)
//! 4. Rules are resolved against the `page` rule into [`Styles`]
//!
//! Nothing in this pipeline fails: bad declarations are logged and skipped.

pub mod cache;
pub mod error;
pub mod expression;
pub mod property;
pub mod render_style;
pub mod settings;
pub mod styles;
pub mod stylesheet;

pub use cache::{builtin_family, StyleCache, StyleFamily, DEFAULT_FAMILY, STYLESHEET_EXTENSION};
pub use error::{StyleError, StyleResult, ValueError};
pub use expression::{evaluate, CHARACTER_WIDTH, LINE_HEIGHT};
pub use property::{PaperSize, PropertyKind, StyleProperty, TextAlign};
pub use render_style::RenderStyle;
pub use settings::{NoSettings, SettingValue, SettingsProvider, StaticSettings};
pub use styles::{Styles, PAGE_SELECTOR};
pub use stylesheet::{parse_stylesheet, strip_comments, StyleRule};
