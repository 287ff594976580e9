//! Self-Heal DOM Inspector
//!
//! Answers "was this element on the page?" from the DOM snapshots captured in
//! an extracted trace.
//!
//! # Core Operations
//!
//! - [`extract_selector_from_error`]: pull a selector out of a runner error message
//! - [`DomInspector::check_selector`]: look for a selector in snapshot HTML
//! - [`DomInspector::collect_test_ids`]: inventory of `data-testid` values seen
//!
//! # Strictness
//!
//! With no extracted trace at all the check answers `not-exists` with zero
//! counts. Once a trace directory is located, reading zero snapshots is a
//! [`DomError::NoReadableSnapshots`], never a quiet `not-exists`.

#![warn(unreachable_pub)]

mod error;
mod extract;
mod inspector;
mod selector;
mod snapshot;

pub use error::DomError;
pub use extract::extract_selector_from_error;
pub use inspector::{DomInspector, SelectorCheck, SelectorStatus, DEFAULT_SCAN_CAP};
pub use selector::{test_ids_in, SelectorMatcher};
pub use snapshot::looks_like_markup;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
