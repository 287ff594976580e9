//! Self-Heal Patch Applier
//!
//! Turns an approved [`heal_model::PatchPlan`] into file edits, all or
//! nothing.
//!
//! # Core Operations
//!
//! - [`TargetFileResolver::resolve`]: logical path → path on disk, trying `tests/` second
//! - [`PatchApplier::apply_patch_plan`]: run every operation in order, rolling back on failure
//!
//! # Guarantees
//!
//! - A file is resolved once per operation and every record for that
//!   operation uses that resolution.
//! - If operation *k* fails, operations `1..k-1` are undone newest first,
//!   restoring the bytes captured at read time.
//! - Preview mode never writes; its success messages start with `[PREVIEW]`.
//! - Writes go through `<path>.tmp` and a rename.

#![warn(unreachable_pub)]

mod applier;
mod error;
mod resolver;

pub use applier::PatchApplier;
pub use error::{PatchError, ResolveError};
pub use resolver::{ResolvedTarget, TargetFileResolver, DEFAULT_TESTS_DIR};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
