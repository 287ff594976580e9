//! Self-Heal Apply Reports
//!
//! One immutable JSON file per apply, tying together the proposal set, the
//! human selection and the apply outcome.
//!
//! # Core Operations
//!
//! - [`ApplyReportWriter::report_path`]: `YYYYMMDD-HHmmss-<proposalId>.json` under the reports directory
//! - [`ApplyReportWriter::write_apply_report`]: cross-validate ids, then write atomically
//!
//! # Example
//!
//! ```rust,ignore
//! let writer = ApplyReportWriter::new(fs, repo_root.join(DEFAULT_REPORTS_DIR));
//! let path = writer
//!     .write_apply_report(ApplyReportInput {
//!         proposal_set: &set,
//!         selection_manifest: &manifest,
//!         apply_summary: &summary,
//!         ado_context: evidence.ado_context.as_ref(),
//!     })
//!     .await?;
//! ```

#![warn(unreachable_pub)]

mod error;
mod writer;

pub use error::ReportError;
pub use writer::{ApplyReport, ApplyReportInput, ApplyReportWriter, DEFAULT_REPORTS_DIR};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
