//! Self-Heal Core
//!
//! Facade over the diagnosis and apply pipeline of an end-to-end test
//! suite's self-healing flow.
//!
//! # Architecture
//!
//! ```text
//! FailureContext + EvidencePacket
//!        │  RuleEngine (heal-rules, heal-dom)
//!        ▼
//!   ProposalSet ──► human review ──► SelectionManifest
//!        │                                  │
//!        └──────────────┬───────────────────┘
//!                       ▼  PatchApplier (heal-patch)
//!                  ApplySummary
//!                       │  ApplyReportWriter (heal-report)
//!                       ▼
//!        .heal/apply-reports/YYYYMMDD-HHmmss-<id>.json
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use heal_core::prelude::*;
//!
//! let core = HealCore::local(HealConfig::default().with_repo_root("."));
//! let proposals = core.diagnose(&failure, &evidence).await?;
//! let manifest = SelectionManifest::new(&proposals.id, vec!["heal-1".into()]);
//! let outcome = core.apply_selection(&proposals, &manifest, false, None).await?;
//! ```

#![warn(unreachable_pub)]

mod config;
mod facade;
mod error;
mod proposal;

pub use crate::config::HealConfig;
pub use crate::facade::{ApplyOutcome, HealCore};
pub use crate::error::HealError;
pub use crate::proposal::{build_proposal_set, ANALYSIS_ITEM_PREFIX, HEAL_ITEM_PREFIX};

// Re-export workspace crates
pub use heal_dom;
pub use heal_fs;
pub use heal_model;
pub use heal_patch;
pub use heal_report;
pub use heal_rules;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the self-heal flow
    pub use crate::config::HealConfig;
    pub use crate::facade::{ApplyOutcome, HealCore};
    pub use crate::error::HealError;
    pub use heal_model::{
        AdoContext, ApplySummary, EvidencePacket, FailureContext, ProposalSet, SelectionManifest,
    };
}
