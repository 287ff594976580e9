//! Self-Heal Rule Engine
//!
//! Deterministic classification of a test failure into heal items (patch
//! proposals) and analysis items (explanations only).
//!
//! # Architecture
//!
//! ```text
//! FailureContext + EvidencePacket
//!        │
//!        ▼
//!  MatchContext ──► RuleMatcher × N (sequential, some ask the DomInspector)
//!        │
//!        ▼
//!  partition ──► confidence floor ──► acceptance-criteria suppression
//!        │
//!        ▼
//!  Diagnosis { heal_items, analysis_items }
//! ```
//!
//! Suppression is delegated to a single [`RequirementAlignment`] so the
//! conflict heuristic can change without touching engine control flow.

#![warn(unreachable_pub)]

pub mod alignment;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod matchers;
pub mod text;

pub use alignment::{AlignmentVerdict, LiteralAlignment, RequirementAlignment};
pub use engine::{Diagnosis, RuleEngine};
pub use error::RuleError;
pub use matcher::{MatchContext, RuleMatcher};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for writing and running matchers
    pub use crate::alignment::{AlignmentVerdict, RequirementAlignment};
    pub use crate::engine::{Diagnosis, RuleEngine};
    pub use crate::error::RuleError;
    pub use crate::matcher::{MatchContext, RuleMatcher};
    pub use heal_model::{HealTarget, PatchOperation, PatchPlan, RuleMatch, TargetKind};
}
