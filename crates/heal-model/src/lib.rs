//! Self-Heal Data Model
//!
//! Plain, serializable types exchanged between the evidence collector, the
//! diagnosis core, the review flow and the apply/report stages.
//!
//! # Core Concepts
//!
//! - [`FailureContext`] / [`EvidencePacket`]: what the collector hands us, read-only
//! - [`RuleMatch`]: one diagnosis finding, either a [`PatchPlan`] or an [`AnalysisOnly`]
//! - [`PatchPlan`] / [`ApplyResult`]: a proposed edit and the outcome of executing it
//! - [`ProposalSet`] / [`SelectionManifest`] / [`ApplySummary`]: the audit trio
//!
//! Wire names are camelCase; the collector and the review UI speak JSON.

#![warn(unreachable_pub)]

mod evidence;
mod patch;
mod proposal;
mod rule;

pub use evidence::{
    AdoContext, AdoParent, AdoTestCase, AttachmentReference, CollectionMetadata, EvidencePacket,
    FailureContext,
};
pub use patch::{ApplyResult, PatchOperation, PatchOperationResult, PatchPlan, PREVIEW_PREFIX};
pub use proposal::{
    ApplySummary, ItemApplyResult, ItemApplyStatus, ProposalItem, ProposalSet, ProposalSource,
    SelectionManifest,
};
pub use rule::{
    AnalysisOnly, HealTarget, RuleMatch, RuleOutcome, TargetKind, REQUIREMENT_MISMATCH,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
