//! Does a heal contradict the acceptance criteria?
//!
//! A heal that moves a test away from a value the acceptance criteria name
//! explicitly (and toward one they never mention) is probably making the
//! test agree with a regression. The engine turns such heals into
//! `requirement-mismatch` analysis items.
//!
//! The check sits behind [`RequirementAlignment`] so a smarter assessor can
//! replace the literal heuristic without touching the engine.

use heal_model::HealTarget;
use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Verdict for one heal target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignmentVerdict {
    /// No evidence the heal contradicts the criteria
    Aligned,
    /// The criteria pin the current value; carries the reason
    Conflict(String),
}

impl AlignmentVerdict {
    /// Whether this is a conflict
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Judges heal targets against acceptance-criteria text
pub trait RequirementAlignment: Send + Sync + std::fmt::Debug {
    /// Assess one heal target
    fn assess(&self, target: &HealTarget, criteria: &str) -> AlignmentVerdict;
}

/// Literal-mention heuristic
///
/// Conflict when the normalized criteria mention the current value but not
/// the proposed one. Values of `min_len` characters or fewer are too generic
/// to judge.
#[derive(Debug, Clone)]
pub struct LiteralAlignment {
    min_len: usize,
}

impl Default for LiteralAlignment {
    fn default() -> Self {
        Self { min_len: 3 }
    }
}

impl LiteralAlignment {
    /// With minimum value length considered
    #[inline]
    #[must_use]
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }
}

impl RequirementAlignment for LiteralAlignment {
    fn assess(&self, target: &HealTarget, criteria: &str) -> AlignmentVerdict {
        let current = normalize(&target.current);
        let proposed = normalize(&target.proposed);
        if current == proposed || current.chars().count() <= self.min_len {
            return AlignmentVerdict::Aligned;
        }

        let criteria = format!(" {} ", normalize(criteria));
        let mentions = |value: &str| !value.is_empty() && criteria.contains(&format!(" {value} "));

        if mentions(&current) && !mentions(&proposed) {
            AlignmentVerdict::Conflict(format!(
                "acceptance criteria name \"{}\" but not \"{}\"",
                target.current, target.proposed
            ))
        } else {
            AlignmentVerdict::Aligned
        }
    }
}

/// Lowercase words only: tags stripped, basic entities decoded, every
/// non-alphanumeric run collapsed to one space
fn normalize(text: &str) -> String {
    let stripped = TAG.replace_all(text, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    decoded
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
