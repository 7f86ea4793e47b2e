//! Score Fusion
//!
//! Combines the four signal scores into one 0-100 similarity score and maps
//! it to a threat band. Fusion is deterministic and purely integer-based so
//! band boundaries are exact.

use serde::{Deserialize, Serialize};

use super::scorers::SignalScores;

// ============================================================================
// WEIGHTS (percent contribution of each signal, sum to 100)
// ============================================================================

/// Visual similarity weight (30%)
pub const VISUAL_WEIGHT_PCT: u32 = 30;

/// Text similarity weight (30%)
pub const TEXT_WEIGHT_PCT: u32 = 30;

/// DOM structure similarity weight (20%)
pub const DOM_WEIGHT_PCT: u32 = 20;

/// Keyword similarity weight (20%)
pub const KEYWORD_WEIGHT_PCT: u32 = 20;

// ============================================================================
// BAND BOUNDARIES (display semantics, fixed)
// ============================================================================

/// At or above = CRITICAL
pub const CRITICAL_MIN: u8 = 85;

/// At or above = WARNING (below CRITICAL_MIN)
pub const WARNING_MIN: u8 = 70;

/// At or above = SUSPICIOUS (below WARNING_MIN)
pub const SUSPICIOUS_MIN: u8 = 55;

/// Default similarity at or above which an alert is emitted.
/// Independent from the display bands above.
pub const DEFAULT_ALERT_THRESHOLD: u8 = 75;

// ============================================================================
// THREAT BANDS
// ============================================================================

/// Display band for an overall similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatBand {
    Critical,
    Warning,
    Suspicious,
    Low,
    Pending,
}

impl ThreatBand {
    /// Map an overall score to its band. Score 0 means "not yet scored".
    pub fn from_score(score: u8) -> Self {
        if score >= CRITICAL_MIN {
            ThreatBand::Critical
        } else if score >= WARNING_MIN {
            ThreatBand::Warning
        } else if score >= SUSPICIOUS_MIN {
            ThreatBand::Suspicious
        } else if score >= 1 {
            ThreatBand::Low
        } else {
            ThreatBand::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatBand::Critical => "CRITICAL",
            ThreatBand::Warning => "WARNING",
            ThreatBand::Suspicious => "SUSPICIOUS",
            ThreatBand::Low => "LOW",
            ThreatBand::Pending => "PENDING",
        }
    }
}

// ============================================================================
// FUSION
// ============================================================================

/// Weighted fusion of the four signals.
///
/// Integer arithmetic with round-half-up: equivalent to
/// round(0.30*visual + 0.30*text + 0.20*dom + 0.20*keyword), clamped to 100.
pub fn fuse(scores: &SignalScores) -> u8 {
    let weighted = VISUAL_WEIGHT_PCT * scores.visual as u32
        + TEXT_WEIGHT_PCT * scores.text as u32
        + DOM_WEIGHT_PCT * scores.dom as u32
        + KEYWORD_WEIGHT_PCT * scores.keyword as u32;

    (((weighted + 50) / 100).min(100)) as u8
}

/// Alert rule: emit when the fused score reaches the configured threshold.
pub fn should_alert(overall: u8, threshold: u8) -> bool {
    overall >= threshold
}

// ============================================================================
// TESTS
// ============================================================================
