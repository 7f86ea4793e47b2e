//! Signal Scorers
//!
//! Four independent similarity signals, each a pure function from
//! (baseline fingerprint, page analysis) to a 0-100 score. Scorers are
//! total: missing or undecodable input degrades that signal to 0, it never
//! aborts a scan. Each signal can be computed in isolation, in any order.

pub mod dom;
pub mod keyword;
pub mod text;
pub mod visual;

/// The four raw signal scores feeding fusion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalScores {
    pub visual: u8,
    pub text: u8,
    pub dom: u8,
    pub keyword: u8,
}
