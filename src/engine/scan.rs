//! Scan pipeline
//!
//! One domain, one pass: fetch the candidate page, run the four signal
//! scorers against the baseline fingerprint, fuse, then record the result
//! in the watchlist, the history log and (past the threshold) the alert
//! sink. Fetch failures are results too, recorded as zero-score scans
//! with the failure reason.

use crate::error::AppError;

use super::alerts::Alert;
use super::baseline::Baseline;
use super::fetcher::FetchedPage;
use super::fusion::{self, ThreatBand};
use super::history::{ScanEvent, ScanTrigger};
use super::page;
use super::scorers::{dom, keyword, text, visual, SignalScores};
use super::watchlist::{self, ScanOutcome, WatchlistEntry};
use super::EngineState;

/// Scan one watchlisted domain and record the outcome everywhere it
/// belongs. Fails when the domain is not on the watchlist or no baseline
/// has been captured yet; a fetch failure is not an error.
pub async fn scan_domain(
    state: &EngineState,
    raw_domain: &str,
    trigger: ScanTrigger,
) -> Result<WatchlistEntry, AppError> {
    let domain = watchlist::normalize_domain(raw_domain)?;

    if !state.watchlist.contains(&domain) {
        return Err(AppError::NotFound(format!("Domain not on watchlist: {}", domain)));
    }

    let baseline = state
        .baseline
        .snapshot()
        .ok_or(AppError::BaselineUnavailable)?;

    let outcome = match state.fetcher.fetch(&domain).await {
        Ok(page) => {
            tracing::debug!(domain = %domain, status = page.status, "Candidate page fetched");
            score_page(&baseline, &domain, &page)
        }
        Err(failure) => {
            tracing::info!(
                domain = %domain,
                reason = %failure.reason_code(),
                "Candidate page could not be fetched"
            );
            ScanOutcome::from_failure(&failure)
        }
    };

    let entry = state.watchlist.record_scan(&domain, &outcome)?;

    // History and alerting are best-effort; the recorded entry stands
    // even when the log write fails.
    let event = ScanEvent::new(&domain, outcome.similarity, outcome.band, trigger);
    if let Err(err) = state.history.record(&event) {
        tracing::error!(domain = %domain, "Failed to record scan history: {}", err);
    }

    if fusion::should_alert(outcome.similarity, state.config.alert_threshold) {
        state
            .alerts
            .emit(Alert::new(&domain, outcome.similarity, outcome.band));
    }

    tracing::info!(
        domain = %domain,
        similarity = outcome.similarity,
        band = outcome.band.as_str(),
        "Scan complete"
    );

    Ok(entry)
}

/// Run every scorer over a fetched page and fuse the signals.
fn score_page(baseline: &Baseline, domain: &str, fetched: &FetchedPage) -> ScanOutcome {
    let analysis = page::analyze(&fetched.html);

    let candidate_hash = fetched.screenshot.as_deref().and_then(visual::hash_file);

    let scores = SignalScores {
        visual: visual::score_hashes(baseline.screenshot_hash, candidate_hash),
        text: text::score(&baseline.text_fingerprint, &analysis.text),
        dom: dom::score(&baseline.dom_skeleton, &analysis.tags),
        keyword: keyword::score(
            &baseline.keyword_set,
            &baseline.brand_token,
            domain,
            &analysis.text,
            &analysis.attr_text,
        ),
    };

    let similarity = fusion::fuse(&scores);
    let band = ThreatBand::from_score(similarity);

    let screenshot = fetched
        .screenshot
        .as_deref()
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned());

    ScanOutcome {
        similarity,
        band,
        details: scores.into(),
        screenshot,
    }
}
