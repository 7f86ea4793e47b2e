//! Alerts
//!
//! In-memory ring of high-similarity alerts. Alerts are advisory for the
//! dashboard; the durable record of every scan lives in the history log.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::fusion::ThreatBand;

/// How many alerts to retain before dropping the oldest.
const MAX_ALERTS: usize = 200;

/// One high-similarity detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub domain: String,
    pub similarity: u8,
    pub band: ThreatBand,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn new(domain: &str, similarity: u8, band: ThreatBand) -> Self {
        Self {
            id: Uuid::new_v4(),
            domain: domain.to_string(),
            similarity,
            band,
            message: format!("High similarity detected: {} ({}%)", domain, similarity),
            timestamp: Utc::now(),
        }
    }
}

/// Bounded, newest-first alert buffer.
pub struct AlertSink {
    alerts: RwLock<VecDeque<Alert>>,
}

impl AlertSink {
    pub fn new() -> Self {
        Self {
            alerts: RwLock::new(VecDeque::with_capacity(MAX_ALERTS)),
        }
    }

    /// Record an alert, evicting the oldest past the cap.
    pub fn emit(&self, alert: Alert) {
        tracing::warn!(
            domain = %alert.domain,
            similarity = alert.similarity,
            band = alert.band.as_str(),
            "{}", alert.message
        );

        let mut alerts = self.alerts.write();
        alerts.push_front(alert);
        while alerts.len() > MAX_ALERTS {
            alerts.pop_back();
        }
    }

    /// All retained alerts, newest first.
    pub fn recent(&self) -> Vec<Alert> {
        self.alerts.read().iter().cloned().collect()
    }
}

impl Default for AlertSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_message_format() {
        let alert = Alert::new("combank-secure.com", 90, ThreatBand::Critical);
        assert_eq!(alert.message, "High similarity detected: combank-secure.com (90%)");
    }

    #[test]
    fn test_emit_is_newest_first() {
        let sink = AlertSink::new();
        sink.emit(Alert::new("first.com", 80, ThreatBand::Warning));
        sink.emit(Alert::new("second.com", 90, ThreatBand::Critical));

        let alerts = sink.recent();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].domain, "second.com");
        assert_eq!(alerts[1].domain, "first.com");
    }

    #[test]
    fn test_ring_evicts_oldest_past_cap() {
        let sink = AlertSink::new();
        for i in 0..(MAX_ALERTS + 10) {
            sink.emit(Alert::new(&format!("fake{}.com", i), 80, ThreatBand::Warning));
        }

        let alerts = sink.recent();
        assert_eq!(alerts.len(), MAX_ALERTS);
        // Newest retained, oldest evicted
        assert_eq!(alerts[0].domain, format!("fake{}.com", MAX_ALERTS + 9));
        assert_eq!(alerts[MAX_ALERTS - 1].domain, "fake10.com");
    }

    #[test]
    fn test_empty_sink() {
        let sink = AlertSink::new();
        assert!(sink.recent().is_empty());
    }
}
