//! Volunteer confirmation screen shown after a verified scan.

use std::time::Duration;

use evently_core::Route;
use evently_shared::models::ScanEvent;
use evently_store::app_config::ScannerConfig;
use tokio_util::sync::CancellationToken;

pub struct ScanResultView {
    scan: ScanEvent,
    return_after: Duration,
}

impl ScanResultView {
    pub fn new(scan: ScanEvent, config: &ScannerConfig) -> Self {
        Self {
            scan,
            return_after: config.success_redirect(),
        }
    }

    pub fn from_route(route: Route, config: &ScannerConfig) -> Option<Self> {
        match route {
            Route::ScanResult(scan) => Some(Self::new(scan, config)),
            _ => None,
        }
    }

    pub fn scan(&self) -> &ScanEvent {
        &self.scan
    }

    pub fn headline(&self) -> &'static str {
        self.scan.scan_type.headline()
    }

    /// Label/value rows under the headline
    pub fn details(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Student", self.scan.student_name.clone()),
            ("Registration", self.scan.registration_id.clone()),
        ];
        if let Some(n) = self.scan.checked_in_count {
            rows.push(("Checked in", n.to_string()));
        }
        if let Some(n) = self.scan.checked_out_count {
            rows.push(("Checked out", n.to_string()));
        }
        rows
    }

    pub fn return_after(&self) -> Duration {
        self.return_after
    }

    /// Back to the scanner once the delay passes, unless cancelled first
    pub async fn auto_return(&self, cancel: &CancellationToken) -> Option<Route> {
        tokio::select! {
            _ = cancel.cancelled() => None,
            _ = tokio::time::sleep(self.return_after) => Some(Route::Scanner),
        }
    }
}
