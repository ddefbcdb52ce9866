use std::time::Duration;

use actix_web::rt::time;
use strum::IntoEnumIterator;
use tracing::info;

use super::{AnalysisType, service::AnalyticsService};

/// Refreshes every analysis type on a fixed interval for the life of the
/// process. Types still running from the previous tick are skipped.
pub async fn run(service: AnalyticsService, every: Duration) {
    info!(interval_secs = every.as_secs(), "Analytics poller started");

    let mut ticker = time::interval(every);
    loop {
        ticker.tick().await;

        for kind in AnalysisType::iter() {
            let service = service.clone();
            actix_web::rt::spawn(async move {
                service.refresh_if_idle(kind).await;
            });
        }
    }
}
