//! Weekly digest trigger.

use std::sync::Arc;

use api_adapters::Metrics;
use chrono::Utc;
use services::{DigestService, WeeklySchedule};
use tracing::{error, info};

/// Sleeps until each scheduled instant and runs the digest. Runs never
/// overlap; a failed run is logged and the next one is scheduled as usual.
pub async fn run_weekly(digest: DigestService, schedule: WeeklySchedule, metrics: Arc<Metrics>) {
    loop {
        let now = Utc::now();
        let next = schedule.next_after(now);
        info!(next_run = %next, "digest scheduled");
        tokio::time::sleep((next - now).to_std().unwrap_or_default()).await;

        match digest.run(Utc::now()).await {
            Ok(report) => {
                metrics.record_digest(&report);
                info!(
                    news = report.news_count,
                    recipients = report.recipients,
                    delivered = report.delivered,
                    failed = report.failed,
                    "digest run finished"
                );
            }
            Err(e) => error!(error = %e, "digest run failed"),
        }
    }
}
