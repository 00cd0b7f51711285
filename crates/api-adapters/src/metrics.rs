//! Prometheus counters, exposed in OpenMetrics text format at `/metrics`.

use domains::Vote;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;
use services::DigestReport;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct DigestEmailLabels {
    outcome: &'static str,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct VoteLabels {
    target: &'static str,
    direction: &'static str,
}

pub struct Metrics {
    registry: Registry,
    digest_runs: Counter,
    digest_emails: Family<DigestEmailLabels, Counter>,
    votes: Family<VoteLabels, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("portal");
        let digest_runs = Counter::default();
        let digest_emails = Family::<DigestEmailLabels, Counter>::default();
        let votes = Family::<VoteLabels, Counter>::default();

        registry.register("digest_runs", "Weekly digest runs", digest_runs.clone());
        registry.register(
            "digest_emails",
            "Digest emails by delivery outcome",
            digest_emails.clone(),
        );
        registry.register("votes", "Rating changes by target and direction", votes.clone());

        Self {
            registry,
            digest_runs,
            digest_emails,
            votes,
        }
    }

    pub fn record_digest(&self, report: &DigestReport) {
        self.digest_runs.inc();
        self.digest_emails
            .get_or_create(&DigestEmailLabels { outcome: "delivered" })
            .inc_by(report.delivered as u64);
        self.digest_emails
            .get_or_create(&DigestEmailLabels { outcome: "failed" })
            .inc_by(report.failed as u64);
    }

    /// `target` is `article` or `comment`.
    pub fn record_vote(&self, target: &'static str, vote: Vote) {
        self.votes
            .get_or_create(&VoteLabels {
                target,
                direction: vote.as_str(),
            })
            .inc();
    }

    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
