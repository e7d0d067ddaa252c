//! Usage metrics
//!
//! Counters and histograms are emitted through the `metrics` facade and are
//! no-ops until the embedding application installs a recorder.
//!
//! # Metrics
//!
//! - `audial_reviews_total`: Counter of reviewed replies by status and stage
//! - `audial_review_warnings`: Histogram of warnings on accepted replies
//! - `audial_retrieval_duration_seconds`: Histogram of ranking time
//! - `audial_retrieval_results`: Histogram of returned references
//! - `audial_session_versions_total`: Counter of stored versions

use crate::pipeline::Review;
use metrics::{histogram, increment_counter};
use std::time::Duration;

/// Records the outcome of one review
pub fn record_review(review: &Review) {
    match review {
        Review::Accepted { warnings, .. } => {
            increment_counter!("audial_reviews_total", "status" => "accepted");
            histogram!("audial_review_warnings", warnings.len() as f64);
        }
        Review::Rejected { stage, .. } => {
            increment_counter!(
                "audial_reviews_total",
                "status" => "rejected",
                "stage" => stage.as_str()
            );
        }
    }
}

/// Records one retrieval call
pub fn record_retrieval(results: usize, elapsed: Duration) {
    histogram!("audial_retrieval_duration_seconds", elapsed.as_secs_f64());
    histogram!("audial_retrieval_results", results as f64);
}

/// Records a version appended to a session
pub fn record_version() {
    increment_counter!("audial_session_versions_total");
}
