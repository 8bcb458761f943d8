//! Cache metrics.
//!
//! Counters are recorded through the `metrics` facade; they are no-ops until
//! the server installs a recorder.

use metrics::{counter, describe_counter};

/// Metric names for the cache layer.
pub mod names {
    /// Cache lookups, labelled by `view` and `outcome` (hit, miss, error, decode_error).
    pub const CACHE_LOOKUPS_TOTAL: &str = "quill_cache_lookups_total";
    /// Cache writes and deletes, labelled by `view` and `outcome`.
    pub const CACHE_WRITES_TOTAL: &str = "quill_cache_writes_total";
    /// Background cache tasks, labelled by `task` and `outcome`.
    pub const CACHE_TASKS_TOTAL: &str = "quill_cache_tasks_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::CACHE_LOOKUPS_TOTAL,
        "Total number of cache lookups by view and outcome"
    );
    describe_counter!(
        names::CACHE_WRITES_TOTAL,
        "Total number of cache writes and invalidations by view and outcome"
    );
    describe_counter!(
        names::CACHE_TASKS_TOTAL,
        "Total number of background cache tasks by task and outcome"
    );
}

pub(crate) fn record_lookup(view: &'static str, outcome: &'static str) {
    counter!(names::CACHE_LOOKUPS_TOTAL, "view" => view, "outcome" => outcome).increment(1);
}

pub(crate) fn record_write(view: &'static str, outcome: &'static str) {
    counter!(names::CACHE_WRITES_TOTAL, "view" => view, "outcome" => outcome).increment(1);
}

pub(crate) fn record_task(task: &'static str, outcome: &'static str) {
    counter!(names::CACHE_TASKS_TOTAL, "task" => task, "outcome" => outcome).increment(1);
}
