use chrono::Utc;

use crate::graph::{find_enclosing_stage, FlowGraph};

/// Source of the current time, in milliseconds since the epoch.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Seconds elapsed since the stage enclosing `from` started.
///
/// `None` when there is no enclosing stage or its start time was not recorded.
/// Clock skew never yields a negative duration.
pub fn elapsed_seconds<G: FlowGraph>(graph: &G, from: &G::Node, clock: &dyn Clock) -> Option<u64> {
    let stage = find_enclosing_stage(graph, from)?;
    let started = graph.start_millis(&stage)?;
    let elapsed = clock.now_millis().saturating_sub(started).max(0);

    u64::try_from(elapsed / 1000).ok()
}
