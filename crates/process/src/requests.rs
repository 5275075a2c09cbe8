use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Identifies one layout request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutTicket(u64);

/// Last-write-wins bookkeeping for overlapping layout requests
///
/// Every request takes a ticket before computing. When its result comes
/// back, only the holder of the most recent ticket may apply it; older
/// results are dropped. The solver itself is never interrupted.
#[derive(Debug, Default)]
pub struct LayoutRequests {
    latest: AtomicU64,
}

impl LayoutRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding all earlier ones
    pub fn issue(&self) -> LayoutTicket {
        LayoutTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: LayoutTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Hand back `result` only if no newer request was issued since `ticket`
    pub fn accept<T>(&self, ticket: LayoutTicket, result: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(result)
        } else {
            debug!("Discarding stale layout {ticket:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::model::{Direction, Node, NodeKind, ProcessGraph};
    use crate::pipeline::layout;
    use test_log::test;

    #[test]
    fn test_only_latest_is_accepted() {
        let requests = LayoutRequests::new();
        let first = requests.issue();
        let second = requests.issue();

        assert!(first < second);
        assert_eq!(requests.accept(first, "lr"), None);
        assert_eq!(requests.accept(second, "tb"), Some("tb"));
    }

    #[test]
    fn test_overlapping_layouts_on_threads() {
        let graph = ProcessGraph::new(
            vec![Node::new("a", NodeKind::UserTask).in_lane("L1")],
            vec![],
            vec![crate::model::Lane::new("L1", "Clerk")],
        );
        let requests = LayoutRequests::new();
        let config = LayoutConfig::default();

        // Rapid toggling: LR, TB, LR
        let tickets: Vec<(LayoutTicket, Direction)> = [
            Direction::LeftToRight,
            Direction::TopToBottom,
            Direction::LeftToRight,
        ]
        .into_iter()
        .map(|direction| (requests.issue(), direction))
        .collect();

        let applied: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = tickets
                .iter()
                .map(|&(ticket, direction)| {
                    let (graph, config, requests) = (&graph, &config, &requests);
                    scope.spawn(move || requests.accept(ticket, layout(graph, direction, config)))
                })
                .collect();
            handles
                .into_iter()
                .filter_map(|handle| handle.join().ok().flatten())
                .collect()
        });

        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].direction, Direction::LeftToRight);
    }
}
