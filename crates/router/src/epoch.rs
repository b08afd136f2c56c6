//! Per-node epoch bookkeeping.

use std::collections::HashMap;

/// Last epoch reported by each node, plus the cluster's middle epoch.
///
/// The middle epoch is the upper median of the epochs of the nodes currently
/// counted (alive nodes). With no counted reports the previous value is kept,
/// so a cluster that briefly loses every node does not forget where the
/// chain was.
#[derive(Debug, Default)]
pub(crate) struct EpochBook {
    epochs: HashMap<String, u64>,
    mid: Option<u64>,
}

impl EpochBook {
    /// Overwrite the epoch of `name`. Duplicate and stale reports simply win
    /// or lose by arrival order; nothing accumulates.
    pub(crate) fn record(&mut self, name: &str, epoch: u64) {
        match self.epochs.get_mut(name) {
            Some(slot) => *slot = epoch,
            None => {
                self.epochs.insert(name.to_owned(), epoch);
            }
        }
    }

    pub(crate) fn forget(&mut self, name: &str) {
        self.epochs.remove(name);
        if self.epochs.is_empty() {
            self.mid = None;
        }
    }

    pub(crate) fn epoch(&self, name: &str) -> Option<u64> {
        self.epochs.get(name).copied()
    }

    pub(crate) fn mid(&self) -> Option<u64> {
        self.mid
    }

    /// Whether `epoch` is a believable report from `name`: at most `max_jump`
    /// past the higher of the node's last epoch and the middle epoch. The
    /// first report of a fresh cluster has no reference and always passes.
    pub(crate) fn is_plausible(&self, name: &str, epoch: u64, max_jump: u64) -> bool {
        match self.epoch(name).max(self.mid) {
            Some(reference) => epoch <= reference.saturating_add(max_jump),
            None => true,
        }
    }

    /// Recompute the middle epoch over the nodes for which `counted` holds.
    pub(crate) fn recompute(&mut self, mut counted: impl FnMut(&str) -> bool) -> Option<u64> {
        let mut epochs: Vec<u64> = self
            .epochs
            .iter()
            .filter(|(name, _)| counted(name))
            .map(|(_, epoch)| *epoch)
            .collect();

        if !epochs.is_empty() {
            epochs.sort_unstable();
            self.mid = Some(epochs[epochs.len() / 2]);
        }
        self.mid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_report_is_the_middle() {
        let mut book = EpochBook::default();
        book.record("a", 42);
        assert_eq!(book.recompute(|_| true), Some(42));
    }

    #[test]
    fn test_upper_median() {
        let mut book = EpochBook::default();
        for (name, epoch) in [("a", 10), ("b", 30), ("c", 20), ("d", 1000)] {
            book.record(name, epoch);
        }
        // Sorted: 10, 20, 30, 1000 -> index 2.
        assert_eq!(book.recompute(|_| true), Some(30));
        // An outlier does not drag the middle along.
        assert_eq!(book.recompute(|name| name != "b"), Some(20));
    }

    #[test]
    fn test_duplicate_and_out_of_order_reports_overwrite() {
        let mut book = EpochBook::default();
        book.record("a", 100);
        book.record("a", 100);
        book.record("a", 90);
        assert_eq!(book.epoch("a"), Some(90));
        assert_eq!(book.recompute(|_| true), Some(90));
    }

    #[test]
    fn test_no_counted_nodes_keeps_previous_middle() {
        let mut book = EpochBook::default();
        book.record("a", 5);
        book.recompute(|_| true);
        assert_eq!(book.recompute(|_| false), Some(5));
    }

    #[test]
    fn test_plausibility_is_measured_from_node_or_middle() {
        let mut book = EpochBook::default();
        assert!(book.is_plausible("a", u64::MAX, 10));

        book.record("a", 100);
        book.recompute(|_| true);
        assert!(book.is_plausible("a", 110, 10));
        assert!(!book.is_plausible("a", 111, 10));
        // A newcomer is held to the middle epoch.
        assert!(book.is_plausible("b", 105, 10));
        assert!(!book.is_plausible("b", u64::MAX, 10));
        // Going backwards is the epoch policy's business, not a jump.
        assert!(book.is_plausible("a", 0, 10));
    }

    #[test]
    fn test_forgetting_last_node_clears_middle() {
        let mut book = EpochBook::default();
        book.record("a", 5);
        book.recompute(|_| true);
        book.forget("a");
        assert_eq!(book.mid(), None);
        assert_eq!(book.epoch("a"), None);
    }
}
