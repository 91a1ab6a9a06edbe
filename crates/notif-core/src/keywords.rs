use std::collections::BTreeSet;
use std::collections::HashSet;

/// Ordered keyword list reconciled against an unordered canonical set.
///
/// Survivors keep their relative order across reconciliations; keywords new
/// to the canonical set are appended in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordOrderTracker {
    ordered: Vec<String>,
}

impl KeywordOrderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ordered
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.ordered.iter().any(|item| item == keyword)
    }

    pub fn reconcile(&mut self, canonical: &BTreeSet<String>) -> &[String] {
        self.ordered.retain(|keyword| canonical.contains(keyword));
        let survivors: HashSet<String> = self.ordered.iter().cloned().collect();
        self.ordered.extend(
            canonical
                .iter()
                .filter(|keyword| !survivors.contains(keyword.as_str()))
                .cloned(),
        );
        &self.ordered
    }

    /// Appends `keyword` unless it is already tracked.
    pub fn insert_if_absent(&mut self, keyword: &str) -> bool {
        if self.contains(keyword) {
            return false;
        }
        self.ordered.push(keyword.to_string());
        true
    }

    pub fn remove(&mut self, keyword: &str) -> bool {
        let before = self.ordered.len();
        self.ordered.retain(|item| item != keyword);
        self.ordered.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    fn tracker(items: &[&str]) -> KeywordOrderTracker {
        let mut tracker = KeywordOrderTracker::new();
        for item in items {
            tracker.insert_if_absent(item);
        }
        tracker
    }

    #[test]
    fn drops_removed_and_appends_new() {
        let mut tracker = tracker(&["a", "b", "c"]);
        assert_eq!(tracker.reconcile(&set(&["b", "c", "d"])), &["b", "c", "d"]);
    }

    #[test]
    fn replaces_everything_with_sorted_remainder() {
        let mut tracker = tracker(&["a", "b"]);
        assert_eq!(tracker.reconcile(&set(&["z", "y"])), &["y", "z"]);
    }

    #[test]
    fn survivors_keep_user_order_over_lexicographic_order() {
        let mut tracker = tracker(&["zebra", "apple"]);
        assert_eq!(
            tracker.reconcile(&set(&["apple", "mango", "zebra", "banana"])),
            &["zebra", "apple", "banana", "mango"]
        );
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut tracker = tracker(&["c", "a"]);
        let canonical = set(&["a", "b", "c"]);
        let first = tracker.reconcile(&canonical).to_vec();
        let second = tracker.reconcile(&canonical).to_vec();
        assert_eq!(first, vec!["c", "a", "b"]);
        assert_eq!(first, second);
    }

    #[test]
    fn insert_and_remove_preserve_order() {
        let mut tracker = tracker(&["one", "two", "three"]);
        assert!(!tracker.insert_if_absent("two"));
        assert!(tracker.insert_if_absent("four"));
        assert!(tracker.remove("two"));
        assert!(!tracker.remove("two"));
        assert_eq!(tracker.as_slice(), &["one", "three", "four"]);
    }

    #[test]
    fn empty_canonical_set_clears_the_list() {
        let mut tracker = tracker(&["a"]);
        assert!(tracker.reconcile(&BTreeSet::new()).is_empty());
        assert!(tracker.is_empty());
    }
}
