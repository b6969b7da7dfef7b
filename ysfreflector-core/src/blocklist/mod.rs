use ahash::AHashSet;
use std::sync::RwLock;

use crate::wire::sanitize_callsign;

/// A thread-safe set of canonical callsigns. Grounded on the
/// teacher's `security::ip_filter` predicate shape, but keyed on canonical
/// callsign strings rather than `IpNet`s, and backed by a single mutable set
/// rather than allow/deny modes — there is only ever a denylist here.
pub struct Blocklist {
    entries: RwLock<AHashSet<String>>,
}

impl Blocklist {
    pub fn new() -> Self {
        Self { entries: RwLock::new(AHashSet::default()) }
    }

    pub fn from_callsigns<I: IntoIterator<Item = S>, S: AsRef<str>>(callsigns: I) -> Self {
        let list = Self::new();
        list.set(callsigns);
        list
    }

    /// Returns `true` if the (already-canonical or raw) callsign is blocked.
    pub fn is_blocked(&self, callsign: &str) -> bool {
        let canonical = sanitize_callsign(callsign.as_bytes());
        let entries = self.entries.read().expect("blocklist lock poisoned");
        entries.contains(&canonical)
    }

    pub fn block(&self, callsign: &str) {
        let canonical = sanitize_callsign(callsign.as_bytes());
        let mut entries = self.entries.write().expect("blocklist lock poisoned");
        entries.insert(canonical);
    }

    pub fn unblock(&self, callsign: &str) {
        let canonical = sanitize_callsign(callsign.as_bytes());
        let mut entries = self.entries.write().expect("blocklist lock poisoned");
        entries.remove(&canonical);
    }

    /// Atomically replaces the entire blocklist contents.
    pub fn set<I: IntoIterator<Item = S>, S: AsRef<str>>(&self, callsigns: I) {
        let canonical: AHashSet<String> =
            callsigns.into_iter().map(|cs| sanitize_callsign(cs.as_ref().as_bytes())).collect();
        let mut entries = self.entries.write().expect("blocklist lock poisoned");
        *entries = canonical;
    }

    pub fn count(&self) -> usize {
        self.entries.read().expect("blocklist lock poisoned").len()
    }

    pub fn clear(&self) {
        self.entries.write().expect("blocklist lock poisoned").clear();
    }
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_by_canonical_form() {
        let list = Blocklist::from_callsigns(["KF8S"]);
        assert!(list.is_blocked("kf8s-dave"));
        assert!(list.is_blocked("KF8S"));
        assert!(!list.is_blocked("W1AW"));
    }

    #[test]
    fn unblock_removes_entry() {
        let list = Blocklist::from_callsigns(["KF8S"]);
        list.unblock("kf8s");
        assert!(!list.is_blocked("KF8S"));
    }

    #[test]
    fn set_replaces_atomically() {
        let list = Blocklist::from_callsigns(["KF8S"]);
        list.set(["W1AW"]);
        assert!(!list.is_blocked("KF8S"));
        assert!(list.is_blocked("W1AW"));
        assert_eq!(list.count(), 1);
    }

    #[test]
    fn clear_empties_the_set() {
        let list = Blocklist::from_callsigns(["KF8S", "W1AW"]);
        list.clear();
        assert_eq!(list.count(), 0);
    }
}
