use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use tracing::warn;

/// Callsign<->DMR-ID lookup, consulted when starting a bridge call in either
/// direction. Backed by a flat "id,callsign" file (the common DMR-ID CSV/TSV
/// shape shipped by DMR networks), loaded once and swappable via `reload`.
/// Optional everywhere it's consulted — a miss falls back to the bridge's
/// own configured ID / a synthesized `DMR{id}` callsign, per §4.7.
pub struct CallsignLookup {
    by_callsign: RwLock<HashMap<String, u32>>,
    by_id: RwLock<HashMap<u32, String>>,
}

impl CallsignLookup {
    pub fn empty() -> Self {
        Self { by_callsign: RwLock::new(HashMap::new()), by_id: RwLock::new(HashMap::new()) }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Self {
        let lookup = Self::empty();
        lookup.reload(path);
        lookup
    }

    /// Re-reads the lookup file, replacing the in-memory tables atomically.
    /// Parse failures on individual lines are skipped and logged; a missing
    /// or unreadable file leaves the existing tables untouched.
    pub fn reload<P: AsRef<Path>>(&self, path: P) {
        let contents = match fs::read_to_string(path.as_ref()) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.as_ref().display(), error = %e, "failed to read DMR-ID lookup file");
                return;
            }
        };

        let mut by_callsign = HashMap::new();
        let mut by_id = HashMap::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, [',', '\t']);
            let (Some(id_str), Some(callsign)) = (parts.next(), parts.next()) else {
                continue;
            };
            let Ok(id) = id_str.trim().parse::<u32>() else {
                continue;
            };
            let callsign = crate::wire::sanitize_callsign(callsign.trim().as_bytes());
            by_callsign.insert(callsign.clone(), id);
            by_id.insert(id, callsign);
        }

        *self.by_callsign.write().expect("lookup lock poisoned") = by_callsign;
        *self.by_id.write().expect("lookup lock poisoned") = by_id;
    }

    pub fn id_for_callsign(&self, callsign: &str) -> Option<u32> {
        self.by_callsign.read().expect("lookup lock poisoned").get(callsign).copied()
    }

    pub fn callsign_for_id(&self, id: u32) -> Option<String> {
        self.by_id.read().expect("lookup lock poisoned").get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_callsign.read().expect("lookup lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CallsignLookup {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_id_callsign_pairs() {
        let mut f = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(f, "# comment\n3120101,KF8S-DAVE\n3120202,w1aw").expect("write");
        let lookup = CallsignLookup::from_file(f.path());
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.id_for_callsign("KF8S"), Some(3120101));
        assert_eq!(lookup.callsign_for_id(3120202), Some("W1AW".to_string()));
    }

    #[test]
    fn missing_file_leaves_tables_empty() {
        let lookup = CallsignLookup::from_file("/nonexistent/path/to/lookup.txt");
        assert!(lookup.is_empty());
    }

    #[test]
    fn reload_replaces_contents_atomically() {
        let mut f = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(f, "1,AAAA").expect("write");
        let lookup = CallsignLookup::from_file(f.path());
        assert_eq!(lookup.len(), 1);

        let mut f2 = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(f2, "2,BBBB\n3,CCCC").expect("write");
        lookup.reload(f2.path());
        assert_eq!(lookup.len(), 2);
        assert!(lookup.id_for_callsign("AAAA").is_none());
    }
}
