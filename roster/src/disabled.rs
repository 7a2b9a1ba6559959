//! Persisted deny-list of voters that can never succeed.
//!
//! The on-disk format is a flat text file, one `<voter> <reason>` per line.
//! Entries are only ever appended; re-enabling a voter means editing the file
//! by hand.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::RosterError;

/// A voter that has been permanently excluded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisabledVoter {
    pub name: String,
    pub reason: String,
}

/// Append-only, read-through store of disabled voters.
///
/// Implementations must not cache: every call reflects the persisted state,
/// including entries appended by someone else.
pub trait DisabledVoterStore: Send + Sync {
    /// Every disabled voter, in the order they were recorded.
    fn disabled(&self) -> Result<Vec<DisabledVoter>, RosterError>;

    /// Record `name` as disabled. Returns `false` if it already was.
    fn disable(&self, name: &str, reason: &str) -> Result<bool, RosterError>;

    fn is_disabled(&self, name: &str) -> Result<bool, RosterError> {
        Ok(self.disabled()?.iter().any(|d| d.name == name))
    }
}

/// [`DisabledVoterStore`] backed by a text file.
pub struct FileDisabledVoterStore {
    path: PathBuf,
    /// Serializes check-then-append within this process.
    write_lock: Mutex<()>,
}

impl FileDisabledVoterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> RosterError {
        RosterError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Parse one persisted line. Blank lines and `#` comments yield `None`.
fn parse_line(line: &str) -> Option<DisabledVoter> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let reason = rest.strip_prefix('#').unwrap_or(rest).trim();
    Some(DisabledVoter {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

impl DisabledVoterStore for FileDisabledVoterStore {
    fn disabled(&self) -> Result<Vec<DisabledVoter>, RosterError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.lines().filter_map(parse_line).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn disable(&self, name: &str, reason: &str) -> Result<bool, RosterError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.is_disabled(name)? {
            return Ok(false);
        }

        let reason = reason.replace(['\n', '\r'], " ");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        writeln!(file, "{name} {reason}").map_err(|e| self.io_error(e))?;

        tracing::warn!(voter = name, reason = %reason, "voter permanently disabled");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileDisabledVoterStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDisabledVoterStore::new(dir.path().join("disabled.txt"));
        (dir, store)
    }

    #[test]
    fn missing_file_means_nobody_is_disabled() {
        let (_dir, store) = store();
        assert!(store.disabled().unwrap().is_empty());
        assert!(!store.is_disabled("alice").unwrap());
    }

    #[test]
    fn disable_persists_name_and_reason() {
        let (_dir, store) = store();
        assert!(store.disable("alice", "missing required posting authority").unwrap());

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "alice missing required posting authority\n");
        assert_eq!(
            store.disabled().unwrap(),
            vec![DisabledVoter {
                name: "alice".into(),
                reason: "missing required posting authority".into(),
            }]
        );
    }

    #[test]
    fn disabling_twice_appends_once() {
        let (_dir, store) = store();
        assert!(store.disable("alice", "first").unwrap());
        assert!(!store.disable("alice", "second").unwrap());
        assert_eq!(store.disabled().unwrap().len(), 1);
    }

    #[test]
    fn reads_external_appends_without_caching() {
        let (_dir, store) = store();
        store.disable("alice", "bad key").unwrap();

        let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
        writeln!(file, "bob # edited by operator").unwrap();

        let disabled = store.disabled().unwrap();
        assert_eq!(disabled.len(), 2);
        assert_eq!(disabled[1].name, "bob");
        assert_eq!(disabled[1].reason, "edited by operator");
    }

    #[test]
    fn parse_line_handles_bare_names_and_comments() {
        assert_eq!(parse_line("# header"), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(
            parse_line("carol"),
            Some(DisabledVoter {
                name: "carol".into(),
                reason: String::new(),
            })
        );
    }
}
