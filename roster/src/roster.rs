//! The set of accounts this process votes with.

use std::path::Path;

use vanguard_types::Credential;

use crate::{DisabledVoterStore, RosterError};

/// A controlled account.
#[derive(Clone, Debug)]
pub struct Voter {
    pub name: String,
    pub credential: Credential,
}

/// All configured voters, in configuration order.
#[derive(Clone, Debug, Default)]
pub struct VoterRoster {
    voters: Vec<Voter>,
}

impl VoterRoster {
    pub fn new(voters: Vec<Voter>) -> Self {
        Self { voters }
    }

    /// Parse `name credential` pairs, one per entry.
    ///
    /// Blank entries and `#` comments are skipped. A name listed twice keeps
    /// its last credential.
    pub fn parse<'a>(entries: impl IntoIterator<Item = &'a str>) -> Result<Self, RosterError> {
        let mut voters: Vec<Voter> = Vec::new();
        for (i, entry) in entries.into_iter().enumerate() {
            let entry = entry.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }
            let mut parts = entry.split_whitespace();
            let name = parts.next().unwrap_or_default();
            let credential = parts
                .next()
                .ok_or(RosterError::MissingCredential { line: i + 1 })?;

            voters.retain(|v| v.name != name);
            voters.push(Voter {
                name: name.to_string(),
                credential: Credential::new(credential),
            });
        }
        Ok(Self { voters })
    }

    /// Load a roster file with one `name credential` pair per line.
    pub fn from_file(path: &Path) -> Result<Self, RosterError> {
        let content = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(content.lines())
    }

    pub fn len(&self) -> usize {
        self.voters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.voters.iter().map(|v| v.name.as_str())
    }

    pub fn credential(&self, name: &str) -> Option<&Credential> {
        self.voters
            .iter()
            .find(|v| v.name == name)
            .map(|v| &v.credential)
    }

    /// Roster names minus everything currently in the disabled store.
    pub fn active_voters(&self, store: &dyn DisabledVoterStore) -> Result<Vec<String>, RosterError> {
        let disabled = store.disabled()?;
        Ok(self
            .names()
            .filter(|name| !disabled.iter().any(|d| d.name == *name))
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileDisabledVoterStore;

    #[test]
    fn parses_pairs_and_skips_comments() {
        let roster = VoterRoster::parse(["alice 5Jaaa", "", "# spare", "bob 5Jbbb"]).unwrap();
        assert_eq!(roster.names().collect::<Vec<_>>(), vec!["alice", "bob"]);
        assert_eq!(roster.credential("bob").unwrap().expose(), "5Jbbb");
    }

    #[test]
    fn duplicate_names_keep_last_credential() {
        let roster = VoterRoster::parse(["alice 5Jold", "alice 5Jnew"]).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.credential("alice").unwrap().expose(), "5Jnew");
    }

    #[test]
    fn missing_credential_is_an_error() {
        let err = VoterRoster::parse(["alice 5Jaaa", "bob"]).unwrap_err();
        assert!(matches!(err, RosterError::MissingCredential { line: 2 }));
    }

    #[test]
    fn from_file_reads_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voters.txt");
        std::fs::write(&path, "alice 5Jaaa\nbob 5Jbbb\n").unwrap();
        let roster = VoterRoster::from_file(&path).unwrap();
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn active_voters_excludes_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDisabledVoterStore::new(dir.path().join("disabled.txt"));
        let roster = VoterRoster::parse(["alice 5Jaaa", "bob 5Jbbb"]).unwrap();

        assert_eq!(roster.active_voters(&store).unwrap(), vec!["alice", "bob"]);
        store.disable("alice", "missing required posting authority").unwrap();
        assert_eq!(roster.active_voters(&store).unwrap(), vec!["bob"]);
    }
}
