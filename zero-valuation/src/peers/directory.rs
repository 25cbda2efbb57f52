//! Static sector peer groups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A peer company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerEntry {
    pub symbol: String,
    pub name: String,
}

impl PeerEntry {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// Sector name to peer list lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerDirectory {
    groups: BTreeMap<String, Vec<PeerEntry>>,
}

impl Default for PeerDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PeerDirectory {
    /// Large-cap peer groups for the most common sectors.
    pub fn builtin() -> Self {
        let table: [(&str, &[(&str, &str)]); 3] = [
            (
                "Technology",
                &[
                    ("AAPL", "Apple Inc."),
                    ("MSFT", "Microsoft Corporation"),
                    ("GOOGL", "Alphabet Inc."),
                    ("AMZN", "Amazon.com Inc."),
                    ("META", "Meta Platforms Inc."),
                ],
            ),
            (
                "Healthcare",
                &[
                    ("JNJ", "Johnson & Johnson"),
                    ("PFE", "Pfizer Inc."),
                    ("UNH", "UnitedHealth Group Inc."),
                    ("ABBV", "AbbVie Inc."),
                    ("TMO", "Thermo Fisher Scientific Inc."),
                ],
            ),
            (
                "Financial Services",
                &[
                    ("JPM", "JPMorgan Chase & Co."),
                    ("BAC", "Bank of America Corp."),
                    ("WFC", "Wells Fargo & Co."),
                    ("GS", "Goldman Sachs Group Inc."),
                    ("MS", "Morgan Stanley"),
                ],
            ),
        ];

        let groups = table
            .iter()
            .map(|(sector, peers)| {
                let entries = peers
                    .iter()
                    .map(|(symbol, name)| PeerEntry::new(*symbol, *name))
                    .collect();
                (sector.to_string(), entries)
            })
            .collect();

        Self { groups }
    }

    /// Replace or add sector groups.
    pub fn with_groups<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<PeerEntry>)>,
    {
        self.groups.extend(groups);
        self
    }

    /// Peers for a sector. Unknown sectors have no peers.
    pub fn peers_for(&self, sector: &str) -> &[PeerEntry] {
        self.groups.get(sector).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Peers for a sector, leaving out the subject itself.
    pub fn peers_excluding(&self, sector: &str, symbol: &str) -> Vec<PeerEntry> {
        self.peers_for(sector)
            .iter()
            .filter(|peer| !peer.symbol.eq_ignore_ascii_case(symbol))
            .cloned()
            .collect()
    }

    /// Known sector names.
    pub fn sectors(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sectors() {
        let dir = PeerDirectory::builtin();
        assert_eq!(
            dir.sectors().collect::<Vec<_>>(),
            vec!["Financial Services", "Healthcare", "Technology"]
        );
        assert_eq!(dir.peers_for("Technology").len(), 5);
        assert!(dir.peers_for("Utilities").is_empty());
    }

    #[test]
    fn test_subject_excluded() {
        let dir = PeerDirectory::builtin();
        let peers = dir.peers_excluding("Technology", "msft");
        assert_eq!(peers.len(), 4);
        assert!(peers.iter().all(|p| p.symbol != "MSFT"));
    }

    #[test]
    fn test_override_group() {
        let dir = PeerDirectory::builtin().with_groups([(
            "Technology".to_string(),
            vec![PeerEntry::new("NVDA", "NVIDIA Corporation")],
        )]);
        assert_eq!(dir.peers_for("Technology"), &[PeerEntry::new("NVDA", "NVIDIA Corporation")]);
        assert_eq!(dir.peers_for("Healthcare").len(), 5);
    }
}
