use std::collections::HashSet;

use crate::model::{Unit, VoteRecord};

/// Columns that precede the party columns, in output order.
pub const FIXED_COLUMNS: [&str; 5] = ["code", "name", "registered", "envelopes", "valid"];

/// A record projected onto the dataset's party columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledRow {
    pub unit: Unit,
    pub registered: u64,
    pub envelopes: u64,
    pub valid_votes: u64,
    /// One cell per party column; `None` means the party was not on this page.
    pub parties: Vec<Option<u64>>,
}

impl ReconciledRow {
    /// Cells as text, fixed columns first. Absent parties are empty strings.
    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.unit.code.clone(),
            self.unit.name.clone(),
            self.registered.to_string(),
            self.envelopes.to_string(),
            self.valid_votes.to_string(),
        ];
        cells.extend(
            self.parties
                .iter()
                .map(|v| v.map(|n| n.to_string()).unwrap_or_default()),
        );
        cells
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub parties: Vec<String>,
    pub rows: Vec<ReconciledRow>,
}

impl Dataset {
    pub fn columns(&self) -> Vec<String> {
        FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.parties.iter().cloned())
            .collect()
    }

    /// Back to records, keeping only the party cells that are present.
    #[cfg(test)]
    pub fn to_records(&self) -> Vec<VoteRecord> {
        self.rows
            .iter()
            .map(|row| VoteRecord {
                unit: row.unit.clone(),
                registered: row.registered,
                envelopes: row.envelopes,
                valid_votes: row.valid_votes,
                party_votes: self
                    .parties
                    .iter()
                    .zip(&row.parties)
                    .filter_map(|(name, v)| v.map(|v| (name.clone(), v)))
                    .collect(),
            })
            .collect()
    }
}

/// Distinct party names in first-seen order: by record, then by entry.
pub fn party_order(records: &[VoteRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .flat_map(|r| r.party_votes.iter().map(|(name, _)| name.as_str()))
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

pub fn reconcile(records: &[VoteRecord]) -> Dataset {
    let parties = party_order(records);
    let rows = records
        .iter()
        .map(|r| ReconciledRow {
            unit: r.unit.clone(),
            registered: r.registered,
            envelopes: r.envelopes,
            valid_votes: r.valid_votes,
            parties: parties.iter().map(|p| r.votes_for(p)).collect(),
        })
        .collect();
    Dataset { parties, rows }
}
