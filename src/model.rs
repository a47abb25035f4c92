use url::Url;

/// One electoral reporting unit (municipality or polling district).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub code: String,
    pub name: String,
}

impl Unit {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Unit {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Result page of exactly one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafTarget(pub Url);

/// A unit paired with its result page, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUnit {
    pub unit: Unit,
    pub target: LeafTarget,
}

/// Extracted results of one unit. Party entries keep page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord {
    pub unit: Unit,
    pub registered: u64,
    pub envelopes: u64,
    pub valid_votes: u64,
    pub party_votes: Vec<(String, u64)>,
}

impl VoteRecord {
    pub fn new(unit: Unit, registered: u64, envelopes: u64, valid_votes: u64) -> Self {
        VoteRecord {
            unit,
            registered,
            envelopes,
            valid_votes,
            party_votes: Vec::new(),
        }
    }

    /// Add a party entry; a repeated name keeps its first position and takes the new count.
    pub fn push_party(&mut self, name: String, votes: u64) {
        match self.party_votes.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = votes,
            None => self.party_votes.push((name, votes)),
        }
    }

    pub fn votes_for(&self, party: &str) -> Option<u64> {
        self.party_votes
            .iter()
            .find(|(n, _)| n == party)
            .map(|(_, v)| *v)
    }
}
