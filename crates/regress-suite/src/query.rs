//! Query and suite data model.

use serde::{Deserialize, Serialize};

/// A single regression test case.
///
/// `ids` is only populated during a live run and is never serialized; the
/// baseline keeps counts only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Filter expression sent verbatim to the analyzer. Empty matches everything.
    #[serde(rename = "query")]
    pub text: String,
    /// Number of records streamed back for this query.
    pub number_of_records: u64,
    /// Whether the count is deterministic and must match exactly.
    pub consistent: bool,
    /// Record identifiers collected during a run, in arrival order.
    #[serde(skip)]
    pub ids: Vec<u64>,
}

impl Query {
    pub fn new(text: impl Into<String>, consistent: bool) -> Self {
        Self {
            text: text.into(),
            number_of_records: 0,
            consistent,
            ids: Vec::new(),
        }
    }

    /// Record the identifiers collected by a session and update the count.
    pub fn record_ids(&mut self, ids: Vec<u64>) {
        self.number_of_records = ids.len() as u64;
        self.ids = ids;
    }

    /// Drop the transient identifiers, keeping only the count.
    pub fn strip_ids(&mut self) {
        self.ids = Vec::new();
    }
}

/// An ordered list of query results, index-aligned with the baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    pub queries: Vec<Query>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, query: Query) {
        self.queries.push(query);
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Query> {
        self.queries.iter()
    }

    pub fn first(&self) -> Option<&Query> {
        self.queries.first()
    }

    /// Drop the transient identifiers of every query.
    pub fn strip_ids(&mut self) {
        for query in &mut self.queries {
            query.strip_ids();
        }
    }
}

impl FromIterator<Query> for Suite {
    fn from_iter<T: IntoIterator<Item = Query>>(iter: T) -> Self {
        Self {
            queries: iter.into_iter().collect(),
        }
    }
}
