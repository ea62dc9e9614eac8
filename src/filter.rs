use std::collections::HashMap;

use crate::models::{ApplicationRecord, Status, StatusFilter};

/// Which record fields a free-text query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Applications list: company or position.
    #[default]
    CompanyOrPosition,
    /// Dashboard search: company, position or status name.
    IncludingStatus,
}

/// Returns the records matching `status` and `query`, in their original order.
///
/// The query is matched as typed, lower-cased. An empty query matches
/// everything; the dashboard scope also treats whitespace-only as empty.
pub fn filter_records(
    records: &[ApplicationRecord],
    status: StatusFilter,
    query: &str,
    scope: SearchScope,
) -> Vec<ApplicationRecord> {
    let no_text_filter = match scope {
        SearchScope::CompanyOrPosition => query.is_empty(),
        SearchScope::IncludingStatus => query.trim().is_empty(),
    };
    let query = query.to_lowercase();

    records
        .iter()
        .filter(|record| status.matches(record.status))
        .filter(|record| no_text_filter || matches_query(record, &query, scope))
        .cloned()
        .collect()
}

fn matches_query(record: &ApplicationRecord, query: &str, scope: SearchScope) -> bool {
    if record.company.to_lowercase().contains(query)
        || record.position.to_lowercase().contains(query)
    {
        return true;
    }
    scope == SearchScope::IncludingStatus && record.status.as_str().contains(query)
}

/// Per-filter chip counts over the unfiltered collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub all: usize,
    by_status: HashMap<Status, usize>,
}

impl StatusCounts {
    pub fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Only(status) => self.by_status.get(&status).copied().unwrap_or(0),
        }
    }
}

pub fn status_counts(records: &[ApplicationRecord]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for record in records {
        *counts.by_status.entry(record.status).or_insert(0) += 1;
        counts.all += 1;
    }
    counts
}
