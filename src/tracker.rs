use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use tracing::info;

use crate::analytics::{self, Activity, MonthlyActivity};
use crate::filter::{self, SearchScope, StatusCounts};
use crate::metrics::{MetricChanges, MetricsSnapshot};
use crate::models::{ApplicationInput, ApplicationRecord, Status, StatusFilter};
use crate::store::{RecordStore, StoreError};

/// Number of records shown in the dashboard's recent list.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("application '{0}' not found")]
    NotFound(String),
    #[error("refusing to seed: {0} application(s) already tracked")]
    NotEmpty(usize),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the record collection and is the only writer to its store.
pub struct Tracker<S: RecordStore> {
    store: S,
    records: Vec<ApplicationRecord>,
}

#[derive(Debug, Clone)]
pub struct ApplicationsView {
    pub records: Vec<ApplicationRecord>,
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub records: Vec<ApplicationRecord>,
    pub metrics: MetricsSnapshot,
    pub changes: MetricChanges,
    pub recent: Vec<ApplicationRecord>,
    pub breakdown: Vec<(Status, usize)>,
    pub interviews: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsView {
    pub metrics: MetricsSnapshot,
    pub changes: MetricChanges,
    pub monthly: Vec<MonthlyActivity>,
    pub breakdown: Vec<(Status, usize)>,
}

impl<S: RecordStore> Tracker<S> {
    pub fn load(store: S) -> Self {
        let records = store.load();
        Self { store, records }
    }

    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&ApplicationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Adds a new record at the front of the collection.
    pub fn add<Tz: TimeZone>(
        &mut self,
        input: ApplicationInput,
        now: &DateTime<Tz>,
    ) -> Result<&ApplicationRecord, TrackerError> {
        let id = self.next_id(now.timestamp_millis());
        let record = ApplicationRecord {
            id,
            company: input.company().to_string(),
            position: input.position().to_string(),
            status: input.status(),
            date_applied: now.with_timezone(&Utc),
            logo: None,
            link: input.link().map(str::to_string),
        };
        info!(id = %record.id, company = %record.company, "adding application");

        self.records.insert(0, record);
        self.persist()?;
        Ok(&self.records[0])
    }

    /// Overwrites company, position, status and link.
    ///
    /// `date_applied` is reset to `now` on every edit.
    pub fn update<Tz: TimeZone>(
        &mut self,
        id: &str,
        input: ApplicationInput,
        now: &DateTime<Tz>,
    ) -> Result<&ApplicationRecord, TrackerError> {
        let idx = self.position_of(id)?;
        let record = &mut self.records[idx];
        record.company = input.company().to_string();
        record.position = input.position().to_string();
        record.status = input.status();
        record.link = input.link().map(str::to_string);
        record.date_applied = now.with_timezone(&Utc);
        info!(id, status = %record.status, "updated application");

        self.persist()?;
        Ok(&self.records[idx])
    }

    pub fn remove(&mut self, id: &str) -> Result<ApplicationRecord, TrackerError> {
        let idx = self.position_of(id)?;
        let removed = self.records.remove(idx);
        info!(id, company = %removed.company, "deleted application");

        self.persist()?;
        Ok(removed)
    }

    /// Fills an empty tracker with a handful of sample applications.
    pub fn seed_demo<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Result<usize, TrackerError> {
        if !self.records.is_empty() {
            return Err(TrackerError::NotEmpty(self.records.len()));
        }
        let now = now.with_timezone(&Utc);
        self.records = demo_records(now);
        self.persist()?;
        info!(count = self.records.len(), "seeded demo applications");
        Ok(self.records.len())
    }

    pub fn applications(&self, status: StatusFilter, query: &str) -> ApplicationsView {
        ApplicationsView {
            records: filter::filter_records(&self.records, status, query, SearchScope::CompanyOrPosition),
            counts: filter::status_counts(&self.records),
        }
    }

    pub fn dashboard<Tz: TimeZone>(&self, query: &str, now: &DateTime<Tz>) -> DashboardView {
        let records = filter::filter_records(
            &self.records,
            StatusFilter::All,
            query,
            SearchScope::IncludingStatus,
        );
        let metrics = MetricsSnapshot::compute(&records, now);

        DashboardView {
            changes: metrics.changes(),
            metrics,
            recent: analytics::recent(&records, RECENT_LIMIT),
            breakdown: analytics::status_breakdown(&records),
            interviews: analytics::upcoming_interviews(&records),
            records,
        }
    }

    pub fn analytics<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> AnalyticsView {
        let metrics = MetricsSnapshot::compute(&self.records, now);
        AnalyticsView {
            changes: metrics.changes(),
            metrics,
            monthly: analytics::monthly_activity(&self.records, &now.timezone()),
            breakdown: analytics::status_breakdown(&self.records),
        }
    }

    fn position_of(&self, id: &str) -> Result<usize, TrackerError> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))
    }

    // Millisecond timestamps collide when records are added in a burst.
    fn next_id(&self, millis: i64) -> String {
        let mut candidate = millis;
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn persist(&self) -> Result<(), TrackerError> {
        self.store.save(&self.records)?;
        Ok(())
    }
}

fn demo_records(now: DateTime<Utc>) -> Vec<ApplicationRecord> {
    let rows: [(&str, &str, Status, i64, Option<&str>); 6] = [
        ("Acme Inc", "Frontend Developer", Status::Interviewing, 2, Some("https://example.com")),
        ("TechCorp", "Full Stack Engineer", Status::Applied, 12, None),
        ("Startup Co", "React Developer", Status::Offer, 8, Some("https://example.com")),
        ("BigTech", "Software Engineer", Status::Saved, 1, None),
        ("Digital Agency", "UI Developer", Status::Rejected, 25, None),
        ("Fintech Inc", "JavaScript Developer", Status::Applied, 35, None),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (company, position, status, days_ago, link))| ApplicationRecord {
            id: (i + 1).to_string(),
            company: company.to_string(),
            position: position.to_string(),
            status,
            date_applied: now - Duration::days(days_ago),
            logo: None,
            link: link.map(str::to_string),
        })
        .collect()
}
