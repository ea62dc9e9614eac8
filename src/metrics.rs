use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::models::{ApplicationRecord, Status};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusMetrics {
    pub total_applications: usize,
    pub in_progress: usize,
    pub offers: usize,
    pub rejections: usize,
    /// Offers as a percentage of the total, 0 when there are no records.
    pub success_rate: f64,
    /// Rejections as a percentage of the total, 0 when there are no records.
    pub rejection_rate: f64,
}

impl StatusMetrics {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ApplicationRecord>,
    {
        let mut metrics = StatusMetrics::default();
        for record in records {
            metrics.total_applications += 1;
            if record.status.is_in_progress() {
                metrics.in_progress += 1;
            }
            match record.status {
                Status::Offer => metrics.offers += 1,
                Status::Rejected => metrics.rejections += 1,
                _ => {}
            }
        }
        metrics.success_rate = rate(metrics.offers, metrics.total_applications);
        metrics.rejection_rate = rate(metrics.rejections, metrics.total_applications);
        metrics
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Percentage change from `previous` to `current`.
///
/// A zero baseline has no meaningful ratio and yields 0.
pub fn calculate_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricChanges {
    pub total_applications: f64,
    pub in_progress: f64,
    pub success_rate: f64,
    pub rejection_rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub current: StatusMetrics,
    pub last_month: StatusMetrics,
}

impl MetricsSnapshot {
    /// Computes metrics over `records`, comparing against the records dated in
    /// the calendar month before `now` (in `now`'s time zone).
    pub fn compute<Tz: TimeZone>(records: &[ApplicationRecord], now: &DateTime<Tz>) -> Self {
        let window = LastMonthWindow::containing_previous_month_of(now);
        Self {
            current: StatusMetrics::from_records(records),
            last_month: StatusMetrics::from_records(
                records.iter().filter(|r| window.contains(&r.date_applied)),
            ),
        }
    }

    pub fn changes(&self) -> MetricChanges {
        let (cur, prev) = (&self.current, &self.last_month);
        MetricChanges {
            total_applications: calculate_change(
                cur.total_applications as f64,
                prev.total_applications as f64,
            ),
            in_progress: calculate_change(cur.in_progress as f64, prev.in_progress as f64),
            success_rate: calculate_change(cur.success_rate, prev.success_rate),
            rejection_rate: calculate_change(cur.rejection_rate, prev.rejection_rate),
        }
    }
}

/// Half-open interval `[first of previous month, first of current month)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastMonthWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl LastMonthWindow {
    pub fn containing_previous_month_of<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let this_month = first_of_month(today.year(), today.month());
        let prev_month = if today.month() == 1 {
            first_of_month(today.year() - 1, 12)
        } else {
            first_of_month(today.year(), today.month() - 1)
        };

        Self {
            start: local_midnight(&tz, prev_month),
            end: local_midnight(&tz, this_month),
        }
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant < self.end
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    first_valid_instant(date.and_time(NaiveTime::MIN), |naive| {
        tz.from_local_datetime(naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    })
}

// A DST jump can skip `naive`; the gap then ends one hour after the local
// time an hour earlier.
fn first_valid_instant<F>(naive: NaiveDateTime, resolve: F) -> DateTime<Utc>
where
    F: Fn(&NaiveDateTime) -> Option<DateTime<Utc>>,
{
    resolve(&naive)
        .or_else(|| resolve(&(naive - Duration::hours(1))).map(|before| before + Duration::hours(1)))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use proptest::prelude::*;

    fn record(id: &str, status: Status, date_applied: DateTime<Utc>) -> ApplicationRecord {
        ApplicationRecord {
            id: id.into(),
            company: format!("Company {id}"),
            position: "Engineer".into(),
            status,
            date_applied,
            logo: None,
            link: None,
        }
    }

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_collection_is_all_zero() {
        let snapshot = MetricsSnapshot::compute(&[], &utc(2024, 6, 15));
        assert_eq!(snapshot, MetricsSnapshot::default());
        assert_eq!(snapshot.changes(), MetricChanges::default());
    }

    #[test]
    fn mixed_months_scenario() {
        let now = utc(2024, 6, 15);
        let records = vec![
            record("1", Status::Applied, utc(2024, 6, 3)),
            record("2", Status::Offer, utc(2024, 6, 10)),
            record("3", Status::Rejected, utc(2024, 5, 20)),
        ];
        let snapshot = MetricsSnapshot::compute(&records, &now);

        assert_eq!(snapshot.current.total_applications, 3);
        assert_eq!(snapshot.current.in_progress, 1);
        assert!((snapshot.current.success_rate - 33.333).abs() < 0.01);
        assert!((snapshot.current.rejection_rate - 33.333).abs() < 0.01);

        assert_eq!(snapshot.last_month.total_applications, 1);
        assert_eq!(snapshot.last_month.in_progress, 0);
        assert_eq!(snapshot.last_month.success_rate, 0.0);
        assert_eq!(snapshot.last_month.rejection_rate, 100.0);

        let changes = snapshot.changes();
        assert_eq!(changes.total_applications, 200.0);
        assert_eq!(changes.in_progress, 0.0);
        assert_eq!(changes.success_rate, 0.0);
        assert!((changes.rejection_rate + 66.666).abs() < 0.01);
    }

    #[test]
    fn window_wraps_into_previous_year() {
        let window = LastMonthWindow::containing_previous_month_of(&utc(2024, 1, 10));
        assert_eq!(window.start, Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn window_is_half_open() {
        let window = LastMonthWindow::containing_previous_month_of(&utc(2024, 3, 31));
        assert!(window.contains(&Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
        assert!(window.contains(&Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()));
        assert!(!window.contains(&Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
        assert!(!window.contains(&Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn window_follows_the_local_calendar() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        // 2024-03-31T20:00Z is already April 1st in Tokyo.
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 20, 0, 0).unwrap().with_timezone(&tokyo);
        let window = LastMonthWindow::containing_previous_month_of(&now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 2, 29, 15, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 3, 31, 15, 0, 0).unwrap());
    }

    #[test]
    fn skipped_midnight_resolves_to_end_of_gap() {
        // UTC+1 with the midnight hour of March 31st missing.
        let skipped = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap().and_time(NaiveTime::MIN);
        let resolve = |naive: &NaiveDateTime| {
            (*naive != skipped).then(|| Utc.from_utc_datetime(&(*naive - Duration::hours(1))))
        };
        assert_eq!(
            first_valid_instant(skipped, resolve),
            Utc.with_ymd_and_hms(2024, 3, 30, 23, 0, 0).unwrap()
        );

        let regular = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap().and_time(NaiveTime::MIN);
        assert_eq!(
            first_valid_instant(regular, resolve),
            Utc.with_ymd_and_hms(2024, 3, 31, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn change_handles_zero_baseline() {
        assert_eq!(calculate_change(5.0, 0.0), 0.0);
        assert_eq!(calculate_change(0.0, 0.0), 0.0);
        assert_eq!(calculate_change(15.0, 10.0), 50.0);
        assert_eq!(calculate_change(5.0, 10.0), -50.0);
    }

    fn records_strategy() -> impl Strategy<Value = Vec<ApplicationRecord>> {
        let status = prop::sample::select(Status::ALL.to_vec());
        prop::collection::vec((status, 0i64..120), 0..40).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (status, days_ago))| {
                    record(&i.to_string(), status, utc(2024, 6, 15) - chrono::Duration::days(days_ago))
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn rates_stay_within_bounds(records in records_strategy()) {
            let snapshot = MetricsSnapshot::compute(&records, &utc(2024, 6, 15));
            for m in [snapshot.current, snapshot.last_month] {
                prop_assert!((0.0..=100.0).contains(&m.success_rate));
                prop_assert!((0.0..=100.0).contains(&m.rejection_rate));
                prop_assert!(m.success_rate + m.rejection_rate <= 100.0 + 1e-9);
                prop_assert!(m.in_progress + m.offers + m.rejections <= m.total_applications);
            }
            prop_assert!(snapshot.last_month.total_applications <= snapshot.current.total_applications);
        }
    }
}
