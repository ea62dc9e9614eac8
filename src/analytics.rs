use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;

use crate::models::{ApplicationRecord, Status};

/// Count per status, in `Status::ALL` order.
pub fn status_breakdown(records: &[ApplicationRecord]) -> Vec<(Status, usize)> {
    Status::ALL
        .into_iter()
        .map(|status| (status, records.iter().filter(|r| r.status == status).count()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyActivity {
    pub year: i32,
    pub month: u32,
    pub applications: usize,
    /// Records from this month currently in the interviewing stage.
    pub interviews: usize,
}

impl MonthlyActivity {
    pub fn label(&self) -> String {
        let month = chrono::Month::try_from(self.month as u8)
            .map(|m| m.name()[..3].to_string())
            .unwrap_or_else(|_| self.month.to_string());
        format!("{} {}", month, self.year)
    }
}

/// Applications grouped by calendar month in `tz`, oldest month first.
pub fn monthly_activity<Tz: TimeZone>(records: &[ApplicationRecord], tz: &Tz) -> Vec<MonthlyActivity> {
    let mut months: Vec<MonthlyActivity> = Vec::new();

    for record in records {
        let local = record.date_applied.with_timezone(tz);
        let (year, month) = (local.year(), local.month());
        let interviewing = usize::from(record.status == Status::Interviewing);

        match months.iter_mut().find(|m| m.year == year && m.month == month) {
            Some(existing) => {
                existing.applications += 1;
                existing.interviews += interviewing;
            }
            None => months.push(MonthlyActivity {
                year,
                month,
                applications: 1,
                interviews: interviewing,
            }),
        }
    }

    months.sort_by_key(|m| (m.year, m.month));
    months
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub company: String,
    pub position: String,
}

/// Timeline entries for every record in the interviewing stage.
pub fn upcoming_interviews(records: &[ApplicationRecord]) -> Vec<Activity> {
    records
        .iter()
        .filter(|r| r.status == Status::Interviewing)
        .map(|r| Activity {
            id: r.id.clone(),
            title: "Interview Scheduled".to_string(),
            description: format!("Interview for {} position", r.position),
            date: r.date_applied,
            company: r.company.clone(),
            position: r.position.clone(),
        })
        .collect()
}

pub fn recent(records: &[ApplicationRecord], limit: usize) -> Vec<ApplicationRecord> {
    records.iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn record(id: &str, status: Status, date_applied: DateTime<Utc>) -> ApplicationRecord {
        ApplicationRecord {
            id: id.into(),
            company: format!("Company {id}"),
            position: "Frontend Developer".into(),
            status,
            date_applied,
            logo: None,
            link: None,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn breakdown_covers_every_status() {
        let records = vec![
            record("1", Status::Applied, at(2024, 1, 1, 0)),
            record("2", Status::Applied, at(2024, 1, 2, 0)),
            record("3", Status::Saved, at(2024, 1, 3, 0)),
        ];
        let breakdown = status_breakdown(&records);
        assert_eq!(breakdown.len(), 5);
        assert_eq!(breakdown[0], (Status::Applied, 2));
        assert_eq!(breakdown[2], (Status::Offer, 0));
        assert_eq!(breakdown[4], (Status::Saved, 1));
    }

    #[test]
    fn months_are_separated_by_year_and_sorted() {
        let records = vec![
            record("1", Status::Interviewing, at(2024, 4, 5, 0)),
            record("2", Status::Applied, at(2023, 4, 20, 0)),
            record("3", Status::Interviewing, at(2024, 4, 28, 0)),
            record("4", Status::Offer, at(2024, 3, 1, 0)),
        ];
        let months = monthly_activity(&records, &Utc);

        assert_eq!(months.len(), 3);
        assert_eq!((months[0].year, months[0].month, months[0].applications), (2023, 4, 1));
        assert_eq!((months[1].year, months[1].month, months[1].applications), (2024, 3, 1));
        assert_eq!(months[2].applications, 2);
        assert_eq!(months[2].interviews, 2);
        assert_eq!(months[2].label(), "Apr 2024");
    }

    #[test]
    fn months_use_the_given_time_zone() {
        let records = vec![record("1", Status::Applied, at(2024, 4, 30, 22))];
        let plus_three = FixedOffset::east_opt(3 * 3600).unwrap();
        let months = monthly_activity(&records, &plus_three);
        assert_eq!(months[0].month, 5);
    }

    #[test]
    fn interviews_become_activities() {
        let records = vec![
            record("1", Status::Interviewing, at(2024, 4, 5, 10)),
            record("2", Status::Applied, at(2024, 4, 6, 10)),
        ];
        let activities = upcoming_interviews(&records);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].title, "Interview Scheduled");
        assert_eq!(activities[0].description, "Interview for Frontend Developer position");
        assert_eq!(activities[0].company, "Company 1");
    }

    #[test]
    fn recent_takes_leading_records() {
        let records: Vec<_> = (0..8)
            .map(|i| record(&i.to_string(), Status::Saved, at(2024, 1, 1, 0)))
            .collect();
        let top = recent(&records, 5);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].id, "0");
        assert_eq!(recent(&records[..2], 5).len(), 2);
    }
}
