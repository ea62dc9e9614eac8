use chrono::{DateTime, Utc};

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Rough distance between `then` and `now`, e.g. "3 days ago" or "in 2 hours".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then);
    let future = delta.num_seconds() < 0;
    let delta = delta.abs();

    let minutes = delta.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    let hours = delta.num_hours();
    let days = delta.num_days();

    let distance = if hours < 1 {
        plural(minutes, "minute")
    } else if days < 1 {
        format!("about {}", plural(hours, "hour"))
    } else if days < 30 {
        plural(days, "day")
    } else if days < 365 {
        format!("about {}", plural(days / 30, "month"))
    } else {
        format!("over {}", plural(days / 365, "year"))
    };

    if future {
        format!("in {}", distance)
    } else {
        format!("{} ago", distance)
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Signed whole-percent change, as shown under each stat.
pub fn format_change(change: f64) -> String {
    let rounded = change.round();
    if rounded > 0.0 {
        format!("+{:.0}% from last month", rounded)
    } else if rounded < 0.0 {
        format!("{:.0}% from last month", rounded)
    } else {
        "0% from last month".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Société Générale", 8), "Socié...");
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(relative_time(now, now), "just now");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(relative_time(now - Duration::hours(1), now), "about 1 hour ago");
        assert_eq!(relative_time(now - Duration::days(3), now), "3 days ago");
        assert_eq!(relative_time(now - Duration::days(65), now), "about 2 months ago");
        assert_eq!(relative_time(now - Duration::days(800), now), "over 2 years ago");
        assert_eq!(relative_time(now + Duration::days(1), now), "in 1 day");
    }

    #[test]
    fn change_carries_sign() {
        assert_eq!(format_change(200.0), "+200% from last month");
        assert_eq!(format_change(-66.7), "-67% from last month");
        assert_eq!(format_change(0.0), "0% from last month");
    }

    #[test]
    fn changes_rounding_to_zero_have_no_sign() {
        assert_eq!(format_change(-0.4), "0% from last month");
        assert_eq!(format_change(0.4), "0% from last month");
        assert_eq!(format_change(-0.5), "-1% from last month");
    }
}
