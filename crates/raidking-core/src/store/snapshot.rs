use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub data: T,
    pub saved_at: DateTime<Utc>,
}

impl<T> Snapshot<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            saved_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.saved_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                // Round up: 1d 12h+ becomes 2d
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn aged(minutes: i64) -> Snapshot<()> {
        let mut snapshot = Snapshot::new(());
        snapshot.saved_at = Utc::now() - Duration::minutes(minutes);
        snapshot
    }

    #[test]
    fn test_age_display_just_now() {
        assert_eq!(Snapshot::new(vec![1, 2, 3]).age_display(), "just now");
    }

    #[test]
    fn test_age_display_future_timestamp() {
        assert_eq!(aged(-30).age_display(), "just now");
    }

    #[test]
    fn test_age_display_rounding() {
        assert_eq!(aged(5).age_display(), "5m ago");
        assert_eq!(aged(75).age_display(), "1h ago");
        assert_eq!(aged(95).age_display(), "2h ago");
        assert_eq!(aged(1440 + 60).age_display(), "1d ago");
        assert_eq!(aged(1440 + 13 * 60).age_display(), "2d ago");
    }

    #[test]
    fn test_age_minutes() {
        assert!(Snapshot::new(()).age_minutes() <= 1);
        assert_eq!(aged(10).age_minutes(), 10);
    }
}
