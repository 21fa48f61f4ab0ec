//! Calendar-relative day buckets.
//!
//! Items are grouped under a display key computed from their due date
//! relative to the viewer's current calendar day. Key order follows the
//! first occurrence of each key in the input, not chronology.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::payload::AssignmentItem;

/// Items due this many days ahead or more fall back to a full date.
const WEEK_WINDOW_DAYS: i64 = 7;

/// Label of the bucket for items without a usable due date.
pub const UNDATED_LABEL: &str = "No due date";

/// Day bucket an item falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "date", rename_all = "snake_case")]
pub enum DayBucket {
    Today,
    Tomorrow,
    /// Two to six days ahead.
    ThisWeek(NaiveDate),
    /// In the past or a week or more ahead.
    Dated(NaiveDate),
    Undated,
}

impl DayBucket {
    /// Classify `due_at` against the calendar day of `now`, in `now`'s zone.
    pub fn classify<Tz: TimeZone>(due_at: Option<&DateTime<Utc>>, now: &DateTime<Tz>) -> Self {
        let Some(due_at) = due_at else {
            return Self::Undated;
        };
        let due_day = due_at.with_timezone(&now.timezone()).date_naive();
        let today = now.date_naive();

        match (due_day - today).num_days() {
            0 => Self::Today,
            1 => Self::Tomorrow,
            n if (2..WEEK_WINDOW_DAYS).contains(&n) => Self::ThisWeek(due_day),
            _ => Self::Dated(due_day),
        }
    }

    /// Display key, e.g. `Today`, `Friday, Oct 17`, `Oct 17, 2025`.
    pub fn label(&self) -> String {
        match self {
            Self::Today => "Today".to_string(),
            Self::Tomorrow => "Tomorrow".to_string(),
            Self::ThisWeek(day) => day.format("%A, %b %-d").to_string(),
            Self::Dated(day) => format!("{} {}, {}", day.format("%b"), day.day(), day.year()),
            Self::Undated => UNDATED_LABEL.to_string(),
        }
    }
}

impl fmt::Display for DayBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Day key for a single item.
pub fn day_key<Tz: TimeZone>(item: &AssignmentItem, now: &DateTime<Tz>) -> String {
    DayBucket::classify(item.due_at.as_ref(), now).label()
}

/// Items grouped by day key, in first-occurrence order.
pub type GroupedView<'a> = IndexMap<String, Vec<&'a AssignmentItem>>;

/// Group items by calendar-relative day, preserving input order both
/// across keys and within each bucket.
pub fn group_by_day<'a, Tz: TimeZone>(
    assignments: &'a [AssignmentItem],
    now: &DateTime<Tz>,
) -> GroupedView<'a> {
    let mut groups = GroupedView::new();
    for item in assignments {
        groups.entry(day_key(item, now)).or_default().push(item);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use proptest::prelude::*;

    fn clock() -> DateTime<FixedOffset> {
        // Thursday
        DateTime::parse_from_rfc3339("2025-10-16T09:00:00-04:00").unwrap()
    }

    fn due(id: &str, local: &str) -> AssignmentItem {
        let at = DateTime::parse_from_rfc3339(local).unwrap().with_timezone(&Utc);
        AssignmentItem::new(id, format!("Item {id}")).with_due_at(at)
    }

    #[test]
    fn today_and_tomorrow_labels() {
        let now = clock();
        assert_eq!(day_key(&due("1", "2025-10-16T23:59:00-04:00"), &now), "Today");
        assert_eq!(day_key(&due("2", "2025-10-16T00:00:00-04:00"), &now), "Today");
        assert_eq!(day_key(&due("3", "2025-10-17T13:55:00-04:00"), &now), "Tomorrow");
    }

    #[test]
    fn day_boundary_uses_viewer_zone() {
        let now = clock();
        // 03:30 UTC on the 17th is still the 16th in UTC-4.
        let item = AssignmentItem::new("1", "Late").with_due_at(
            DateTime::parse_from_rfc3339("2025-10-17T03:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        assert_eq!(day_key(&item, &now), "Today");
    }

    #[test]
    fn within_week_uses_weekday_name() {
        let now = clock();
        assert_eq!(
            day_key(&due("1", "2025-10-18T10:00:00-04:00"), &now),
            "Saturday, Oct 18"
        );
        assert_eq!(
            day_key(&due("2", "2025-10-22T10:00:00-04:00"), &now),
            "Wednesday, Oct 22"
        );
    }

    #[test]
    fn beyond_week_and_past_use_full_date() {
        let now = clock();
        assert_eq!(day_key(&due("1", "2025-10-23T10:00:00-04:00"), &now), "Oct 23, 2025");
        assert_eq!(day_key(&due("2", "2025-10-15T10:00:00-04:00"), &now), "Oct 15, 2025");
        assert_eq!(day_key(&due("3", "2026-01-05T10:00:00-05:00"), &now), "Jan 5, 2026");
    }

    #[test]
    fn missing_due_date_is_undated() {
        let now = clock();
        assert_eq!(day_key(&AssignmentItem::new("1", "Floating"), &now), UNDATED_LABEL);
    }

    #[test]
    fn groups_follow_first_occurrence() {
        let now = clock();
        let items = vec![
            due("a", "2025-10-17T09:00:00-04:00"),
            due("b", "2025-10-16T18:00:00-04:00"),
            due("c", "2025-10-17T08:00:00-04:00"),
            due("d", "2025-10-16T07:00:00-04:00"),
        ];

        let groups = group_by_day(&items, &now);
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Tomorrow", "Today"]);

        let tomorrow: Vec<&str> = groups["Tomorrow"].iter().map(|i| i.id.as_str()).collect();
        assert_eq!(tomorrow, vec!["a", "c"]);
        let today: Vec<&str> = groups["Today"].iter().map(|i| i.id.as_str()).collect();
        assert_eq!(today, vec!["b", "d"]);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_by_day(&[], &clock()).is_empty());
    }

    proptest! {
        #[test]
        fn grouping_preserves_order(offsets in proptest::collection::vec(-3i64..12, 0..40)) {
            let now = clock();
            let items: Vec<AssignmentItem> = offsets
                .iter()
                .enumerate()
                .map(|(idx, days)| {
                    AssignmentItem::new(idx.to_string(), "x")
                        .with_due_at(now.with_timezone(&Utc) + Duration::days(*days))
                })
                .collect();

            let groups = group_by_day(&items, &now);

            // Every item lands in exactly one bucket.
            let total: usize = groups.values().map(Vec::len).sum();
            prop_assert_eq!(total, items.len());

            // Keys appear in the order their first member appears.
            let mut first_seen: Vec<String> = Vec::new();
            for item in &items {
                let key = day_key(item, &now);
                if !first_seen.contains(&key) {
                    first_seen.push(key);
                }
            }
            let keys: Vec<String> = groups.keys().cloned().collect();
            prop_assert_eq!(keys, first_seen);

            // Within a bucket, input order is kept.
            for members in groups.values() {
                let positions: Vec<usize> =
                    members.iter().map(|i| i.id.parse::<usize>().unwrap()).collect();
                prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
