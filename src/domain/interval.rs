use crate::domain::models::TimeEntry;
use chrono::{DateTime, Utc};

/// Elapsed milliseconds between two instants, clamped so that a missing
/// endpoint or a reversed range yields zero. Malformed or partially written
/// intervals must never push a negative value into an aggregate total.
pub fn duration_ms(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) => (end - start).num_milliseconds().max(0),
        _ => 0,
    }
}

pub fn entry_duration_ms(entry: &TimeEntry) -> i64 {
    duration_ms(Some(entry.start_time), entry.end_time)
}

pub fn sum_durations_ms<'a>(entries: impl IntoIterator<Item = &'a TimeEntry>) -> i64 {
    entries.into_iter().map(entry_duration_ms).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn entry_with_range(id: &str, start: &str, end: Option<&str>) -> TimeEntry {
        TimeEntry {
            id: id.to_string(),
            project_id: "prj-1".to_string(),
            task_id: None,
            user_id: "usr-1".to_string(),
            start_time: fixed_time(start),
            end_time: end.map(fixed_time),
            description: None,
            created_at: fixed_time(start),
        }
    }

    #[test]
    fn duration_of_valid_range() {
        let start = fixed_time("2026-02-16T09:00:00Z");
        let end = fixed_time("2026-02-16T09:00:01Z");
        assert_eq!(duration_ms(Some(start), Some(end)), 1_000);
    }

    #[test]
    fn duration_clamps_reversed_range_to_zero() {
        let start = fixed_time("2026-02-16T10:00:00Z");
        let end = fixed_time("2026-02-16T09:00:00Z");
        assert_eq!(duration_ms(Some(start), Some(end)), 0);
    }

    #[test]
    fn duration_of_missing_endpoint_is_zero() {
        let instant = fixed_time("2026-02-16T09:00:00Z");
        assert_eq!(duration_ms(None, Some(instant)), 0);
        assert_eq!(duration_ms(Some(instant), None), 0);
        assert_eq!(duration_ms(None, None), 0);
    }

    #[test]
    fn sum_of_empty_collection_is_zero() {
        assert_eq!(sum_durations_ms([]), 0);
    }

    #[test]
    fn sum_skips_open_intervals() {
        let entries = vec![
            entry_with_range("ent-1", "2026-02-16T09:00:00Z", Some("2026-02-16T09:10:00Z")),
            entry_with_range("ent-2", "2026-02-16T10:00:00Z", None),
        ];
        assert_eq!(sum_durations_ms(&entries), 10 * 60 * 1_000);
    }

    proptest! {
        #[test]
        fn duration_is_never_negative(start_secs in 0i64..4_000_000_000, offset in -86_400i64..86_400) {
            let start = DateTime::<Utc>::from_timestamp(start_secs, 0).expect("valid timestamp");
            let end = DateTime::<Utc>::from_timestamp(start_secs + offset, 0).expect("valid timestamp");
            prop_assert!(duration_ms(Some(start), Some(end)) >= 0);
        }

        #[test]
        fn duration_matches_difference_for_ordered_ranges(start_secs in 0i64..4_000_000_000, span in 0i64..864_000) {
            let start = DateTime::<Utc>::from_timestamp(start_secs, 0).expect("valid timestamp");
            let end = DateTime::<Utc>::from_timestamp(start_secs + span, 0).expect("valid timestamp");
            prop_assert_eq!(duration_ms(Some(start), Some(end)), span * 1_000);
        }

        #[test]
        fn sum_is_order_independent(spans in proptest::collection::vec(0i64..36_000, 0..24) ) {
            let base = 1_700_000_000i64;
            let entries: Vec<TimeEntry> = spans
                .iter()
                .enumerate()
                .map(|(index, span)| {
                    let start = DateTime::<Utc>::from_timestamp(base + index as i64 * 100_000, 0)
                        .expect("valid timestamp");
                    let end = DateTime::<Utc>::from_timestamp(base + index as i64 * 100_000 + span, 0)
                        .expect("valid timestamp");
                    TimeEntry {
                        id: format!("ent-{index}"),
                        project_id: "prj-1".to_string(),
                        task_id: None,
                        user_id: "usr-1".to_string(),
                        start_time: start,
                        end_time: Some(end),
                        description: None,
                        created_at: start,
                    }
                })
                .collect();

            let mut reversed = entries.clone();
            reversed.reverse();
            prop_assert_eq!(sum_durations_ms(&entries), sum_durations_ms(&reversed));
        }
    }
}
