use chrono::{DateTime, FixedOffset};

/// Result of checking `published` sort keys against their parsed instants.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SortKeyAudit {
    /// Number of keys inspected.
    pub checked: usize,
    /// Empty keys. They sort after every timestamp.
    pub missing: usize,
    /// Non-empty keys that are not RFC 3339 timestamps.
    pub unparseable: Vec<String>,
    /// Neighbouring keys (in the given order) that are chronologically ascending.
    pub inversions: Vec<(String, String)>,
}

impl SortKeyAudit {
    /// True when string order and chronological order agree for every key.
    pub fn is_clean(&self) -> bool {
        self.missing == 0 && self.unparseable.is_empty() && self.inversions.is_empty()
    }
}

/// Audits keys that are expected to be in descending order.
///
/// String ordering of ISO 8601 timestamps only matches chronological
/// ordering when they share precision and UTC offset. This reports where
/// that assumption breaks; it never reorders anything.
///
/// Unparseable and empty keys are skipped when looking for inversions, so
/// each inversion compares the closest parseable neighbours.
pub fn audit_sort_keys<'a, I>(keys: I) -> SortKeyAudit
where
    I: IntoIterator<Item = &'a str>,
{
    let mut audit = SortKeyAudit::default();
    let mut previous: Option<(&str, DateTime<FixedOffset>)> = None;

    for key in keys {
        audit.checked += 1;
        if key.is_empty() {
            audit.missing += 1;
            continue;
        }
        let Ok(instant) = DateTime::parse_from_rfc3339(key) else {
            audit.unparseable.push(key.to_string());
            continue;
        };
        if let Some((prev_key, prev_instant)) = previous {
            if prev_instant < instant {
                audit.inversions.push((prev_key.to_string(), key.to_string()));
            }
        }
        previous = Some((key, instant));
    }

    audit
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{SecondsFormat, Utc};
    use proptest::prelude::*;

    #[test]
    fn test_uniform_descending_keys_are_clean() {
        let audit = audit_sort_keys([
            "2024-03-01T12:00:00.000-06:00",
            "2024-02-01T12:00:00.000-06:00",
            "2023-12-31T23:59:59.999-06:00",
        ]);
        assert!(audit.is_clean());
        assert_eq!(audit.checked, 3);
    }

    #[test]
    fn test_mixed_offsets_report_inversion() {
        // 01:00+02:00 is 23:00Z the previous day, yet sorts first as a string
        let audit = audit_sort_keys(["2024-01-01T01:00:00+02:00", "2024-01-01T00:30:00Z"]);
        assert_eq!(
            audit.inversions,
            vec![(
                "2024-01-01T01:00:00+02:00".to_string(),
                "2024-01-01T00:30:00Z".to_string()
            )]
        );
    }

    #[test]
    fn test_mixed_precision_reports_inversion() {
        let mut keys = vec!["2024-01-01T00:00:00.5Z", "2024-01-01T00:00:00Z"];
        // Same order a descending string sort produces
        keys.sort_by(|a, b| b.cmp(a));
        assert_eq!(keys[0], "2024-01-01T00:00:00Z");

        let audit = audit_sort_keys(keys);
        assert_eq!(audit.inversions.len(), 1);
    }

    #[test]
    fn test_missing_and_unparseable_keys() {
        let audit = audit_sort_keys(["2024-01-01T00:00:00Z", "yesterday", "", ""]);
        assert_eq!(audit.missing, 2);
        assert_eq!(audit.unparseable, vec!["yesterday".to_string()]);
        assert!(audit.inversions.is_empty());
        assert!(!audit.is_clean());
    }

    #[test]
    fn test_inversion_skips_over_unparseable() {
        let audit = audit_sort_keys(["2023-01-01T00:00:00Z", "garbage", "2024-01-01T00:00:00Z"]);
        assert_eq!(audit.inversions.len(), 1);
    }

    fn render(secs: i64, millis: u32, offset: &FixedOffset) -> String {
        DateTime::<Utc>::from_timestamp(secs, millis * 1_000_000)
            .unwrap()
            .with_timezone(offset)
            .to_rfc3339_opts(SecondsFormat::Millis, false)
    }

    proptest! {
        #[test]
        fn prop_uniform_format_sorts_chronologically(
            a in 0i64..4_000_000_000,
            b in 0i64..4_000_000_000,
            a_ms in 0u32..1000,
            b_ms in 0u32..1000,
            offset_hours in -12i32..=12
        ) {
            let offset = FixedOffset::east_opt(offset_hours * 3600).unwrap();
            let ka = render(a, a_ms, &offset);
            let kb = render(b, b_ms, &offset);
            let ia = DateTime::<Utc>::from_timestamp(a, a_ms * 1_000_000).unwrap();
            let ib = DateTime::<Utc>::from_timestamp(b, b_ms * 1_000_000).unwrap();

            prop_assert_eq!(ka.cmp(&kb), ia.cmp(&ib));
        }

        #[test]
        fn prop_descending_string_sort_audits_clean(
            secs in prop::collection::vec(0i64..4_000_000_000, 0..30)
        ) {
            let offset = FixedOffset::west_opt(6 * 3600).unwrap();
            let mut keys: Vec<String> = secs.iter().map(|s| render(*s, 0, &offset)).collect();
            keys.sort_by(|x, y| y.cmp(x));

            let audit = audit_sort_keys(keys.iter().map(String::as_str));
            prop_assert!(audit.is_clean(), "audit: {:?}", audit);
        }
    }
}
