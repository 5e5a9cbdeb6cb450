use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::detection::Detection;
use crate::models::term::{HistoryEntry, TrackedResource};

/// Merges a fresh detection into a resource's state and appends one history entry.
///
/// With no `existing` record a new resource is created for `url`; otherwise
/// `url` is ignored and the record's `id`/`url` are left untouched.
pub fn apply_check(
    existing: Option<TrackedResource>,
    url: &str,
    detection: Detection,
    checked_at: DateTime<Utc>,
) -> TrackedResource {
    match existing {
        None => create(url, detection, checked_at),
        Some(resource) => recheck(resource, detection, checked_at),
    }
}

fn create(url: &str, detection: Detection, checked_at: DateTime<Utc>) -> TrackedResource {
    TrackedResource {
        id: Uuid::new_v4().to_string(),
        url: url.to_string(),
        title: detection.title,
        last_checked: checked_at,
        last_updated: detection.last_updated.clone(),
        detection_method: detection.detection_method,
        history: vec![HistoryEntry {
            checked_at,
            last_updated: detection.last_updated,
            changed: false,
        }],
    }
}

fn recheck(
    mut resource: TrackedResource,
    detection: Detection,
    checked_at: DateTime<Utc>,
) -> TrackedResource {
    // Only the previous value is tested for Unknown: known -> Unknown still counts.
    let changed = detection.last_updated != resource.last_updated && !resource.is_unknown();

    resource.title = detection.title;
    resource.last_updated = detection.last_updated;
    resource.detection_method = detection.detection_method;
    resource.last_checked = checked_at;
    resource.history.push(HistoryEntry {
        checked_at,
        last_updated: resource.last_updated.clone(),
        changed,
    });

    resource
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::term::{DetectionMethod, UNKNOWN};
    use chrono::{Duration, TimeZone};

    const URL: &str = "https://example.com/privacy";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn found(date: &str) -> Detection {
        Detection::found("Privacy".to_string(), date.to_string(), DetectionMethod::MetaTag)
    }

    fn unknown() -> Detection {
        Detection::not_detected("Privacy".to_string())
    }

    #[test]
    fn test_create_has_single_unchanged_entry() {
        let resource = apply_check(None, URL, found("2023-01-01"), t0());

        assert_eq!(resource.url, URL);
        assert!(!resource.id.is_empty());
        assert_eq!(resource.last_checked, t0());
        assert_eq!(resource.last_updated, "2023-01-01");
        assert_eq!(resource.detection_method, DetectionMethod::MetaTag);
        assert_eq!(
            resource.history,
            vec![HistoryEntry {
                checked_at: t0(),
                last_updated: "2023-01-01".to_string(),
                changed: false,
            }]
        );
    }

    #[test]
    fn test_create_with_not_detected_is_valid() {
        let resource = apply_check(None, URL, unknown(), t0());
        assert_eq!(resource.last_updated, UNKNOWN);
        assert_eq!(resource.detection_method, DetectionMethod::NotDetected);
        assert_eq!(resource.history.len(), 1);
        assert!(!resource.history[0].changed);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = apply_check(None, URL, unknown(), t0());
        let b = apply_check(None, URL, unknown(), t0());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_same_date_appends_unchanged_entry() {
        let created = apply_check(None, URL, found("2023-01-01"), t0());
        let later = t0() + Duration::days(1);
        let rechecked = apply_check(Some(created.clone()), URL, found("2023-01-01"), later);

        assert_eq!(rechecked.history.len(), created.history.len() + 1);
        assert!(!rechecked.history[1].changed);
        assert_eq!(rechecked.last_checked, later);
        assert_eq!(rechecked.history[1].checked_at, later);
    }

    #[test]
    fn test_unknown_to_known_is_not_a_change() {
        let created = apply_check(None, URL, unknown(), t0());
        let rechecked = apply_check(Some(created), URL, found("2024-06-15"), t0());

        assert_eq!(rechecked.last_updated, "2024-06-15");
        assert_eq!(rechecked.detection_method, DetectionMethod::MetaTag);
        assert!(!rechecked.history[1].changed);
    }

    #[test]
    fn test_known_to_different_known_is_a_change() {
        let created = apply_check(None, URL, found("2023-01-01"), t0());
        let rechecked = apply_check(Some(created), URL, found("2024-06-15"), t0());

        let last = rechecked.history.last().unwrap();
        assert!(last.changed);
        assert_eq!(last.last_updated, "2024-06-15");
    }

    #[test]
    fn test_known_to_unknown_is_a_change() {
        let created = apply_check(None, URL, found("2023-01-01"), t0());
        let rechecked = apply_check(Some(created), URL, unknown(), t0());

        assert!(rechecked.history[1].changed);
        assert_eq!(rechecked.detection_method, DetectionMethod::NotDetected);
    }

    #[test]
    fn test_unknown_to_unknown_is_not_a_change() {
        let created = apply_check(None, URL, unknown(), t0());
        let rechecked = apply_check(Some(created), URL, unknown(), t0());
        assert!(!rechecked.history[1].changed);
    }

    #[test]
    fn test_recheck_keeps_identity_and_overwrites_title() {
        let created = apply_check(None, URL, found("2023-01-01"), t0());
        let detection = Detection::found(
            "Privacy Notice".to_string(),
            "2023-01-01".to_string(),
            DetectionMethod::TextParsing,
        );
        let rechecked = apply_check(
            Some(created.clone()),
            "https://elsewhere.test",
            detection,
            t0(),
        );

        assert_eq!(rechecked.id, created.id);
        assert_eq!(rechecked.url, URL);
        assert_eq!(rechecked.title, "Privacy Notice");
        assert_eq!(rechecked.detection_method, DetectionMethod::TextParsing);
        assert_eq!(rechecked.history[0], created.history[0]);
    }
}
