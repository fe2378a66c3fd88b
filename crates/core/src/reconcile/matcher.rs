//! Similarity matcher
//!
//! Decides whether two event descriptions refer to the same logical event.
//! Rules are exact after normalization; there is no fuzzy text similarity.

use finsync_domain::constants::PROVIDER_BOILERPLATE_PHRASES;
use finsync_domain::{EventDescriptor, EventType};

/// Decide whether `candidate` and `existing` are the same event.
///
/// When both sides carry a provider identifier, identifier equality decides
/// and content is not inspected. Otherwise content decides.
pub fn matches<C, E>(candidate: &C, existing: &E) -> bool
where
    C: EventDescriptor + ?Sized,
    E: EventDescriptor + ?Sized,
{
    if let (Some(candidate_id), Some(existing_id)) =
        (candidate.provider_id(), existing.provider_id())
    {
        return candidate_id == existing_id;
    }

    matches_content(candidate, existing)
}

/// Content comparison, ignoring provider identifiers entirely.
pub fn matches_content<C, E>(candidate: &C, existing: &E) -> bool
where
    C: EventDescriptor + ?Sized,
    E: EventDescriptor + ?Sized,
{
    candidate.title().trim() == existing.title().trim()
        && candidate.date() == existing.date()
        && times_match(candidate.time(), existing.time())
        && descriptions_match(candidate.description(), existing.description())
        && types_compatible(candidate.event_type(), existing.event_type())
}

/// True for values meaning "no specific time": empty or midnight.
pub fn is_unspecified_time(time: &str) -> bool {
    matches!(time.trim(), "" | "00:00" | "00:00:00")
}

fn strip_seconds(time: &str) -> &str {
    let time = time.trim();
    match time.match_indices(':').nth(1) {
        Some((idx, _)) => &time[..idx],
        None => time,
    }
}

fn times_match(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(present), None) | (None, Some(present)) => is_unspecified_time(present),
        (Some(a), Some(b)) => {
            let both_unspecified = is_unspecified_time(a) && is_unspecified_time(b);
            both_unspecified || strip_seconds(a) == strip_seconds(b)
        }
    }
}

/// Remove provider boilerplate (ASCII case-insensitive) and collapse
/// whitespace.
pub fn normalize_description(description: &str) -> String {
    let mut text = description.to_string();
    for phrase in PROVIDER_BOILERPLATE_PHRASES {
        // ASCII lowercasing keeps byte offsets aligned with `text`
        while let Some(start) = text.to_ascii_lowercase().find(phrase) {
            text.replace_range(start..start + phrase.len(), " ");
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn descriptions_match(a: Option<&str>, b: Option<&str>) -> bool {
    // boilerplate-only descriptions count as absent
    let a = a.map(normalize_description).filter(|d| !d.is_empty());
    let b = b.map(normalize_description).filter(|d| !d.is_empty());
    a == b
}

fn types_compatible(a: Option<EventType>, b: Option<EventType>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use finsync_domain::{Event, NewEvent, SyncMetadata};

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn local(title: &str) -> Event {
        Event {
            id: "local-1".into(),
            title: title.into(),
            date: day(),
            time: None,
            description: None,
            event_type: None,
            sync: SyncMetadata::default(),
        }
    }

    fn candidate(title: &str) -> NewEvent {
        NewEvent::native(title, day())
    }

    #[test]
    fn identifiers_decide_when_both_present() {
        let mut existing = local("Rent");
        existing.sync.provider_id = Some("g1".into());

        let mut same_id = candidate("Completely different");
        same_id.provider_id = Some("g1".into());
        assert!(matches(&same_id, &existing));

        let mut other_id = candidate("Rent");
        other_id.provider_id = Some("g2".into());
        assert!(!matches(&other_id, &existing));
    }

    #[test]
    fn one_sided_identifier_falls_back_to_content() {
        let existing = local("Rent");
        let mut with_id = candidate("Rent");
        with_id.provider_id = Some("g1".into());
        assert!(matches(&with_id, &existing));

        let mut different = candidate("Gym");
        different.provider_id = Some("g1".into());
        assert!(!matches(&different, &existing));
    }

    #[test]
    fn title_is_trimmed_but_case_sensitive() {
        assert!(matches(&candidate("  Rent "), &local("Rent")));
        assert!(!matches(&candidate("rent"), &local("Rent")));
    }

    #[test]
    fn date_must_be_identical() {
        let mut other_day = candidate("Rent");
        other_day.date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert!(!matches(&other_day, &local("Rent")));
    }

    #[test]
    fn time_rules() {
        assert!(times_match(None, None));
        assert!(times_match(Some(""), None));
        assert!(times_match(None, Some("00:00")));
        assert!(times_match(Some("00:00:00"), None));
        assert!(!times_match(Some("09:00"), None));
        assert!(times_match(Some("09:00:00"), Some("09:00")));
        assert!(times_match(Some("09:00:30"), Some("09:00:45")));
        assert!(!times_match(Some("09:00"), Some("09:30")));
        assert!(times_match(Some(""), Some("00:00")));
    }

    #[test]
    fn description_rules() {
        assert!(descriptions_match(None, None));
        assert!(!descriptions_match(Some("Landlord"), None));
        assert!(descriptions_match(
            Some("Landlord   transfer\n\nExported to Google Calendar"),
            Some("Landlord transfer"),
        ));
        assert!(descriptions_match(Some("IMPORTED FROM PROVIDER Landlord"), Some("Landlord")));
        assert!(!descriptions_match(Some("Landlord"), Some("landlord")));
        assert!(descriptions_match(Some("Exported to provider"), None));
    }

    #[test]
    fn normalization_keeps_surrounding_case() {
        assert_eq!(
            normalize_description("Pay ACME\nImported from Google Calendar  now"),
            "Pay ACME now"
        );
    }

    #[test]
    fn types_are_compatible_when_either_is_unset() {
        assert!(types_compatible(None, Some(EventType::Payment)));
        assert!(types_compatible(Some(EventType::Income), None));
        assert!(types_compatible(Some(EventType::Income), Some(EventType::Income)));
        assert!(!types_compatible(Some(EventType::Income), Some(EventType::Payment)));
    }

    #[test]
    fn full_content_match() {
        let mut existing = local("Rent");
        existing.time = Some("09:00".into());
        existing.description = Some("Landlord".into());
        existing.event_type = Some(EventType::Payment);

        let cand = candidate("Rent")
            .with_time("09:00:00")
            .with_description("Landlord exported to provider")
            .with_type(EventType::Payment);
        assert!(matches(&cand, &existing));
    }
}
