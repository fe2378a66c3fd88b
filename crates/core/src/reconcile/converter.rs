//! Provider event to local event conversion

use chrono::{DateTime, Utc};
use finsync_domain::constants::UNTITLED_EVENT_TITLE;
use finsync_domain::{classify_event, NewEvent, ProviderEvent, SyncSource};

/// Map a provider event into a provider-sourced local event.
///
/// Returns `None` when the event has no usable start date. Timed events keep
/// their wall-clock time in the event's own offset as `HH:MM`.
pub fn convert(event: &ProviderEvent, synced_at: DateTime<Utc>) -> Option<NewEvent> {
    let date = event.effective_date()?;

    let title = event
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNTITLED_EVENT_TITLE)
        .to_string();

    let description = event
        .description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let time = if event.is_all_day() {
        None
    } else {
        event.start.date_time.map(|dt| dt.naive_local().format("%H:%M").to_string())
    };

    let event_type = classify_event(&title, description.as_deref());

    Some(NewEvent {
        title,
        date,
        time,
        description,
        event_type: Some(event_type),
        provider_id: Some(event.id.clone()),
        source: SyncSource::Provider,
        last_synced_at: Some(synced_at),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate};
    use finsync_domain::{EventType, ProviderEventTime};

    use super::*;

    fn provider_event(start: ProviderEventTime) -> ProviderEvent {
        ProviderEvent {
            id: "g1".into(),
            summary: Some(" Rent ".into()),
            description: Some("   ".into()),
            start,
            end: None,
        }
    }

    #[test]
    fn all_day_event_has_no_time() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let converted = convert(&provider_event(ProviderEventTime::all_day(day)), Utc::now()).unwrap();

        assert_eq!(converted.title, "Rent");
        assert_eq!(converted.date, day);
        assert_eq!(converted.time, None);
        assert_eq!(converted.description, None);
        assert_eq!(converted.provider_id.as_deref(), Some("g1"));
        assert_eq!(converted.source, SyncSource::Provider);
        assert_eq!(converted.event_type, Some(EventType::Payment));
    }

    #[test]
    fn timed_event_keeps_local_wall_clock() {
        let dt = DateTime::parse_from_rfc3339("2024-05-01T09:15:00+02:00").unwrap();
        let converted = convert(&provider_event(ProviderEventTime::at(dt)), Utc::now()).unwrap();

        assert_eq!(converted.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(converted.time.as_deref(), Some("09:15"));
    }

    #[test]
    fn missing_date_is_unmappable() {
        assert!(convert(&provider_event(ProviderEventTime::default()), Utc::now()).is_none());
    }

    #[test]
    fn missing_summary_gets_placeholder_title() {
        let mut event =
            provider_event(ProviderEventTime::all_day(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
        event.summary = None;
        let converted = convert(&event, Utc::now()).unwrap();
        assert_eq!(converted.title, UNTITLED_EVENT_TITLE);
        assert_eq!(converted.event_type, Some(EventType::Reminder));
    }
}
