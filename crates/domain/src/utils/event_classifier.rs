//! Keyword classification of financial events
//!
//! Advisory only. The result is stored as event metadata and never consulted
//! when deciding whether two events are the same.

use crate::types::EventType;

const PAYMENT_KEYWORDS: [&str; 10] = [
    "payment", "pay ", "bill", "rent", "mortgage", "loan", "invoice", "subscription", "insurance",
    "installment",
];

const INCOME_KEYWORDS: [&str; 7] =
    ["salary", "paycheck", "payday", "income", "deposit", "dividend", "refund"];

const DEADLINE_KEYWORDS: [&str; 6] = ["deadline", "due", "tax", "filing", "expires", "renewal"];

const REMINDER_KEYWORDS: [&str; 4] = ["reminder", "remind", "review", "check"];

/// Classify an event by scanning its title and description.
///
/// Categories are tried in a fixed order (income, payment, deadline,
/// reminder) so that "Salary deposit due" resolves to income. Falls back to
/// [`EventType::Reminder`] when nothing matches.
pub fn classify_event(title: &str, description: Option<&str>) -> EventType {
    let mut haystack = title.to_lowercase();
    if let Some(description) = description {
        haystack.push(' ');
        haystack.push_str(&description.to_lowercase());
    }
    // trailing space lets "pay " match at the end of a title
    haystack.push(' ');

    let rules: [(EventType, &[&str]); 4] = [
        (EventType::Income, &INCOME_KEYWORDS),
        (EventType::Payment, &PAYMENT_KEYWORDS),
        (EventType::Deadline, &DEADLINE_KEYWORDS),
        (EventType::Reminder, &REMINDER_KEYWORDS),
    ];

    rules
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| haystack.contains(kw)))
        .map_or(EventType::Reminder, |(event_type, _)| *event_type)
}
