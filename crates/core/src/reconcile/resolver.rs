//! Duplicate resolver

use finsync_domain::{Event, EventDescriptor};

use super::matcher::matches;

/// First event in `same_day` that the matcher accepts as `candidate`.
///
/// The caller restricts `same_day` to the candidate's calendar day; the
/// matcher's own date check only guards against a mis-filtered slice.
pub fn find_duplicate<'a, C>(candidate: &C, same_day: &'a [Event]) -> Option<&'a Event>
where
    C: EventDescriptor + ?Sized,
{
    same_day.iter().find(|existing| matches(candidate, *existing))
}
