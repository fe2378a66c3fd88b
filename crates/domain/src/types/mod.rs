//! Domain types and models

pub mod event;
pub mod provider;
pub mod sync;

pub use event::{
    Event, EventDescriptor, EventPatch, EventType, NewEvent, SyncMetadata, SyncSource,
};
pub use provider::{ProviderEvent, ProviderEventDraft, ProviderEventTime};
pub use sync::{days_from, ImportReport, SyncNotice, SyncWindow};
