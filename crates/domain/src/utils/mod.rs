//! Domain utility functions

pub mod event_classifier;
