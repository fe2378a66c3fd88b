//! Shared test helpers for `finsync-core` integration tests.
//!
//! In-memory mocks for every core port plus a fixed clock, so cycle tests
//! can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod clock;
pub mod provider;
pub mod refresh;
pub mod store;

use std::sync::{Arc, Mutex};

/// Ordered log of port calls shared between mocks.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}
