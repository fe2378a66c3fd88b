use std::sync::{Arc, Mutex};

use finsync_core::ViewRefresh;

/// Records every refresh signal.
#[derive(Default, Clone)]
pub struct RecordingRefresh {
    signals: Arc<Mutex<Vec<usize>>>,
}

impl RecordingRefresh {
    pub fn signals(&self) -> Vec<usize> {
        self.signals.lock().unwrap().clone()
    }
}

impl ViewRefresh for RecordingRefresh {
    fn events_imported(&self, count: usize) {
        self.signals.lock().unwrap().push(count);
    }
}
