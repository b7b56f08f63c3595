#![allow(dead_code)]

use std::sync::Mutex;

use rowflow_core::{Dataset, RunEvent, RunObserver};
use serde_json::{json, Map};

pub fn numbered_dataset(n: usize) -> Dataset {
    Dataset::from_records((0..n).map(|i| {
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!(format!("row-{i}")));
        fields.insert("n".to_string(), json!(i));
        fields
    }))
}

/// Keeps every event it sees, in emission order.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress_percents(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RunEvent::Progress { event, .. } => Some(event.percent),
                _ => None,
            })
            .collect()
    }

    pub fn failed_rows(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RunEvent::RowFailed { row_index, .. } => Some(row_index),
                _ => None,
            })
            .collect()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RunEvent::BatchStart { rows, .. } => Some(rows),
                _ => None,
            })
            .collect()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events().iter().map(RunEvent::event_type).collect()
    }
}

impl RunObserver for RecordingObserver {
    fn name(&self) -> &str {
        "recording"
    }

    fn observe(&self, event: &RunEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
