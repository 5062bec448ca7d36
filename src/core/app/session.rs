use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::completion::CompletionBackend;

/// Backend, model and request bookkeeping for the running session.
pub struct SessionContext {
    pub backend: Arc<dyn CompletionBackend>,
    pub model: String,
    next_request_id: u64,
    in_flight: BTreeSet<u64>,
}

impl SessionContext {
    pub fn new(backend: Arc<dyn CompletionBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            next_request_id: 0,
            in_flight: BTreeSet::new(),
        }
    }

    /// Issues a fresh request id and records it as outstanding.
    pub fn begin_request(&mut self) -> u64 {
        self.next_request_id += 1;
        let id = self.next_request_id;
        self.in_flight.insert(id);
        id
    }

    /// Marks a request as resolved. Returns `false` for ids that were not
    /// outstanding.
    pub fn finish_request(&mut self, request_id: u64) -> bool {
        self.in_flight.remove(&request_id)
    }

    pub fn has_pending_requests(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn pending_requests(&self) -> usize {
        self.in_flight.len()
    }
}
