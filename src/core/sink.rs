//! Message sinks: receivers of the full decoded message snapshot

use std::sync::{Arc, Mutex};

/// Receives the complete decoded text every time a letter or word is committed
pub trait MessageSink {
    fn notify(&mut self, message: &str);
}

impl<F> MessageSink for F
where
    F: FnMut(&str),
{
    fn notify(&mut self, message: &str) {
        self(message)
    }
}

/// Sink that drops every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn notify(&mut self, _message: &str) {}
}

/// Sink keeping every snapshot it received, in order
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub messages: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    pub fn count(&self) -> usize {
        self.messages.len()
    }
}

impl MessageSink for RecordingSink {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Cloneable handle to the last message, readable after the decoder is gone
#[derive(Debug, Default, Clone)]
pub struct SharedMessage {
    inner: Arc<Mutex<String>>,
}

impl SharedMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> String {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl MessageSink for SharedMessage {
    fn notify(&mut self, message: &str) {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clear();
        guard.push_str(message);
    }
}
