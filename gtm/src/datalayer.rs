use std::sync::{Arc, Mutex, MutexGuard};

use metrics::counter;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

/// Append-only queue read by the tag manager. Pushes never fail from the
/// caller's point of view, delivery belongs to whoever drains the queue.
pub trait DataLayer {
    fn push(&self, payload: Map<String, Value>);
}

/// Counter label for a push, the `event` key of the payload.
pub fn event_label(payload: &Map<String, Value>) -> String {
    payload
        .get("event")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| String::from("unknown"))
}

pub struct PrintDataLayer {}

impl DataLayer for PrintDataLayer {
    fn push(&self, payload: Map<String, Value>) {
        counter!("gtm_datalayer_pushes_total", "event" => event_label(&payload)).increment(1);
        tracing::info!("data layer push: {:?}", payload);
    }
}

/// Keeps every push in memory, in push order.
#[derive(Clone, Default)]
pub struct MemoryDataLayer {
    payloads: Arc<Mutex<Vec<Map<String, Value>>>>,
}

impl MemoryDataLayer {
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.lock().iter().cloned().map(Value::Object).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Map<String, Value>>> {
        self.payloads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DataLayer for MemoryDataLayer {
    fn push(&self, payload: Map<String, Value>) {
        counter!("gtm_datalayer_pushes_total", "event" => event_label(&payload)).increment(1);
        self.lock().push(payload);
    }
}

/// Hands pushes to an asynchronous consumer through an unbounded channel.
pub struct ChannelDataLayer {
    sender: mpsc::UnboundedSender<Map<String, Value>>,
}

impl ChannelDataLayer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Map<String, Value>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (ChannelDataLayer { sender }, receiver)
    }
}

impl DataLayer for ChannelDataLayer {
    fn push(&self, payload: Map<String, Value>) {
        let event = event_label(&payload);
        match self.sender.send(payload) {
            Ok(()) => counter!("gtm_datalayer_pushes_total", "event" => event).increment(1),
            Err(_) => {
                counter!("gtm_datalayer_pushes_dropped_total", "event" => event).increment(1);
                tracing::warn!("data layer consumer is gone, dropping push");
            }
        }
    }
}
