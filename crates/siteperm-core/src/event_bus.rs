//! In-process notification bus
//!
//! Listeners subscribe to an event name and are called synchronously, in
//! registration order, when an event with that name is published. The
//! first listener error stops the dispatch and is handed back to the
//! publisher.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use siteperm_types::event_bus::{Event, EventBus};

use crate::prelude::*;

/// Listener callback
pub type Listener = Arc<dyn Fn(&Event) -> SpResult<()> + Send + Sync>;

/// Handle returned by [`ListenerBus::subscribe`], used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
	id: ListenerId,
	listener: Listener,
}

/// Configuration
#[derive(Clone, Debug)]
pub struct BusConfig {
	/// Maximum number of listeners per event name
	pub max_listeners: usize,
}

impl Default for BusConfig {
	fn default() -> Self {
		Self { max_listeners: 64 }
	}
}

/// Bus statistics
#[derive(Debug, Clone)]
pub struct BusStats {
	/// Number of event names with at least one listener
	pub events: usize,
	/// Total number of listeners
	pub listeners: usize,
}

/// Named-event bus with synchronous dispatch
pub struct ListenerBus {
	listeners: RwLock<HashMap<Box<str>, Vec<ListenerEntry>>>,
	next_id: AtomicU64,
	config: BusConfig,
}

impl ListenerBus {
	pub fn new() -> Self {
		Self::with_config(BusConfig::default())
	}

	pub fn with_config(config: BusConfig) -> Self {
		Self { listeners: RwLock::new(HashMap::new()), next_id: AtomicU64::new(1), config }
	}

	/// Register a listener for an event name
	pub fn subscribe<F>(&self, event_name: &str, listener: F) -> SpResult<ListenerId>
	where
		F: Fn(&Event) -> SpResult<()> + Send + Sync + 'static,
	{
		let mut listeners = self.listeners.write();
		let entries = listeners.entry(event_name.into()).or_default();
		if entries.len() >= self.config.max_listeners {
			warn!(event = %event_name, max = self.config.max_listeners, "Too many listeners");
			return Err(Error::Internal(format!("too many listeners for {}", event_name)));
		}

		let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
		entries.push(ListenerEntry { id, listener: Arc::new(listener) });

		debug!(event = %event_name, listener = id.0, "Listener subscribed");
		Ok(id)
	}

	/// Remove a listener. Returns false if it was not registered.
	pub fn unsubscribe(&self, event_name: &str, id: ListenerId) -> bool {
		let mut listeners = self.listeners.write();
		let Some(entries) = listeners.get_mut(event_name) else {
			return false;
		};

		let before = entries.len();
		entries.retain(|entry| entry.id != id);
		let removed = entries.len() != before;

		// Clean up empty entries
		if entries.is_empty() {
			listeners.remove(event_name);
		}

		debug!(event = %event_name, listener = id.0, removed, "Listener unsubscribed");
		removed
	}

	pub fn listener_count(&self, event_name: &str) -> usize {
		self.listeners.read().get(event_name).map_or(0, Vec::len)
	}

	pub fn stats(&self) -> BusStats {
		let listeners = self.listeners.read();
		BusStats { events: listeners.len(), listeners: listeners.values().map(Vec::len).sum() }
	}

	/// Dispatch an event to its listeners
	pub fn dispatch(&self, event: &Event) -> SpResult<()> {
		// Snapshot so that listeners may (un)subscribe without deadlocking
		let targets: Vec<Listener> = self
			.listeners
			.read()
			.get(event.name())
			.map(|entries| entries.iter().map(|e| e.listener.clone()).collect())
			.unwrap_or_default();

		debug!(event = %event.name(), listeners = targets.len(), "Dispatching event");
		for listener in targets {
			listener(event).inspect_err(|err| {
				warn!(event = %event.name(), error = %err, "Listener failed, dispatch aborted");
			})?;
		}
		Ok(())
	}
}

impl Default for ListenerBus {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for ListenerBus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let stats = self.stats();
		f.debug_struct("ListenerBus")
			.field("events", &stats.events)
			.field("listeners", &stats.listeners)
			.finish()
	}
}

#[async_trait]
impl EventBus for ListenerBus {
	async fn publish(&self, event: &Event) -> SpResult<()> {
		self.dispatch(event)
	}
}


// vim: ts=4
