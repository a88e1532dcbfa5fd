//! Turns the game state integration pushes of a CS2 client into normalized
//! snapshots and a stream of match events.
//!
//! ```no_run
//! let gsi = gsi::Gsi::new(gsi::Config::default());
//! gsi.subscribe(common::EventKind::RoundEnd, |event| println!("{:?}", event));
//!
//! let body: &[u8] = b"{}";
//! gsi.digest(body).unwrap();
//! ```

use std::sync::Mutex;

use common::{Event, EventKind};

pub mod bus;
pub mod damage;
mod error;
pub mod events;
pub mod mapper;
pub mod pipeline;
pub mod raw;
pub mod rounds;
pub mod tables;
pub mod validator;

pub use bus::{EventBus, SubscriptionId};
pub use error::{DecodeError, DigestError, ValidationError};
pub use pipeline::{Config, Digest, Pipeline};

/// A [`Pipeline`] plus an [`EventBus`], safe to share between request
/// handlers.
#[derive(Debug)]
pub struct Gsi {
    pipeline: Mutex<Pipeline>,
    bus: EventBus,
}

impl Gsi {
    pub fn new(config: Config) -> Self {
        Self {
            pipeline: Mutex::new(Pipeline::new(config)),
            bus: EventBus::new(),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    pub fn subscribe_once<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.bus.subscribe_once(kind, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Digests one push and publishes its events.
    ///
    /// The pipeline stays locked until every event is delivered, so the events
    /// of two pushes never interleave. Handlers must not call back into
    /// [`Gsi::digest`].
    #[tracing::instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn digest(&self, bytes: &[u8]) -> Result<Digest, DigestError> {
        let mut pipeline = self.pipeline.lock().unwrap_or_else(|e| e.into_inner());

        let digest = pipeline.digest(bytes)?;
        self.bus.publish(digest.events());

        Ok(digest)
    }

    /// The last accepted snapshot.
    pub fn last(&self) -> Option<common::Snapshot> {
        let pipeline = self.pipeline.lock().unwrap_or_else(|e| e.into_inner());
        pipeline.last().cloned()
    }

    pub fn reset(&self) {
        let mut pipeline = self.pipeline.lock().unwrap_or_else(|e| e.into_inner());
        pipeline.reset();
    }
}
