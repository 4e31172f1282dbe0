//! Non-blocking single-flight locks.
//!
//! A [`SingleFlight`] admits at most one holder at a time and never queues:
//! a second caller is refused immediately. The [`FlightPermit`] it hands out
//! is owned, so it can be moved into a background task and released when
//! that task finishes.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct SingleFlight {
    name: &'static str,
    slot: Arc<Semaphore>,
}

#[derive(Debug)]
pub struct FlightPermit {
    name: &'static str,
    _permit: OwnedSemaphorePermit,
}

impl SingleFlight {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Take the gate if it is free. Returns `None` while another permit is alive.
    pub fn try_acquire(&self) -> Option<FlightPermit> {
        let permit = self.slot.clone().try_acquire_owned().ok()?;
        trace!(gate = self.name, "Acquired");
        Some(FlightPermit {
            name: self.name,
            _permit: permit,
        })
    }

    /// Observes the gate without taking it.
    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }
}

impl Drop for FlightPermit {
    fn drop(&mut self) {
        trace!(gate = self.name, "Released");
    }
}
