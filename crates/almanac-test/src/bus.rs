//! In-memory broadcast bus
//!
//! Models the shared channel: every emitted envelope lands in the inbox of
//! every other registered client, and nothing moves until the harness pumps
//! delivery. Holding messages back is how tests reproduce the in-flight
//! windows real networks create.

use std::collections::{HashMap, VecDeque};

use almanac_core::{AlmanacResult, ClientId};
use almanac_runtime::{Broadcast, Shared};
use almanac_sync::Message;

/// Delivery counters
#[derive(Clone, Copy, Debug, Default)]
pub struct BusStats {
    pub emitted: u64,
    pub queued: u64,
    pub dropped: u64,
}

/// The shared broadcast channel
#[derive(Debug, Default)]
pub struct LoopbackBus {
    inboxes: HashMap<ClientId, VecDeque<Message>>,
    /// Drop every emit, modeling a dead transport
    drop_all: bool,
    stats: BusStats,
}

impl LoopbackBus {
    pub fn new() -> Self {
        LoopbackBus::default()
    }

    /// Give a client an inbox
    pub fn register(&mut self, id: ClientId) {
        self.inboxes.entry(id).or_default();
    }

    /// Start or stop dropping all traffic
    pub fn set_drop_all(&mut self, drop_all: bool) {
        self.drop_all = drop_all;
    }

    /// Queue an envelope for every registered client except the sender
    ///
    /// Returns whether the bus accepted it, mirroring the transport's
    /// best-effort delivered flag.
    pub fn emit_from(&mut self, sender: ClientId, msg: &Message) -> bool {
        self.stats.emitted += 1;
        if self.drop_all {
            self.stats.dropped += 1;
            return false;
        }
        for (id, inbox) in &mut self.inboxes {
            if *id != sender {
                inbox.push_back(msg.clone());
                self.stats.queued += 1;
            }
        }
        true
    }

    /// Take everything waiting for one client
    pub fn drain(&mut self, id: ClientId) -> Vec<Message> {
        self.inboxes
            .get_mut(&id)
            .map(|inbox| inbox.drain(..).collect())
            .unwrap_or_default()
    }

    /// Undelivered envelopes across all inboxes
    pub fn pending(&self) -> usize {
        self.inboxes.values().map(VecDeque::len).sum()
    }

    pub fn stats(&self) -> BusStats {
        self.stats
    }
}

/// One client's handle onto the shared bus
#[derive(Clone)]
pub struct BusHandle {
    bus: Shared<LoopbackBus>,
    sender: ClientId,
}

impl BusHandle {
    pub fn new(bus: Shared<LoopbackBus>, sender: ClientId) -> Self {
        bus.lock().register(sender);
        BusHandle { bus, sender }
    }
}

impl Broadcast for BusHandle {
    fn emit(&mut self, msg: &Message) -> AlmanacResult<bool> {
        Ok(self.bus.lock().emit_from(self.sender, msg))
    }
}
