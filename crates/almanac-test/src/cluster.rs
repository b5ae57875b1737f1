//! Multi-client cluster harness
//!
//! Builds N clients over one loopback bus, each with its own settings and
//! note stores, and drives them with explicit ticks and delivery pumps.
//! Single-threaded and timer-free: time is whatever instant the test says.

use std::time::Instant;

use almanac_calendar::CalendarRecord;
use almanac_core::{AlmanacResult, ClientId};
use almanac_runtime::{
    Client, MemoryNotes, MemorySettings, SettingsStore, Shared, SETTING_CALENDARS,
};

use crate::bus::{BusHandle, LoopbackBus};

/// A cluster of clients sharing one broadcast bus
pub struct Cluster {
    bus: Shared<LoopbackBus>,
    clients: Vec<Client>,
    settings: Vec<Shared<MemorySettings>>,
    notes: Vec<Shared<MemoryNotes>>,
    /// Reference instant every scenario offsets from
    pub t0: Instant,
}

impl Cluster {
    pub fn new() -> Self {
        Cluster {
            bus: Shared::new(LoopbackBus::new()),
            clients: Vec::new(),
            settings: Vec::new(),
            notes: Vec::new(),
            t0: Instant::now(),
        }
    }

    /// Add a client; returns its index in the cluster
    pub fn add_client(&mut self, id: u64, privileged: bool) -> usize {
        let id = ClientId::new(id);
        let settings = Shared::new(MemorySettings::new());
        let notes = Shared::new(MemoryNotes::new());
        let handle = BusHandle::new(self.bus.clone(), id);
        let client = Client::new(id, privileged, settings.clone(), notes.clone(), handle);

        self.clients.push(client);
        self.settings.push(settings);
        self.notes.push(notes);
        self.clients.len() - 1
    }

    pub fn client(&self, index: usize) -> &Client {
        &self.clients[index]
    }

    pub fn client_mut(&mut self, index: usize) -> &mut Client {
        &mut self.clients[index]
    }

    pub fn settings(&self, index: usize) -> &Shared<MemorySettings> {
        &self.settings[index]
    }

    pub fn notes(&self, index: usize) -> &Shared<MemoryNotes> {
        &self.notes[index]
    }

    pub fn bus(&self) -> &Shared<LoopbackBus> {
        &self.bus
    }

    /// Seed every client's settings with the same calendar records
    pub fn seed_calendars(&mut self, records: &[CalendarRecord]) -> AlmanacResult<()> {
        let value = serde_json::to_value(records)
            .map_err(|e| almanac_core::AlmanacError::Settings(e.to_string()))?;
        for settings in &mut self.settings {
            settings.set(SETTING_CALENDARS, value.clone())?;
        }
        Ok(())
    }

    /// Start one client at an instant
    pub fn startup_at(&mut self, index: usize, now: Instant) -> AlmanacResult<()> {
        self.clients[index].startup_at(now)
    }

    /// Start every client at the same instant
    pub fn startup_all_at(&mut self, now: Instant) -> AlmanacResult<()> {
        for client in &mut self.clients {
            client.startup_at(now)?;
        }
        Ok(())
    }

    /// Tick every client at the same instant
    pub fn tick_all_at(&mut self, now: Instant) {
        for client in &mut self.clients {
            client.tick_at(now);
        }
    }

    /// Deliver queued envelopes until the bus is quiet
    ///
    /// Receiving can emit follow-ups (answers, announcements), so delivery
    /// loops until a full round moves nothing. Returns envelopes delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        loop {
            let mut moved = false;
            for client in &mut self.clients {
                let messages = { self.bus.lock().drain(client.id()) };
                for msg in messages {
                    moved = true;
                    delivered += 1;
                    client.receive(&msg);
                }
            }
            if !moved {
                break;
            }
        }
        delivered
    }

    /// Tick everyone, then deliver everything that produced
    pub fn settle_at(&mut self, now: Instant) {
        self.tick_all_at(now);
        self.pump();
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Cluster::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use almanac_sync::ElectionState;

    use super::*;

    #[test]
    fn test_single_privileged_client_promotes() {
        let mut cluster = Cluster::new();
        let a = cluster.add_client(1, true);
        let t0 = cluster.t0;

        cluster.startup_all_at(t0).unwrap();
        cluster.settle_at(t0 + Duration::from_secs(6));

        assert!(cluster.client(a).is_primary());
    }

    #[test]
    fn test_pump_delivers_probe_to_peers() {
        let mut cluster = Cluster::new();
        let _a = cluster.add_client(1, true);
        let b = cluster.add_client(2, true);
        let t0 = cluster.t0;

        cluster.startup_at(0, t0).unwrap();
        assert!(cluster.pump() >= 1);
        // No authority exists yet, so the probe goes unanswered
        assert_eq!(cluster.client(b).election_state(), ElectionState::Unknown);
    }
}
