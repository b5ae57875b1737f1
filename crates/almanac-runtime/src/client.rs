//! The per-client runtime node
//!
//! A `Client` wires the calendar engine, clock engine, election, and
//! dispatch chain to its external collaborators. Exactly one privileged
//! client holds time authority at a stable point; everyone else mirrors
//! broadcast state and submits change requests instead of mutating.

use std::collections::HashMap;
use std::time::Instant;

use almanac_calendar::{
    change_date_time, daylight_at, seconds_to_date, Calendar, CalendarRecord, DaylightEdge,
};
use almanac_clock::{ClockConfig, ClockEngine};
use almanac_core::{AlmanacError, AlmanacResult, CalendarId, ClientId, ClockStatus, DayPreset, Interval, WorldTime};
use almanac_sync::{
    DateTimeChange, Election, ElectionConfig, Message, NoteRecord, SyncContext, SyncRouter,
};
use serde_json::json;

use crate::stores::{Broadcast, NoteStore, SettingsStore};
use crate::view::{Renderer, ViewData};

/// Settings keys, matching the persisted record shapes
pub const SETTING_CALENDARS: &str = "calendars";
pub const SETTING_ACTIVE_CALENDAR: &str = "activeCalendar";
pub const SETTING_CURRENT_TIME: &str = "currentTime";

/// Runtime counters, mostly for tests and diagnostics
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientStats {
    pub ticks: u64,
    pub messages_in: u64,
    pub messages_out: u64,
    pub renders: u64,
    pub persists: u64,
}

/// One connected client of the shared world
pub struct Client {
    id: ClientId,
    privileged: bool,
    election: Election,
    clock: ClockEngine,
    router: SyncRouter,
    calendars: HashMap<CalendarId, Calendar>,
    active: CalendarId,
    current_time: WorldTime,
    /// Clock status as last seen; the display state on replicas
    clock_display: ClockStatus,
    settings: Box<dyn SettingsStore>,
    notes: Box<dyn NoteStore>,
    transport: Box<dyn Broadcast>,
    renderer: Option<Box<dyn Renderer>>,
    stats: ClientStats,
}

impl Client {
    pub fn new(
        id: ClientId,
        privileged: bool,
        settings: impl SettingsStore + 'static,
        notes: impl NoteStore + 'static,
        transport: impl Broadcast + 'static,
    ) -> Self {
        Client {
            id,
            privileged,
            election: Election::default(),
            clock: ClockEngine::new(ClockConfig::default()),
            router: SyncRouter::new(),
            calendars: HashMap::new(),
            active: CalendarId::ZERO,
            current_time: WorldTime::ZERO,
            clock_display: ClockStatus::Stopped,
            settings: Box::new(settings),
            notes: Box::new(notes),
            transport: Box::new(transport),
            renderer: None,
            stats: ClientStats::default(),
        }
    }

    pub fn with_election_config(mut self, config: ElectionConfig) -> Self {
        self.election = Election::new(config);
        self
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    pub fn is_primary(&self) -> bool {
        self.election.is_primary()
    }

    pub fn election_state(&self) -> almanac_sync::ElectionState {
        self.election.state()
    }

    pub fn clock_status(&self) -> ClockStatus {
        self.clock_display
    }

    pub fn current_time(&self) -> WorldTime {
        self.current_time
    }

    pub fn calendar(&self) -> Option<&Calendar> {
        self.calendars.get(&self.active)
    }

    pub fn active_calendar_id(&self) -> CalendarId {
        self.active
    }

    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    /// Load configuration, then probe for an existing authority
    ///
    /// Registers defaults on first run, loads and validates every calendar
    /// record, restores the persisted counter, and (for a privileged
    /// client) begins the election.
    pub fn startup_at(&mut self, now: Instant) -> AlmanacResult<()> {
        let default_calendar = Calendar::gregorian(CalendarId::new(1));
        self.settings.register(
            SETTING_CALENDARS,
            json!([default_calendar.to_record(1.0, false)]),
        );
        self.settings.register(SETTING_ACTIVE_CALENDAR, json!(1));
        self.settings.register(SETTING_CURRENT_TIME, json!(0));

        let records: Vec<CalendarRecord> = self
            .settings
            .get(SETTING_CALENDARS)
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| AlmanacError::Settings(e.to_string()))?
            .unwrap_or_default();

        self.active = CalendarId::new(
            self.settings
                .get(SETTING_ACTIVE_CALENDAR)
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
        );
        self.current_time = WorldTime::from_secs(
            self.settings
                .get(SETTING_CURRENT_TIME)
                .and_then(|v| v.as_i64())
                .unwrap_or(0),
        );

        self.calendars.clear();
        for record in &records {
            let calendar = Calendar::from_record(record)?;
            if calendar.id == self.active {
                self.clock.set_config(ClockConfig {
                    game_seconds_per_real_second: record.time.game_time_ratio,
                    unify_with_host_pause: record.time.unify_game_and_clock_pause,
                    persist_interval: ClockConfig::default().persist_interval,
                });
            }
            self.calendars.insert(calendar.id, calendar);
        }
        if !self.calendars.contains_key(&self.active) {
            return Err(AlmanacError::UnknownCalendar(self.active));
        }

        if self.privileged {
            self.election.begin_at(now);
            self.emit(Message::PrimaryProbe);
        }
        Ok(())
    }

    pub fn startup(&mut self) -> AlmanacResult<()> {
        self.startup_at(Instant::now())
    }

    /// One turn of the host loop
    ///
    /// Fires the election deadline if due, then advances the clock while
    /// this client holds authority, carrying accrued game seconds through
    /// the calendar arithmetic and persisting on the slower cadence.
    pub fn tick_at(&mut self, now: Instant) {
        self.stats.ticks += 1;

        if self.election.poll_at(now) {
            // No authority answered: this client takes over. The previous
            // authority may have disconnected mid-run, so the clock resets
            // to stopped for everyone.
            tracing::info!("client {} promoted itself to time authority", self.id);
            let status = self.clock.stop();
            self.clock_display = status;
            self.emit(Message::PrimaryResponse);
            self.emit(Message::ClockStatus(status));
            self.render();
        }

        if self.is_primary() {
            let tick = self.clock.tick_at(now);
            if tick.game_seconds > 0 {
                if let Some(cal) = self.calendars.get(&self.active) {
                    let interval = Interval::default().with_second(tick.game_seconds);
                    change_date_time(cal, &mut self.current_time, &interval);
                }
                self.render();
            }
            if tick.persist_due {
                // Replica mirrors ride the same cadence: stale for at most
                // one persist interval while the clock runs.
                self.persist_current_time();
                self.emit(Message::DateTimeChange(DateTimeChange::Absolute {
                    timestamp: self.current_time,
                }));
            }
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Route one incoming envelope from the broadcast channel
    pub fn receive(&mut self, msg: &Message) {
        self.stats.messages_in += 1;
        let router = self.router;
        router.dispatch(self, msg);
    }

    /// Decode and route a raw JSON envelope
    pub fn receive_json(&mut self, json: &str) -> AlmanacResult<()> {
        let msg = Message::from_json(json)?;
        self.receive(&msg);
        Ok(())
    }

    /// Start the canonical clock; authority only
    pub fn start_clock_at(&mut self, now: Instant) -> bool {
        if !self.check_authority("start the clock") {
            return false;
        }
        let status = self.clock.start_at(now);
        self.announce_clock(status);
        true
    }

    pub fn start_clock(&mut self) -> bool {
        self.start_clock_at(Instant::now())
    }

    /// Stop the canonical clock; authority only, idempotent
    pub fn stop_clock(&mut self) -> bool {
        if !self.check_authority("stop the clock") {
            return false;
        }
        let status = self.clock.stop();
        self.persist_current_time();
        self.announce_clock(status);
        true
    }

    pub fn pause_clock(&mut self) -> bool {
        if !self.check_authority("pause the clock") {
            return false;
        }
        let status = self.clock.pause();
        self.announce_clock(status);
        true
    }

    pub fn resume_clock_at(&mut self, now: Instant) -> bool {
        if !self.check_authority("resume the clock") {
            return false;
        }
        let status = self.clock.resume_at(now);
        self.announce_clock(status);
        true
    }

    pub fn resume_clock(&mut self) -> bool {
        self.resume_clock_at(Instant::now())
    }

    /// Report the host's pause/combat state to the clock engine
    pub fn set_host_paused_at(&mut self, paused: bool, now: Instant) {
        if !self.is_primary() {
            return;
        }
        if let Some(status) = self.clock.set_host_paused_at(paused, now) {
            self.announce_clock(status);
        }
    }

    pub fn set_host_paused(&mut self, paused: bool) {
        self.set_host_paused_at(paused, Instant::now());
    }

    /// Request a signed date/time delta
    pub fn request_date_change(&mut self, interval: Interval) -> bool {
        self.submit_change(DateTimeChange::Delta { interval })
    }

    /// Request the counter be set outright
    pub fn request_set_timestamp(&mut self, timestamp: WorldTime) -> bool {
        self.submit_change(DateTimeChange::Absolute { timestamp })
    }

    /// Request a jump to the next occurrence of a named time of day
    pub fn request_preset(&mut self, preset: DayPreset) -> bool {
        self.submit_change(DateTimeChange::Preset { preset })
    }

    /// Request the in-use calendar be swapped
    pub fn request_calendar_switch(&mut self, id: CalendarId) -> bool {
        if !self.privileged {
            tracing::warn!("client {} is not permitted to switch calendars", self.id);
            return false;
        }
        if self.is_primary() {
            if !self.calendars.contains_key(&id) {
                tracing::warn!("client {} has no calendar {:?} to switch to", self.id, id);
                return false;
            }
            self.set_active_calendar(id, true);
            self.emit(Message::CalendarSwitch(id));
            self.render();
        } else {
            self.emit(Message::CalendarSwitch(id));
        }
        true
    }

    /// Save a note, or forward it to the authority
    pub fn save_note(&mut self, note: NoteRecord) -> bool {
        if !self.privileged {
            tracing::warn!("client {} is not permitted to save notes", self.id);
            return false;
        }
        if self.is_primary() {
            if let Err(e) = self.notes.save(note) {
                tracing::warn!("note store rejected save: {e}");
                return false;
            }
        } else {
            self.emit(Message::NoteSave(note));
        }
        true
    }

    /// Assemble the current view
    pub fn view_data(&self) -> Option<ViewData> {
        let cal = self.calendars.get(&self.active)?;
        let date = seconds_to_date(cal, self.current_time);
        let notes = self.notes.notes_for_day(date.year, date.month, date.day);
        Some(ViewData::assemble(
            cal,
            self.current_time,
            self.clock_display,
            self.is_primary(),
            notes,
        ))
    }

    fn render(&mut self) {
        self.stats.renders += 1;
        let Some(data) = self.view_data() else {
            return;
        };
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&data);
        }
    }

    fn emit(&mut self, msg: Message) {
        match self.transport.emit(&msg) {
            Ok(true) => self.stats.messages_out += 1,
            // Best effort: failures are logged, never retried here
            Ok(false) => tracing::warn!("broadcast not delivered: {}", msg.kind()),
            Err(e) => tracing::warn!("transport error on {}: {e}", msg.kind()),
        }
    }

    fn check_authority(&self, action: &str) -> bool {
        if self.privileged && self.is_primary() {
            return true;
        }
        tracing::warn!("client {} may not {action}", self.id);
        false
    }

    fn announce_clock(&mut self, status: ClockStatus) {
        self.clock_display = status;
        self.emit(Message::ClockStatus(status));
        self.render();
    }

    fn submit_change(&mut self, change: DateTimeChange) -> bool {
        if !self.privileged {
            tracing::warn!("client {} is not permitted to change the date", self.id);
            return false;
        }
        if self.is_primary() {
            let canonical = self.apply_canonical_change(&change);
            self.emit(Message::DateTimeChange(DateTimeChange::Absolute {
                timestamp: canonical,
            }));
            self.render();
        } else {
            // A privileged replica routes the request through the channel;
            // the authority applies it and answers with the result.
            self.emit(Message::DateTimeChange(change));
        }
        true
    }

    fn persist_current_time(&mut self) {
        if let Err(e) = self
            .settings
            .set(SETTING_CURRENT_TIME, json!(self.current_time.as_secs()))
        {
            tracing::warn!("failed to persist world time: {e}");
            return;
        }
        self.stats.persists += 1;
        tracing::debug!("persisted world time {}", self.current_time.as_secs());
    }
}

/// Next occurrence of a preset time of day, strictly after `time`
fn next_preset_time(cal: &Calendar, time: WorldTime, preset: DayPreset) -> WorldTime {
    let spd = cal.time.seconds_per_day();
    let dt = seconds_to_date(cal, time);
    let target = match preset {
        DayPreset::Midnight => 0,
        DayPreset::Midday => spd / 2,
        DayPreset::Sunrise => daylight_at(cal, dt.year, dt.month, dt.day, DaylightEdge::Sunrise),
        DayPreset::Sunset => daylight_at(cal, dt.year, dt.month, dt.day, DaylightEdge::Sunset),
    } as i64;

    let second_of_day = time.second_of_day(spd) as i64;
    let mut delta = target - second_of_day;
    if delta <= 0 {
        delta += spd as i64;
    }
    time.saturating_add_secs(delta)
}

impl SyncContext for Client {
    fn client_id(&self) -> ClientId {
        self.id
    }

    fn is_privileged(&self) -> bool {
        self.privileged
    }

    fn election(&mut self) -> &mut Election {
        &mut self.election
    }

    fn is_primary(&self) -> bool {
        self.election.is_primary()
    }

    fn broadcast(&mut self, msg: Message) {
        self.emit(msg);
    }

    fn set_clock_display(&mut self, status: ClockStatus) {
        self.clock_display = status;
    }

    fn apply_canonical_change(&mut self, change: &DateTimeChange) -> WorldTime {
        if let Some(cal) = self.calendars.get(&self.active) {
            match change {
                DateTimeChange::Delta { interval } => {
                    change_date_time(cal, &mut self.current_time, interval);
                }
                DateTimeChange::Absolute { timestamp } => {
                    self.current_time = *timestamp;
                }
                DateTimeChange::Preset { preset } => {
                    self.current_time = next_preset_time(cal, self.current_time, *preset);
                }
            }
        }
        self.persist_current_time();
        self.current_time
    }

    fn set_time_mirror(&mut self, timestamp: WorldTime) {
        self.current_time = timestamp;
    }

    fn active_calendar(&self) -> CalendarId {
        self.active
    }

    fn set_active_calendar(&mut self, id: CalendarId, persist: bool) {
        if !self.calendars.contains_key(&id) {
            tracing::warn!("client {} has no calendar {:?}; keeping {:?}", self.id, id, self.active);
            return;
        }
        self.active = id;
        if persist {
            if let Err(e) = self.settings.set(SETTING_ACTIVE_CALENDAR, json!(id.0)) {
                tracing::warn!("failed to persist active calendar: {e}");
                return;
            }
            self.stats.persists += 1;
        }
    }

    fn render(&mut self) {
        Client::render(self);
    }

    fn save_note(&mut self, note: &NoteRecord) {
        if let Err(e) = self.notes.save(note.clone()) {
            tracing::warn!("note store rejected forwarded save: {e}");
        }
    }
}
