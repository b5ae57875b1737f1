//! Message dispatch
//!
//! Incoming envelopes run through a fixed chain of handlers; the first
//! handler whose kind and guard match wins and the rest never see the
//! message. Mutation exclusivity rests entirely on these guards: replica
//! clients route every change through a request message instead of calling
//! the mutating entry points themselves.

use almanac_core::{CalendarId, ClientId, ClockStatus, WorldTime};

use crate::election::Election;
use crate::message::{DateTimeChange, Message, NoteRecord};

/// The state and effects the dispatch chain needs from its client
///
/// The client passes itself in explicitly; the router owns no state and
/// reaches no globals.
pub trait SyncContext {
    fn client_id(&self) -> ClientId;
    fn is_privileged(&self) -> bool;
    fn election(&mut self) -> &mut Election;
    fn is_primary(&self) -> bool;

    /// Queue an envelope onto the broadcast channel, best effort
    fn broadcast(&mut self, msg: Message);

    /// Mirror a clock status transition into the local display state
    fn set_clock_display(&mut self, status: ClockStatus);

    /// Apply a change to the canonical counter and persist it; returns the
    /// new canonical timestamp. Only reached behind the authority guard.
    fn apply_canonical_change(&mut self, change: &DateTimeChange) -> WorldTime;

    /// Refresh the local read-only mirror from a canonical announcement
    fn set_time_mirror(&mut self, timestamp: WorldTime);

    fn active_calendar(&self) -> CalendarId;

    /// Swap the in-use calendar; `persist` only on the authority
    fn set_active_calendar(&mut self, id: CalendarId, persist: bool);

    /// Re-render the local view
    fn render(&mut self);

    /// Forward a note to the external note store
    fn save_note(&mut self, note: &NoteRecord);
}

/// Stateless dispatcher over the closed message set
#[derive(Clone, Copy, Debug, Default)]
pub struct SyncRouter;

impl SyncRouter {
    pub fn new() -> Self {
        SyncRouter
    }

    /// Route one incoming envelope
    ///
    /// Handlers are tried in a fixed order; the first match wins. Messages
    /// that match no handler (or fail a guard that would let them mutate)
    /// are dropped, not errors.
    pub fn dispatch<C: SyncContext>(&self, ctx: &mut C, msg: &Message) {
        if Self::try_election(ctx, msg) {
            return;
        }
        if Self::try_clock_status(ctx, msg) {
            return;
        }
        if Self::try_date_time_change(ctx, msg) {
            return;
        }
        if Self::try_calendar_switch(ctx, msg) {
            return;
        }
        if Self::try_app_refresh(ctx, msg) {
            return;
        }
        if Self::try_note_save(ctx, msg) {
            return;
        }
        tracing::warn!("unhandled message kind: {}", msg.kind());
    }

    /// Probe/response pair driving the election
    fn try_election<C: SyncContext>(ctx: &mut C, msg: &Message) -> bool {
        match msg {
            Message::PrimaryProbe => {
                if ctx.is_privileged() && ctx.is_primary() {
                    ctx.broadcast(Message::PrimaryResponse);
                }
                true
            }
            Message::PrimaryResponse => {
                if ctx.is_privileged() {
                    ctx.election().note_primary_response();
                }
                true
            }
            _ => false,
        }
    }

    /// Clock status transitions update the display state of any client
    fn try_clock_status<C: SyncContext>(ctx: &mut C, msg: &Message) -> bool {
        let Message::ClockStatus(status) = msg else {
            return false;
        };
        ctx.set_clock_display(*status);
        ctx.render();
        true
    }

    /// Date/time changes: requests mutate behind the authority guard,
    /// canonical announcements refresh every mirror
    fn try_date_time_change<C: SyncContext>(ctx: &mut C, msg: &Message) -> bool {
        let Message::DateTimeChange(change) = msg else {
            return false;
        };

        if ctx.is_privileged() && ctx.is_primary() {
            let canonical = ctx.apply_canonical_change(change);
            // Announce the applied result; an incoming announcement is
            // already one, so re-broadcasting it would bounce between
            // dual authorities forever.
            if !matches!(change, DateTimeChange::Absolute { .. }) {
                ctx.broadcast(Message::DateTimeChange(DateTimeChange::Absolute {
                    timestamp: canonical,
                }));
            }
            ctx.render();
            return true;
        }

        match change {
            DateTimeChange::Absolute { timestamp } => {
                ctx.set_time_mirror(*timestamp);
                ctx.render();
            }
            DateTimeChange::Delta { .. } | DateTimeChange::Preset { .. } => {
                // A request this client has no authority to apply; the
                // authority will answer with an announcement.
            }
        }
        true
    }

    /// Calendar switches follow the same request/announcement pattern
    fn try_calendar_switch<C: SyncContext>(ctx: &mut C, msg: &Message) -> bool {
        let Message::CalendarSwitch(id) = msg else {
            return false;
        };
        if ctx.active_calendar() == *id {
            return true;
        }
        if ctx.is_privileged() && ctx.is_primary() {
            ctx.set_active_calendar(*id, true);
            ctx.broadcast(Message::CalendarSwitch(*id));
        } else {
            ctx.set_active_calendar(*id, false);
        }
        ctx.render();
        true
    }

    /// Refresh requests re-render locally, optionally for one target client
    fn try_app_refresh<C: SyncContext>(ctx: &mut C, msg: &Message) -> bool {
        let Message::AppRefresh { target } = msg else {
            return false;
        };
        if target.is_none() || *target == Some(ctx.client_id()) {
            ctx.render();
        }
        true
    }

    /// Notes are forwarded to the external store by the authority only
    fn try_note_save<C: SyncContext>(ctx: &mut C, msg: &Message) -> bool {
        let Message::NoteSave(note) = msg else {
            return false;
        };
        if ctx.is_privileged() && ctx.is_primary() {
            ctx.save_note(note);
        } else {
            tracing::warn!(
                "dropping note-save for {}: client {} lacks authority",
                note.title,
                ctx.client_id()
            );
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use almanac_core::{DayPreset, Interval};

    use super::*;
    use crate::election::ElectionState;

    /// Records every effect the router asks for
    struct MockContext {
        id: ClientId,
        privileged: bool,
        election: Election,
        active: CalendarId,
        canonical: WorldTime,
        mirror: Option<WorldTime>,
        display: Option<ClockStatus>,
        outgoing: Vec<Message>,
        persisted: u32,
        renders: u32,
        saved_notes: Vec<NoteRecord>,
    }

    impl MockContext {
        fn new(id: u64, privileged: bool) -> Self {
            MockContext {
                id: ClientId::new(id),
                privileged,
                election: Election::default(),
                active: CalendarId::new(1),
                canonical: WorldTime::ZERO,
                mirror: None,
                display: None,
                outgoing: Vec::new(),
                persisted: 0,
                renders: 0,
                saved_notes: Vec::new(),
            }
        }

        fn primary(mut self) -> Self {
            let t0 = std::time::Instant::now();
            self.election.begin_at(t0);
            assert!(self.election.poll_at(t0 + std::time::Duration::from_secs(6)));
            self
        }

        fn secondary(mut self) -> Self {
            self.election.begin();
            self.election.note_primary_response();
            self
        }
    }

    impl SyncContext for MockContext {
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
            self.outgoing.push(msg);
        }

        fn set_clock_display(&mut self, status: ClockStatus) {
            self.display = Some(status);
        }

        fn apply_canonical_change(&mut self, change: &DateTimeChange) -> WorldTime {
            self.canonical = match change {
                DateTimeChange::Delta { interval } => {
                    self.canonical.saturating_add_secs(interval.second)
                }
                DateTimeChange::Absolute { timestamp } => *timestamp,
                DateTimeChange::Preset { .. } => self.canonical.saturating_add_secs(3600),
            };
            self.persisted += 1;
            self.canonical
        }

        fn set_time_mirror(&mut self, timestamp: WorldTime) {
            self.mirror = Some(timestamp);
        }

        fn active_calendar(&self) -> CalendarId {
            self.active
        }

        fn set_active_calendar(&mut self, id: CalendarId, persist: bool) {
            self.active = id;
            if persist {
                self.persisted += 1;
            }
        }

        fn render(&mut self) {
            self.renders += 1;
        }

        fn save_note(&mut self, note: &NoteRecord) {
            self.saved_notes.push(note.clone());
        }
    }

    fn note() -> NoteRecord {
        NoteRecord {
            id: 1,
            title: "Harvest".into(),
            content: "First day of harvest.".into(),
            year: 1,
            month: 0,
            day: 1,
            author: ClientId::new(2),
        }
    }

    #[test]
    fn test_primary_answers_probe() {
        let router = SyncRouter::new();
        let mut ctx = MockContext::new(1, true).primary();
        router.dispatch(&mut ctx, &Message::PrimaryProbe);
        assert_eq!(ctx.outgoing, vec![Message::PrimaryResponse]);
    }

    #[test]
    fn test_secondary_stays_silent_on_probe() {
        let router = SyncRouter::new();
        let mut ctx = MockContext::new(1, true).secondary();
        router.dispatch(&mut ctx, &Message::PrimaryProbe);
        assert!(ctx.outgoing.is_empty());
    }

    #[test]
    fn test_response_concedes_checking_client() {
        let router = SyncRouter::new();
        let mut ctx = MockContext::new(1, true);
        ctx.election.begin();
        router.dispatch(&mut ctx, &Message::PrimaryResponse);
        assert_eq!(ctx.election.state(), ElectionState::Secondary);
    }

    #[test]
    fn test_non_privileged_ignores_election_traffic() {
        let router = SyncRouter::new();
        let mut ctx = MockContext::new(1, false);
        router.dispatch(&mut ctx, &Message::PrimaryResponse);
        assert_eq!(ctx.election.state(), ElectionState::Unknown);
    }

    #[test]
    fn test_clock_status_updates_any_client() {
        let router = SyncRouter::new();
        let mut ctx = MockContext::new(1, false);
        router.dispatch(&mut ctx, &Message::ClockStatus(ClockStatus::Paused));
        assert_eq!(ctx.display, Some(ClockStatus::Paused));
        assert_eq!(ctx.renders, 1);
    }

    #[test]
    fn test_authority_applies_delta_and_announces() {
        let router = SyncRouter::new();
        let mut ctx = MockContext::new(1, true).primary();
        let request = Message::DateTimeChange(DateTimeChange::Delta {
            interval: Interval::default().with_second(30),
        });
        router.dispatch(&mut ctx, &request);

        assert_eq!(ctx.canonical.as_secs(), 30);
        assert_eq!(ctx.persisted, 1);
        assert_eq!(
            ctx.outgoing,
            vec![Message::DateTimeChange(DateTimeChange::Absolute {
                timestamp: WorldTime::from_secs(30),
            })]
        );
    }

    #[test]
    fn test_authority_applies_announcement_without_rebroadcast() {
        let router = SyncRouter::new();
        let mut ctx = MockContext::new(1, true).primary();
        let announcement = Message::DateTimeChange(DateTimeChange::Absolute {
            timestamp: WorldTime::from_secs(99),
        });
        router.dispatch(&mut ctx, &announcement);

        assert_eq!(ctx.canonical.as_secs(), 99);
        assert!(ctx.outgoing.is_empty());
    }

    #[test]
    fn test_replica_mirrors_announcement() {
        let router = SyncRouter::new();
        let mut ctx = MockContext::new(1, false);
        let announcement = Message::DateTimeChange(DateTimeChange::Absolute {
            timestamp: WorldTime::from_secs(42),
        });
        router.dispatch(&mut ctx, &announcement);

        assert_eq!(ctx.mirror, Some(WorldTime::from_secs(42)));
        assert_eq!(ctx.persisted, 0);
        assert_eq!(ctx.renders, 1);
    }

    #[test]
    fn test_replica_drops_requests_it_cannot_apply() {
        let router = SyncRouter::new();
        for mut ctx in [
            MockContext::new(1, false),
            MockContext::new(2, true).secondary(),
        ] {
            router.dispatch(
                &mut ctx,
                &Message::DateTimeChange(DateTimeChange::Preset {
                    preset: DayPreset::Midday,
                }),
            );
            assert_eq!(ctx.canonical, WorldTime::ZERO);
            assert_eq!(ctx.persisted, 0);
            assert!(ctx.outgoing.is_empty());
        }
    }

    #[test]
    fn test_calendar_switch_persists_only_on_authority() {
        let router = SyncRouter::new();
        let switch = Message::CalendarSwitch(CalendarId::new(5));

        let mut primary = MockContext::new(1, true).primary();
        router.dispatch(&mut primary, &switch);
        assert_eq!(primary.active, CalendarId::new(5));
        assert_eq!(primary.persisted, 1);
        assert_eq!(primary.outgoing, vec![switch.clone()]);

        let mut replica = MockContext::new(2, false);
        router.dispatch(&mut replica, &switch);
        assert_eq!(replica.active, CalendarId::new(5));
        assert_eq!(replica.persisted, 0);
        assert!(replica.outgoing.is_empty());
    }

    #[test]
    fn test_calendar_switch_to_active_is_noop() {
        let router = SyncRouter::new();
        let mut ctx = MockContext::new(1, true).primary();
        router.dispatch(&mut ctx, &Message::CalendarSwitch(CalendarId::new(1)));
        assert!(ctx.outgoing.is_empty());
        assert_eq!(ctx.renders, 0);
    }

    #[test]
    fn test_app_refresh_target_filter() {
        let router = SyncRouter::new();
        let mut ctx = MockContext::new(7, false);

        router.dispatch(&mut ctx, &Message::AppRefresh { target: None });
        assert_eq!(ctx.renders, 1);

        router.dispatch(
            &mut ctx,
            &Message::AppRefresh {
                target: Some(ClientId::new(7)),
            },
        );
        assert_eq!(ctx.renders, 2);

        router.dispatch(
            &mut ctx,
            &Message::AppRefresh {
                target: Some(ClientId::new(8)),
            },
        );
        assert_eq!(ctx.renders, 2);
    }

    #[test]
    fn test_note_save_forwarded_by_authority_only() {
        let router = SyncRouter::new();

        let mut primary = MockContext::new(1, true).primary();
        router.dispatch(&mut primary, &Message::NoteSave(note()));
        assert_eq!(primary.saved_notes.len(), 1);

        let mut replica = MockContext::new(2, true).secondary();
        router.dispatch(&mut replica, &Message::NoteSave(note()));
        assert!(replica.saved_notes.is_empty());
    }
}
