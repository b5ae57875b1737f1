//! Clock engine - Stopped/Started/Paused state machine over real time

use std::time::{Duration, Instant};

use almanac_core::ClockStatus;

/// Clock engine configuration
#[derive(Clone, Copy, Debug)]
pub struct ClockConfig {
    /// Game seconds advanced per elapsed real second
    pub game_seconds_per_real_second: f64,
    /// Follow the host's own pause/combat state instead of running through it
    pub unify_with_host_pause: bool,
    /// How often a running clock asks to be persisted
    ///
    /// Deliberately slower than the tick rate so write volume stays bounded
    /// no matter how often the host loop ticks.
    pub persist_interval: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            game_seconds_per_real_second: 1.0,
            unify_with_host_pause: false,
            persist_interval: Duration::from_secs(10),
        }
    }
}

/// Result of one engine tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockTick {
    /// Whole game seconds accrued since the previous tick
    pub game_seconds: i64,
    /// The persistence cadence fired on this tick
    pub persist_due: bool,
}

/// The ticking world clock
///
/// States: Stopped → Started ⇄ Paused → Stopped. The engine never installs
/// its own timers; the host loop drives `tick` and applies the returned
/// game seconds through the calendar arithmetic so day overflow carries.
pub struct ClockEngine {
    config: ClockConfig,
    status: ClockStatus,
    last_tick: Option<Instant>,
    last_persist: Option<Instant>,
    /// Sub-second game time carried between ticks so none is lost
    fractional: f64,
    host_paused: bool,
}

// Clamp on elapsed real time between ticks, against host suspend
const MAX_TICK_GAP: Duration = Duration::from_secs(10);

impl ClockEngine {
    pub fn new(config: ClockConfig) -> Self {
        ClockEngine {
            config,
            status: ClockStatus::Stopped,
            last_tick: None,
            last_persist: None,
            fractional: 0.0,
            host_paused: false,
        }
    }

    pub fn status(&self) -> ClockStatus {
        self.status
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ClockConfig) {
        self.config = config;
    }

    /// Start the clock, recording the wall-clock reference instant
    ///
    /// Authority is the caller's concern: only a privileged client holding
    /// primary status may start the canonical clock.
    pub fn start_at(&mut self, now: Instant) -> ClockStatus {
        if self.status != ClockStatus::Started {
            self.status = ClockStatus::Started;
            self.last_tick = Some(now);
            self.last_persist.get_or_insert(now);
        }
        self.status
    }

    pub fn start(&mut self) -> ClockStatus {
        self.start_at(Instant::now())
    }

    /// Stop the clock and drop all accumulated state. Idempotent.
    pub fn stop(&mut self) -> ClockStatus {
        self.status = ClockStatus::Stopped;
        self.last_tick = None;
        self.last_persist = None;
        self.fractional = 0.0;
        self.status
    }

    /// Pause a running clock without discarding its reference state
    pub fn pause(&mut self) -> ClockStatus {
        if self.status == ClockStatus::Started {
            self.status = ClockStatus::Paused;
        }
        self.status
    }

    /// Resume a paused clock from a fresh reference instant
    pub fn resume_at(&mut self, now: Instant) -> ClockStatus {
        if self.status == ClockStatus::Paused {
            self.status = ClockStatus::Started;
            self.last_tick = Some(now);
        }
        self.status
    }

    pub fn resume(&mut self) -> ClockStatus {
        self.resume_at(Instant::now())
    }

    /// Report the host's pause/combat state
    ///
    /// With pause unification enabled, a running clock pauses automatically
    /// while the host is paused and resumes when it unpauses, without ever
    /// transitioning through Stopped. Returns the new status when it changed.
    pub fn set_host_paused_at(&mut self, paused: bool, now: Instant) -> Option<ClockStatus> {
        self.host_paused = paused;
        if !self.config.unify_with_host_pause {
            return None;
        }
        match (self.status, paused) {
            (ClockStatus::Started, true) => Some(self.pause()),
            (ClockStatus::Paused, false) => Some(self.resume_at(now)),
            _ => None,
        }
    }

    pub fn set_host_paused(&mut self, paused: bool) -> Option<ClockStatus> {
        self.set_host_paused_at(paused, Instant::now())
    }

    /// Advance the clock to `now`
    ///
    /// Returns the whole game seconds accrued (elapsed real time times the
    /// configured ratio, with the sub-second remainder carried forward) and
    /// whether the persistence cadence fired.
    pub fn tick_at(&mut self, now: Instant) -> ClockTick {
        if self.status != ClockStatus::Started {
            return ClockTick::default();
        }

        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return ClockTick::default();
        };

        let elapsed = now.saturating_duration_since(last).min(MAX_TICK_GAP);
        self.last_tick = Some(now);

        let gained =
            elapsed.as_secs_f64() * self.config.game_seconds_per_real_second + self.fractional;
        let whole = gained.floor();
        self.fractional = gained - whole;

        let persist_due = match self.last_persist {
            Some(last_persist)
                if now.saturating_duration_since(last_persist) >= self.config.persist_interval =>
            {
                self.last_persist = Some(now);
                true
            }
            None => {
                self.last_persist = Some(now);
                false
            }
            _ => false,
        };

        ClockTick {
            game_seconds: whole as i64,
            persist_due,
        }
    }

    pub fn tick(&mut self) -> ClockTick {
        self.tick_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_clock_accrues_nothing() {
        let mut engine = ClockEngine::new(ClockConfig::default());
        let t0 = Instant::now();
        let tick = engine.tick_at(t0 + Duration::from_secs(5));
        assert_eq!(tick, ClockTick::default());
        assert_eq!(engine.status(), ClockStatus::Stopped);
    }

    #[test]
    fn test_started_clock_accrues_real_time() {
        let mut engine = ClockEngine::new(ClockConfig::default());
        let t0 = Instant::now();
        engine.start_at(t0);
        let tick = engine.tick_at(t0 + Duration::from_secs(3));
        assert_eq!(tick.game_seconds, 3);
    }

    #[test]
    fn test_ratio_scales_game_time() {
        let config = ClockConfig {
            game_seconds_per_real_second: 2.5,
            ..Default::default()
        };
        let mut engine = ClockEngine::new(config);
        let t0 = Instant::now();
        engine.start_at(t0);
        let tick = engine.tick_at(t0 + Duration::from_secs(2));
        assert_eq!(tick.game_seconds, 5);
    }

    #[test]
    fn test_fractional_seconds_carry_between_ticks() {
        let config = ClockConfig {
            game_seconds_per_real_second: 0.5,
            ..Default::default()
        };
        let mut engine = ClockEngine::new(config);
        let t0 = Instant::now();
        engine.start_at(t0);

        let first = engine.tick_at(t0 + Duration::from_secs(1));
        assert_eq!(first.game_seconds, 0);
        let second = engine.tick_at(t0 + Duration::from_secs(2));
        assert_eq!(second.game_seconds, 1);
    }

    #[test]
    fn test_tick_gap_is_clamped() {
        let mut engine = ClockEngine::new(ClockConfig::default());
        let t0 = Instant::now();
        engine.start_at(t0);
        // An hour-long stall (host suspend) does not dump an hour of game time
        let tick = engine.tick_at(t0 + Duration::from_secs(3600));
        assert_eq!(tick.game_seconds, MAX_TICK_GAP.as_secs() as i64);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut engine = ClockEngine::new(ClockConfig::default());
        engine.start();
        assert_eq!(engine.stop(), ClockStatus::Stopped);
        assert_eq!(engine.stop(), ClockStatus::Stopped);
    }

    #[test]
    fn test_pause_resume_cycle() {
        let mut engine = ClockEngine::new(ClockConfig::default());
        let t0 = Instant::now();
        engine.start_at(t0);
        assert_eq!(engine.pause(), ClockStatus::Paused);

        // Paused time accrues nothing
        let tick = engine.tick_at(t0 + Duration::from_secs(5));
        assert_eq!(tick.game_seconds, 0);

        engine.resume_at(t0 + Duration::from_secs(5));
        let tick = engine.tick_at(t0 + Duration::from_secs(7));
        assert_eq!(tick.game_seconds, 2);
    }

    #[test]
    fn test_pause_from_stopped_stays_stopped() {
        let mut engine = ClockEngine::new(ClockConfig::default());
        assert_eq!(engine.pause(), ClockStatus::Stopped);
        assert_eq!(engine.resume(), ClockStatus::Stopped);
    }

    #[test]
    fn test_host_pause_unification() {
        let config = ClockConfig {
            unify_with_host_pause: true,
            ..Default::default()
        };
        let mut engine = ClockEngine::new(config);
        let t0 = Instant::now();
        engine.start_at(t0);

        assert_eq!(
            engine.set_host_paused_at(true, t0 + Duration::from_secs(1)),
            Some(ClockStatus::Paused)
        );
        assert_eq!(
            engine.set_host_paused_at(false, t0 + Duration::from_secs(4)),
            Some(ClockStatus::Started)
        );
        // Time while host-paused never accrued
        let tick = engine.tick_at(t0 + Duration::from_secs(6));
        assert_eq!(tick.game_seconds, 2);
    }

    #[test]
    fn test_host_pause_ignored_without_unification() {
        let mut engine = ClockEngine::new(ClockConfig::default());
        engine.start();
        assert_eq!(engine.set_host_paused(true), None);
        assert_eq!(engine.status(), ClockStatus::Started);
    }

    #[test]
    fn test_persistence_cadence_is_slower_than_ticks() {
        let config = ClockConfig {
            persist_interval: Duration::from_secs(10),
            ..Default::default()
        };
        let mut engine = ClockEngine::new(config);
        let t0 = Instant::now();
        engine.start_at(t0);

        let mut persists = 0;
        for i in 1..=30 {
            let tick = engine.tick_at(t0 + Duration::from_secs(i));
            if tick.persist_due {
                persists += 1;
            }
        }
        assert_eq!(persists, 3);
    }
}
