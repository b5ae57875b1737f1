//! Leader election
//!
//! At most one privileged client should hold time authority at a stable
//! point in time. A starting client probes the channel and arms a
//! single-shot deadline; an existing authority answers, and silence means
//! the channel has none.
//!
//! Cancellation of the pending self-promotion is cooperative: receiving an
//! answer sets a flag that the deadline re-checks when it fires, it never
//! disarms the deadline itself. Two clients whose deadlines expire before
//! either sees the other's announcement will both promote; the protocol
//! accepts that race and leaves recovery to a host reload.

use std::time::{Duration, Instant};

/// Election configuration
#[derive(Clone, Copy, Debug)]
pub struct ElectionConfig {
    /// How long to wait for an existing authority to answer the probe
    pub timeout: Duration,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        ElectionConfig {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Per-client authority state
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ElectionState {
    /// Never probed (non-privileged clients stay here)
    #[default]
    Unknown,
    /// Probe sent, deadline armed
    Checking,
    /// This client is the time authority
    Primary,
    /// Another client is the time authority
    Secondary,
}

/// The election state machine for one client
#[derive(Debug)]
pub struct Election {
    config: ElectionConfig,
    state: ElectionState,
    /// Armed by `begin`, consumed when it fires
    deadline: Option<Instant>,
    /// Set on any authority answer; checked when the deadline fires
    response_seen: bool,
}

impl Election {
    pub fn new(config: ElectionConfig) -> Self {
        Election {
            config,
            state: ElectionState::Unknown,
            deadline: None,
            response_seen: false,
        }
    }

    pub fn state(&self) -> ElectionState {
        self.state
    }

    #[inline]
    pub fn is_primary(&self) -> bool {
        self.state == ElectionState::Primary
    }

    /// Start checking for an existing authority
    ///
    /// The caller broadcasts the probe; this arms the single-shot deadline.
    pub fn begin_at(&mut self, now: Instant) {
        self.state = ElectionState::Checking;
        self.response_seen = false;
        self.deadline = Some(now + self.config.timeout);
    }

    pub fn begin(&mut self) {
        self.begin_at(Instant::now());
    }

    /// Record an "I am primary" answer
    ///
    /// A checking client concedes immediately; an already-secondary client
    /// is reaffirmed without contest. A client that has already promoted
    /// itself stays primary - the dual-authority race is not resolved here.
    pub fn note_primary_response(&mut self) {
        self.response_seen = true;
        match self.state {
            ElectionState::Checking | ElectionState::Unknown => {
                self.state = ElectionState::Secondary;
            }
            ElectionState::Secondary | ElectionState::Primary => {}
        }
    }

    /// Fire the deadline if it is due
    ///
    /// Returns true when the client just promoted itself: no answer arrived
    /// before the deadline, so it unilaterally takes authority. The caller
    /// must broadcast the promotion and reset the clock to stopped, since
    /// the previous authority may have disconnected mid-run.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        if now < deadline {
            return false;
        }
        // Single shot: the deadline fires exactly once, and only now does
        // it consult the cancellation flag.
        self.deadline = None;
        if self.response_seen {
            return false;
        }
        self.state = ElectionState::Primary;
        true
    }

    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }
}

impl Default for Election {
    fn default() -> Self {
        Election::new(ElectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn election() -> (Election, Instant) {
        let election = Election::default();
        (election, Instant::now())
    }

    #[test]
    fn test_promotes_after_silent_timeout() {
        let (mut election, t0) = election();
        election.begin_at(t0);
        assert_eq!(election.state(), ElectionState::Checking);

        assert!(!election.poll_at(t0 + Duration::from_secs(4)));
        assert!(election.poll_at(t0 + Duration::from_secs(5)));
        assert_eq!(election.state(), ElectionState::Primary);
    }

    #[test]
    fn test_response_before_deadline_means_secondary() {
        let (mut election, t0) = election();
        election.begin_at(t0);
        election.note_primary_response();
        assert_eq!(election.state(), ElectionState::Secondary);

        // The deadline still fires, finds the flag, and stays quiet
        assert!(!election.poll_at(t0 + Duration::from_secs(6)));
        assert_eq!(election.state(), ElectionState::Secondary);
    }

    #[test]
    fn test_deadline_fires_only_once() {
        let (mut election, t0) = election();
        election.begin_at(t0);
        assert!(election.poll_at(t0 + Duration::from_secs(5)));
        assert!(!election.poll_at(t0 + Duration::from_secs(10)));
        assert_eq!(election.state(), ElectionState::Primary);
    }

    #[test]
    fn test_late_response_reaffirms_secondary() {
        let (mut election, t0) = election();
        election.begin_at(t0);
        election.note_primary_response();
        election.note_primary_response();
        assert_eq!(election.state(), ElectionState::Secondary);
    }

    #[test]
    fn test_late_response_does_not_demote_primary() {
        let (mut election, t0) = election();
        election.begin_at(t0);
        assert!(election.poll_at(t0 + Duration::from_secs(5)));

        // The documented race: another authority announcing itself after
        // promotion does not demote this one.
        election.note_primary_response();
        assert_eq!(election.state(), ElectionState::Primary);
    }

    #[test]
    fn test_unpolled_election_stays_unknown() {
        let (election, _) = election();
        assert_eq!(election.state(), ElectionState::Unknown);
        assert!(!election.is_primary());
    }
}
