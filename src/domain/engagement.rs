use std::collections::HashMap;
use std::fmt;

/// Which binary relationship a toggle flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleKind {
    /// Current user likes a reel.
    Like,
    /// Current user bookmarked a reel.
    Save,
    /// Current user follows a restaurant.
    Follow,
}

impl fmt::Display for ToggleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleKind::Like => write!(f, "like"),
            ToggleKind::Save => write!(f, "save"),
            ToggleKind::Follow => write!(f, "follow"),
        }
    }
}

/// Identity of a toggle: (subject, kind). The subject is a reel id for likes
/// and saves, a restaurant id for follows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToggleKey {
    pub subject: String,
    pub kind: ToggleKind,
}

impl ToggleKey {
    pub fn new(subject: impl Into<String>, kind: ToggleKind) -> Self {
        Self {
            subject: subject.into(),
            kind,
        }
    }

    pub fn like(reel: impl Into<String>) -> Self {
        Self::new(reel, ToggleKind::Like)
    }

    pub fn save(reel: impl Into<String>) -> Self {
        Self::new(reel, ToggleKind::Save)
    }

    pub fn follow(restaurant: impl Into<String>) -> Self {
        Self::new(restaurant, ToggleKind::Follow)
    }
}

impl fmt::Display for ToggleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.subject)
    }
}

/// Committed (server-confirmed) and pending (shown to the user) value of one toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngagementToggleState {
    pub committed: bool,
    pub pending: bool,
    in_flight: u32,
}

impl EngagementToggleState {
    pub fn settled(value: bool) -> Self {
        Self {
            committed: value,
            pending: value,
            in_flight: 0,
        }
    }

    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }
}

/// Receipt for one optimistic application. Carries the value held before this
/// invocation so a failure restores exactly that, not the committed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    pub key: ToggleKey,
    pub previous: bool,
    pub next: bool,
}

/// Emitted whenever a pending value changes (optimistic apply or rollback).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleEvent {
    pub key: ToggleKey,
    pub value: bool,
    pub rolled_back: bool,
}

/// All toggle states of a session. Entries are created lazily and never removed.
#[derive(Debug, Default)]
pub struct ToggleLedger {
    states: HashMap<ToggleKey, EngagementToggleState>,
}

impl ToggleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending value, if the key has ever been seeded or toggled.
    pub fn value(&self, key: &ToggleKey) -> Option<bool> {
        self.states.get(key).map(|state| state.pending)
    }

    pub fn state(&self, key: &ToggleKey) -> Option<&EngagementToggleState> {
        self.states.get(key)
    }

    /// Applies `invert` to the current pending value and records the attempt.
    pub fn begin(&mut self, key: ToggleKey, invert: impl FnOnce(bool) -> bool) -> PendingToggle {
        self.begin_with_baseline(key, None, invert)
    }

    /// Like [`ToggleLedger::begin`], but a key the ledger has never seen starts
    /// from `baseline` (the backend-reported value) instead of `false`.
    pub fn begin_with_baseline(
        &mut self,
        key: ToggleKey,
        baseline: Option<bool>,
        invert: impl FnOnce(bool) -> bool,
    ) -> PendingToggle {
        let state = self
            .states
            .entry(key.clone())
            .or_insert_with(|| EngagementToggleState::settled(baseline.unwrap_or(false)));
        let previous = state.pending;
        let next = invert(previous);
        state.pending = next;
        state.in_flight += 1;
        PendingToggle { key, previous, next }
    }

    pub fn confirm(&mut self, pending: &PendingToggle) {
        let state = self.states.entry(pending.key.clone()).or_default();
        state.committed = pending.next;
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    /// Restores the value held before `pending` was applied and returns it.
    pub fn rollback(&mut self, pending: &PendingToggle) -> bool {
        let state = self.states.entry(pending.key.clone()).or_default();
        state.pending = pending.previous;
        state.in_flight = state.in_flight.saturating_sub(1);
        state.pending
    }

    /// Loads a server-provided value. With a mutation in flight only the
    /// committed value moves so the user's pending intent is kept.
    pub fn seed(&mut self, key: ToggleKey, value: bool) {
        let state = self.states.entry(key).or_default();
        state.committed = value;
        if state.in_flight == 0 {
            state.pending = value;
        }
    }

    pub fn in_flight_total(&self) -> u32 {
        self.states.values().map(|state| state.in_flight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_applies_inversion_immediately() {
        let mut ledger = ToggleLedger::new();
        let pending = ledger.begin(ToggleKey::save("r1"), |current| !current);

        assert!(!pending.previous);
        assert!(pending.next);
        assert_eq!(ledger.value(&ToggleKey::save("r1")), Some(true));
        assert_eq!(ledger.in_flight_total(), 1);
    }

    #[test]
    fn confirm_moves_committed_only() {
        let mut ledger = ToggleLedger::new();
        let key = ToggleKey::like("r1");
        let pending = ledger.begin(key.clone(), |current| !current);
        ledger.confirm(&pending);

        let state = ledger.state(&key).copied().unwrap_or_default();
        assert_eq!(state, EngagementToggleState::settled(true));
    }

    #[test]
    fn rollback_restores_value_before_this_invocation() {
        let mut ledger = ToggleLedger::new();
        let key = ToggleKey::follow("rest_1");
        ledger.seed(key.clone(), false);

        // false -> true, then true -> false before the first resolves
        let first = ledger.begin(key.clone(), |current| !current);
        let second = ledger.begin(key.clone(), |current| !current);
        assert!(second.previous);

        let restored = ledger.rollback(&second);
        assert!(restored, "second rollback restores the first toggle's intent");
        assert_eq!(ledger.value(&key), Some(true));

        ledger.confirm(&first);
        assert_eq!(ledger.state(&key).map(|s| s.committed), Some(true));
        assert_eq!(ledger.in_flight_total(), 0);
    }

    #[test]
    fn seed_keeps_pending_while_in_flight() {
        let mut ledger = ToggleLedger::new();
        let key = ToggleKey::save("r2");
        let _pending = ledger.begin(key.clone(), |current| !current);

        ledger.seed(key.clone(), false);

        let state = ledger.state(&key).copied().unwrap_or_default();
        assert!(!state.committed);
        assert!(state.pending);
    }

    #[test]
    fn baseline_applies_only_to_unknown_keys() {
        let mut ledger = ToggleLedger::new();
        let unknown = ledger.begin_with_baseline(ToggleKey::follow("rest_9"), Some(true), |current| !current);
        assert!(unknown.previous);
        assert!(!unknown.next);

        let key = ToggleKey::follow("rest_1");
        ledger.seed(key.clone(), false);
        let known = ledger.begin_with_baseline(key, Some(true), |current| !current);
        assert!(!known.previous, "a seeded value wins over the baseline");
        assert!(known.next);
    }

    #[test]
    fn seed_without_in_flight_overwrites_both() {
        let mut ledger = ToggleLedger::new();
        let key = ToggleKey::like("r3");
        ledger.seed(key.clone(), true);
        assert_eq!(ledger.state(&key).copied(), Some(EngagementToggleState::settled(true)));
    }
}
