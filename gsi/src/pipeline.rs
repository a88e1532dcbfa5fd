use common::{Event, Snapshot};

use crate::{
    damage::DamageLedger,
    events, mapper, raw,
    raw::RawSnapshot,
    rounds::{self, Attributor},
    validator::{self, Finding},
    DigestError,
};

pub const DEFAULT_REGULATION_MAX_ROUNDS: u32 = 13;
pub const DEFAULT_OVERTIME_MAX_ROUNDS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Rounds per regulation half.
    pub regulation_max_rounds: u32,
    /// Rounds per overtime half.
    pub overtime_max_rounds: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            regulation_max_rounds: DEFAULT_REGULATION_MAX_ROUNDS,
            overtime_max_rounds: DEFAULT_OVERTIME_MAX_ROUNDS,
        }
    }
}

impl Config {
    /// Replaces zero round counts by the defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.regulation_max_rounds == 0 {
            self.regulation_max_rounds = DEFAULT_REGULATION_MAX_ROUNDS;
        }
        if self.overtime_max_rounds == 0 {
            self.overtime_max_rounds = DEFAULT_OVERTIME_MAX_ROUNDS;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Digest {
    /// The push was processed. `events` always ends with [`Event::Data`].
    Accepted {
        events: Vec<Event>,
        findings: Vec<Finding>,
    },
    /// Not a match (main menu, loading screen), nothing changed.
    Skipped,
}

impl Digest {
    pub fn events(&self) -> &[Event] {
        match self {
            Self::Accepted { events, .. } => events.as_slice(),
            Self::Skipped => &[],
        }
    }

    /// The accepted snapshot, as carried by the final data event.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.events().iter().rev().find_map(|e| match e {
            Event::Data(snapshot) => Some(snapshot.as_ref()),
            _ => None,
        })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// The per-match state: the last accepted snapshot and the damage ledger.
///
/// Pushes must be digested strictly in order, one at a time.
#[derive(Debug, Default)]
pub struct Pipeline {
    config: Config,
    last: Option<Snapshot>,
    damage: DamageLedger,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config: config.with_defaults(),
            last: None,
            damage: DamageLedger::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The last accepted snapshot.
    pub fn last(&self) -> Option<&Snapshot> {
        self.last.as_ref()
    }

    pub fn damage(&self) -> &DamageLedger {
        &self.damage
    }

    /// Processes one push. On any error the pipeline state is untouched.
    pub fn digest(&mut self, bytes: &[u8]) -> Result<Digest, DigestError> {
        let raw = raw::decode(bytes)?;
        self.digest_raw(&raw)
    }

    pub fn digest_raw(&mut self, raw: &RawSnapshot) -> Result<Digest, DigestError> {
        if !is_match(raw) {
            tracing::debug!("Incomplete game state, likely the main menu");
            return Ok(Digest::Skipped);
        }

        let findings = validator::validate(raw)?;

        let mut snapshot = mapper::map(raw);
        if snapshot.map.name.is_empty() {
            tracing::debug!("Game state without map name");
            return Ok(Digest::Skipped);
        }

        let _span = tracing::debug_span!("digest", map = %snapshot.map.name, round = snapshot.map.round).entered();

        let current = rounds::current_round(
            snapshot.map.round,
            snapshot.round.phase,
            snapshot.map.phase,
        );

        if let Some(ledger) = raw.map.as_ref().and_then(|m| m.round_wins.as_ref()) {
            let attributor = Attributor {
                team_ct: &snapshot.map.team_ct,
                team_t: &snapshot.map.team_t,
                regulation_max_rounds: self.config.regulation_max_rounds,
                overtime_max_rounds: self.config.overtime_max_rounds,
            };
            snapshot.map.rounds = attributor.attribute(current, ledger);
        }

        let previous_map = self.last.as_ref().map(|l| l.map.name.as_str());
        self.damage.accumulate(previous_map, &mut snapshot, current);

        let mut events = match self.last.as_ref() {
            Some(previous) => events::derive(previous, &mut snapshot),
            None => Vec::new(),
        };

        tracing::debug!(events = events.len(), players = snapshot.players.len(), "Processed game state");

        events.push(Event::Data(Box::new(snapshot.clone())));
        self.last = Some(snapshot);

        Ok(Digest::Accepted { events, findings })
    }

    /// Forgets the history, the next push is treated as the first one.
    pub fn reset(&mut self) {
        self.last = None;
        self.damage.clear();
    }
}

/// Every block a push from inside a match carries.
fn is_match(raw: &RawSnapshot) -> bool {
    raw.map.is_some()
        && raw.player.is_some()
        && raw.players.is_some()
        && raw.phase_countdowns.is_some()
        && raw.round.is_some()
        && raw.bomb.is_some()
        && raw.auth.is_some()
        && raw.grenades.is_some()
}
