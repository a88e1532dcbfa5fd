use common::{PhaseType, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerDamage {
    pub steam_id: String,
    pub damage: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundDamage {
    pub round: u32,
    pub players: Vec<PlayerDamage>,
}

/// Damage every player dealt in every round of the current map.
#[derive(Debug, Default, Clone)]
pub struct DamageLedger {
    rounds: Vec<RoundDamage>,
}

impl DamageLedger {
    pub fn new() -> Self {
        Self { rounds: Vec::new() }
    }

    pub fn rounds(&self) -> &[RoundDamage] {
        &self.rounds
    }

    pub fn clear(&mut self) {
        self.rounds.clear();
    }

    /// Stores the in-round damage of the given players for `round`, replacing
    /// whatever an earlier push of the same round recorded for them.
    pub fn record<'p, I>(&mut self, round: u32, players: I)
    where
        I: IntoIterator<Item = (&'p str, i32)>,
    {
        let idx = match self.rounds.iter().position(|r| r.round == round) {
            Some(idx) => idx,
            None => {
                self.rounds.push(RoundDamage {
                    round,
                    players: Vec::with_capacity(10),
                });
                self.rounds.len() - 1
            }
        };
        let entry = &mut self.rounds[idx];

        for (steam_id, damage) in players {
            match entry.players.iter_mut().find(|p| p.steam_id == steam_id) {
                Some(existing) => existing.damage = damage,
                None => entry.players.push(PlayerDamage {
                    steam_id: steam_id.to_owned(),
                    damage,
                }),
            };
        }
    }

    fn damage_in(&self, steam_id: &str, round: &RoundDamage) -> i32 {
        round
            .players
            .iter()
            .find(|p| p.steam_id == steam_id)
            .map(|p| p.damage)
            .unwrap_or(0)
    }

    /// Average damage per completed round, i.e. every round before `round`.
    ///
    /// With no completed round yet the plain sum is returned instead, for
    /// round `0` that is the damage recorded for round `0` itself.
    pub fn adr(&self, steam_id: &str, round: u32) -> i32 {
        if round == 0 {
            return clamp(self.total(steam_id, |r| r == 0));
        }

        let total = self.total(steam_id, |r| r < round);
        let completed = i64::from(round - 1);
        if completed == 0 {
            clamp(total)
        } else {
            clamp(total / completed)
        }
    }

    /// Summed in `i64`, the per round values come straight from the client.
    fn total(&self, steam_id: &str, rounds: impl Fn(u32) -> bool) -> i64 {
        self.rounds
            .iter()
            .filter(|r| rounds(r.round))
            .map(|r| i64::from(self.damage_in(steam_id, r)))
            .sum()
    }

    /// Updates the ledger from a freshly mapped snapshot and fills in every
    /// player's ADR.
    ///
    /// The ledger starts over when the map changes and while the first round
    /// has not started yet (warmup or the first freezetime).
    #[tracing::instrument(skip_all, fields(round = round))]
    pub fn accumulate(&mut self, previous_map: Option<&str>, snapshot: &mut Snapshot, round: u32) {
        if previous_map.is_some_and(|name| name != snapshot.map.name) {
            tracing::debug!(map = %snapshot.map.name, "Map changed, resetting damage");
            self.clear();
        }

        let pre_match = snapshot.map.round == 0
            && matches!(
                snapshot.phase_countdowns.phase,
                PhaseType::Warmup | PhaseType::Freezetime
            );
        if pre_match {
            self.clear();
        } else {
            self.record(
                round,
                snapshot
                    .players
                    .values()
                    .map(|p| (p.steam_id.as_str(), p.state.round_totaldmg)),
            );
        }

        for player in snapshot.players.values_mut() {
            player.state.adr = self.adr(&player.steam_id, round);
        }
        snapshot.player.state.adr = self.adr(&snapshot.player.steam_id, round);
    }
}

fn clamp(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
