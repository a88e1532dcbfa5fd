//! Reconstructs who won every round so far from the map's round ledger.
//!
//! The ledger only knows the winning *side* of a round. The two team records
//! swap sides at every half, so the physical winner is found by comparing the
//! half of the round against the half of round 1, where the `team_ct` record
//! is on the CT side.
//!
//! Once the map is in overtime the client only reports the rounds of the
//! current overtime cycle, keyed `1..=2*overtime`. Every round before the
//! start of the current cycle is left out of the result.

use std::collections::BTreeMap;

use common::{MapPhase, RoundInfo, RoundPhase, Side, Team};

use crate::tables;

/// The round the game is in: the number of played rounds plus the live one,
/// or exactly the played rounds once the round (or the map) is over.
pub fn current_round(played: i32, round_phase: RoundPhase, map_phase: MapPhase) -> u32 {
    let played = played.max(0) as u32;

    if round_phase == RoundPhase::Over || map_phase == MapPhase::GameOver {
        played
    } else {
        played + 1
    }
}

pub struct Attributor<'t> {
    pub team_ct: &'t Team,
    pub team_t: &'t Team,
    pub regulation_max_rounds: u32,
    pub overtime_max_rounds: u32,
}

impl<'t> Attributor<'t> {
    /// One entry per known round in `1..=current`, in round order. Rounds
    /// without a recorded outcome are skipped.
    pub fn attribute(&self, current: u32, ledger: &BTreeMap<String, String>) -> Vec<RoundInfo> {
        (self.cycle_start(current) + 1..=current)
            .filter_map(|round| self.round_win(current, round, ledger))
            .collect()
    }

    fn regulation(&self) -> u32 {
        self.regulation_max_rounds.max(1)
    }

    fn overtime(&self) -> u32 {
        self.overtime_max_rounds.max(1)
    }

    /// The last round before the current overtime cycle, `0` in regulation.
    fn cycle_start(&self, current: u32) -> u32 {
        let regulation_rounds = 2 * self.regulation();
        if current <= regulation_rounds {
            return 0;
        }

        let cycle = 2 * self.overtime();
        let completed_cycles = (current - (regulation_rounds + 1)) / cycle;
        cycle * completed_cycles + regulation_rounds
    }

    fn round_win(&self, current: u32, round: u32, ledger: &BTreeMap<String, String>) -> Option<RoundInfo> {
        let regulation_rounds = 2 * self.regulation();
        let cycle = 2 * self.overtime();

        let mut index = round;
        if current > regulation_rounds {
            if round <= self.cycle_start(current) {
                return None;
            }

            index = (round - (regulation_rounds + 1)) % cycle + 1;
        }

        let outcome = ledger.get(&index.to_string()).filter(|o| !o.is_empty())?;
        let side = winning_side(outcome);

        let same_half = self.half(round) == self.half(1);
        let team = if (side == Side::Ct) == same_half {
            self.team_ct
        } else {
            self.team_t
        };

        Some(RoundInfo {
            team: team.clone(),
            round,
            side,
            outcome: tables::lookup(&tables::ROUND_OUTCOMES, outcome),
        })
    }

    /// `1` or `2`, the half of regulation or of the overtime cycle.
    fn half(&self, round: u32) -> u8 {
        let regulation = self.regulation();
        let overtime = self.overtime();

        let (position, half_length) = if round <= 2 * regulation {
            (round, regulation)
        } else {
            ((round - (2 * regulation + 1)) % (2 * overtime) + 1, overtime)
        };

        if position <= half_length {
            1
        } else {
            2
        }
    }
}

/// Outcomes are spelled `<side>_win_<reason>`.
pub fn winning_side(outcome: &str) -> Side {
    let prefix = outcome.split('_').next().unwrap_or_default();
    tables::lookup(&tables::SIDES, &prefix.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    use common::RoundOutcome;
    use pretty_assertions::assert_eq;

    fn teams() -> (Team, Team) {
        let ct = Team {
            name: "Alpha".to_owned(),
            side: Side::Ct,
            ..Default::default()
        };
        let t = Team {
            name: "Bravo".to_owned(),
            side: Side::T,
            ..Default::default()
        };
        (ct, t)
    }

    fn ledger(rounds: impl IntoIterator<Item = u32>, outcome: &str) -> BTreeMap<String, String> {
        rounds
            .into_iter()
            .map(|r| (r.to_string(), outcome.to_owned()))
            .collect()
    }

    #[test]
    fn current_round_counts_live_round() {
        assert_eq!(5, current_round(4, RoundPhase::Live, MapPhase::Live));
        assert_eq!(5, current_round(4, RoundPhase::FreezeTime, MapPhase::Live));
        assert_eq!(4, current_round(4, RoundPhase::Over, MapPhase::Live));
        assert_eq!(24, current_round(24, RoundPhase::Live, MapPhase::GameOver));
        assert_eq!(1, current_round(0, RoundPhase::Unspecified, MapPhase::Warmup));
    }

    #[test]
    fn regulation_sides_swap_at_half() {
        let (ct, t) = teams();
        let attributor = Attributor {
            team_ct: &ct,
            team_t: &t,
            regulation_max_rounds: 13,
            overtime_max_rounds: 3,
        };

        let rounds = attributor.attribute(24, &ledger(1..=24, "ct_win_elimination"));

        assert_eq!(24, rounds.len());
        for info in rounds.iter() {
            assert_eq!(Side::Ct, info.side);
            assert_eq!(RoundOutcome::CtWinElimination, info.outcome);
            if info.round <= 13 {
                assert_eq!("Alpha", info.team.name, "round {}", info.round);
            } else {
                assert_eq!("Bravo", info.team.name, "round {}", info.round);
            }
        }
        assert_eq!((1..=24).collect::<Vec<_>>(), rounds.iter().map(|r| r.round).collect::<Vec<_>>());
    }

    #[test]
    fn t_wins_map_to_other_team() {
        let (ct, t) = teams();
        let attributor = Attributor {
            team_ct: &ct,
            team_t: &t,
            regulation_max_rounds: 13,
            overtime_max_rounds: 3,
        };

        let rounds = attributor.attribute(15, &ledger([2, 14], "t_win_bomb"));

        assert_eq!(2, rounds.len());
        assert_eq!("Bravo", rounds[0].team.name);
        assert_eq!(Side::T, rounds[0].side);
        assert_eq!("Alpha", rounds[1].team.name);
        assert_eq!(RoundOutcome::TWinBomb, rounds[1].outcome);
    }

    #[test]
    fn holes_are_skipped() {
        let (ct, t) = teams();
        let attributor = Attributor {
            team_ct: &ct,
            team_t: &t,
            regulation_max_rounds: 13,
            overtime_max_rounds: 3,
        };

        let mut wins = ledger(1..=24, "t_win_elimination");
        wins.remove("5");
        wins.insert("7".to_owned(), String::new());

        let rounds = attributor.attribute(25, &wins);

        assert_eq!(22, rounds.len());
        assert!(rounds.iter().all(|r| r.round != 5 && r.round != 7));
    }

    #[test]
    fn overtime_only_reports_current_cycle() {
        let (ct, t) = teams();
        let attributor = Attributor {
            team_ct: &ct,
            team_t: &t,
            regulation_max_rounds: 13,
            overtime_max_rounds: 3,
        };

        // Second round of the first overtime, the client keys it "1" and "2".
        let wins = ledger(1..=2, "ct_win_time");
        let rounds = attributor.attribute(28, &wins);

        assert_eq!(vec![27, 28], rounds.iter().map(|r| r.round).collect::<Vec<_>>());
        assert!(rounds.iter().all(|r| r.team.name == "Alpha"));

        // Fourth round of the cycle is in the second overtime half.
        let wins = ledger(1..=4, "ct_win_time");
        let rounds = attributor.attribute(30, &wins);
        assert_eq!(vec![27, 28, 29, 30], rounds.iter().map(|r| r.round).collect::<Vec<_>>());
        assert_eq!("Bravo", rounds[3].team.name);

        // First round of the second overtime cycle.
        let rounds = attributor.attribute(33, &ledger([1], "t_win_elimination"));
        assert_eq!(1, rounds.len());
        assert_eq!(33, rounds[0].round);
    }

    #[test]
    fn deep_overtime_only_walks_current_cycle() {
        let (ct, t) = teams();
        let attributor = Attributor {
            team_ct: &ct,
            team_t: &t,
            regulation_max_rounds: 13,
            overtime_max_rounds: 3,
        };

        let current = u32::MAX / 2;
        // (current - 27) / 6 completed cycles, the fifth round of the next one.
        let cycle_start = 6 * ((current - 27) / 6) + 26;
        assert_eq!(current - 5, cycle_start);

        let rounds = attributor.attribute(current, &ledger(1..=6, "ct_win_elimination"));

        assert_eq!(
            (cycle_start + 1..=current).collect::<Vec<_>>(),
            rounds.iter().map(|r| r.round).collect::<Vec<_>>()
        );
        assert_eq!(
            vec!["Alpha", "Alpha", "Alpha", "Bravo", "Bravo"],
            rounds.iter().map(|r| r.team.name.as_str()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn side_from_outcome_prefix() {
        assert_eq!(Side::Ct, winning_side("ct_win_defuse"));
        assert_eq!(Side::T, winning_side("t_win_bomb"));
        assert_eq!(Side::Ct, winning_side("ct_win_rescue"));
        assert_eq!(Side::Unspecified, winning_side("draw"));
    }
}
