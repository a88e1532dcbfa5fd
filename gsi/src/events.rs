//! Derives semantic events by diffing two consecutive snapshots.

use common::{Bomb, BombState, Event, MapPhase, PhaseType, Score, Side, Snapshot, Team};

/// Every event the transition from `previous` to `next` produces, in emission
/// order. The trailing [`Event::Data`] is not included.
///
/// `next` is updated in place when a round end is detected, the winner's score
/// is bumped if the client has not counted the round yet.
pub fn derive(previous: &Snapshot, next: &mut Snapshot) -> Vec<Event> {
    let mut events = Vec::new();

    round_end(previous, next, &mut events);
    bomb(previous.bomb.as_ref(), next.bomb.as_ref(), &mut events);
    intermission(previous, next, &mut events);
    freezetime(previous, next, &mut events);
    timeout(previous, next, &mut events);
    mvp(previous, next, &mut events);

    events
}

fn round_end(previous: &Snapshot, next: &mut Snapshot, events: &mut Vec<Event>) {
    if previous.round.win_team != Side::Unspecified || next.round.win_team == Side::Unspecified {
        return;
    }

    let winning_side = if next.round.win_team == Side::Ct {
        Side::Ct
    } else {
        Side::T
    };

    let previous_score = previous.map.team(winning_side).map(|t| t.score);
    let counted = match next.map.team_mut(winning_side) {
        Some(winner) if Some(winner.score) == previous_score => match winner.score.checked_add(1) {
            Some(score) => {
                winner.score = score;
                true
            }
            None => {
                tracing::warn!(score = winner.score, "Winner score can not be incremented");
                false
            }
        },
        _ => false,
    };
    if counted {
        bump_player_teams(next, winning_side);
    }

    let (winner, loser) = match winning_side {
        Side::Ct => (next.map.team_ct.clone(), next.map.team_t.clone()),
        _ => (next.map.team_t.clone(), next.map.team_ct.clone()),
    };

    let score = Score {
        winner,
        loser,
        map: next.map.clone(),
        map_end: next.map.phase == MapPhase::GameOver,
    };

    tracing::info!(
        winner = %score.winner.side,
        loser = %score.loser.side,
        "Round end {}-{}",
        score.winner.score,
        score.loser.score
    );

    let match_end = score.map_end && previous.map.phase != MapPhase::GameOver;
    if match_end {
        tracing::info!(winner = %score.winner.side, "Match end");
        events.push(Event::RoundEnd(score.clone()));
        events.push(Event::MatchEnd(score));
    } else {
        events.push(Event::RoundEnd(score));
    }
}

/// Players carry a copy of their team record, keep it in line with the map's.
fn bump_player_teams(next: &mut Snapshot, side: Side) {
    let team = match next.map.team(side) {
        Some(t) => t.clone(),
        None => return,
    };

    let update = |t: &mut Team| {
        if t.side == side {
            t.score = team.score;
        }
    };

    for player in next.players.values_mut() {
        update(&mut player.team);
    }
    update(&mut next.player.team);
}

/// Transitions of the bomb state machine.
pub fn bomb(previous: Option<&Bomb>, next: Option<&Bomb>, events: &mut Vec<Event>) {
    let next = match next {
        Some(n) => n,
        None => return,
    };

    let previous = match previous {
        Some(p) => p,
        None => {
            if next.state == BombState::Exploded {
                tracing::info!("Bomb exploded");
                events.push(Event::BombExploded);
            }
            return;
        }
    };

    let (from, to) = (previous.state, next.state);

    if from != BombState::Planting && to == BombState::Planting {
        tracing::info!(player = ?holder_name(next), "Bomb plant start");
        events.push(Event::BombPlantStart(next.player.clone()));
    }

    if from == BombState::Planting
        && !matches!(to, BombState::Planting | BombState::Planted | BombState::Defusing)
    {
        tracing::info!(player = ?holder_name(previous), "Bomb plant stop");
        events.push(Event::BombPlantStop(previous.player.clone()));
    }

    if from == BombState::Planting && to == BombState::Planted {
        tracing::info!(player = ?holder_name(previous), "Bomb planted");
        events.push(Event::BombPlanted(previous.player.clone()));
    }

    if from != BombState::Exploded && to == BombState::Exploded {
        tracing::info!("Bomb exploded");
        events.push(Event::BombExploded);
    }

    if from != BombState::Defused && to == BombState::Defused {
        tracing::info!(player = ?holder_name(previous), "Bomb defused");
        events.push(Event::BombDefused(previous.player.clone()));
    }

    if from != BombState::Defusing && to == BombState::Defusing {
        tracing::info!(player = ?holder_name(next), "Defuse start");
        events.push(Event::DefuseStart(next.player.clone()));
    }

    if from == BombState::Defusing && to != BombState::Defusing {
        tracing::info!(player = ?holder_name(previous), "Defuse end");
        events.push(Event::DefuseEnd(previous.player.clone()));
    }
}

fn holder_name(bomb: &Bomb) -> Option<&str> {
    bomb.player.as_ref().map(|p| p.name.as_str())
}

fn intermission(previous: &Snapshot, next: &Snapshot, events: &mut Vec<Event>) {
    let was = previous.map.phase == MapPhase::Intermission;
    let is = next.map.phase == MapPhase::Intermission;

    if is && !was {
        tracing::info!("Intermission start");
        events.push(Event::IntermissionStart);
    } else if was && !is {
        tracing::info!("Intermission end");
        events.push(Event::IntermissionEnd);
    }
}

fn freezetime(previous: &Snapshot, next: &Snapshot, events: &mut Vec<Event>) {
    let was = previous.phase_countdowns.phase == PhaseType::Freezetime;
    let is = next.phase_countdowns.phase == PhaseType::Freezetime;

    if is && !was {
        tracing::info!("Freezetime start");
        events.push(Event::FreezetimeStart);
    } else if was && !is {
        tracing::info!("Freezetime end");
        events.push(Event::FreezetimeEnd);
    }
}

fn timeout(previous: &Snapshot, next: &Snapshot, events: &mut Vec<Event>) {
    let was = previous.phase_countdowns.phase.is_timeout();
    let phase = next.phase_countdowns.phase;

    if phase.is_timeout() && !was {
        let team = if phase == PhaseType::TimeoutCt {
            &next.map.team_ct
        } else {
            &next.map.team_t
        };
        tracing::info!(team = %team.name, side = %team.side, "Timeout start");
        events.push(Event::TimeoutStart(team.clone()));
    }

    if was && !phase.is_timeout() {
        tracing::info!("Timeout end");
        events.push(Event::TimeoutEnd);
    }
}

/// At most one MVP per tick, the first riser in ascending steam id order.
fn mvp(previous: &Snapshot, next: &Snapshot, events: &mut Vec<Event>) {
    let mvp = next.players.iter().find(|(steam_id, player)| {
        previous
            .players
            .get(*steam_id)
            .is_some_and(|before| player.match_stats.mvps > before.match_stats.mvps)
    });

    if let Some((steam_id, player)) = mvp {
        tracing::info!(steam_id = %steam_id, name = %player.name, "MVP");
        events.push(Event::Mvp(player.clone()));
    }
}
