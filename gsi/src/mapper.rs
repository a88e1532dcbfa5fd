//! Converts a [`RawSnapshot`] into the normalized [`Snapshot`].
//!
//! Mapping never fails. Missing blocks become their `Default`, unknown enum
//! strings become `Unspecified` and unparseable numbers become zero.

use std::collections::BTreeMap;

use common::{
    Auth, Bomb, Grenade, Map, Observer, Orientation, PhaseCountdown, Player, PlayerMatchStats,
    PlayerState, Provider, Round, Side, Snapshot, Team, Vector, Weapon,
};

use crate::{
    raw::{
        RawBomb, RawGrenade, RawMap, RawObservedPlayer, RawPhaseCountdown, RawPlayer,
        RawPlayerMatchStats, RawPlayerState, RawProvider, RawRound, RawSnapshot, RawTeam,
        RawWeapon,
    },
    tables::{self, lookup},
};

/// Builds the snapshot. `map.rounds` and the players' ADR are left empty,
/// they depend on history and are filled in by the pipeline.
pub fn map(raw: &RawSnapshot) -> Snapshot {
    let empty = BTreeMap::new();
    let raw_players = raw.players.as_ref().unwrap_or(&empty);

    let map = raw
        .map
        .as_ref()
        .map(|m| map_map(m, ct_orientation(raw_players)))
        .unwrap_or_default();

    let players: BTreeMap<String, Player> = raw_players
        .iter()
        .map(|(steam_id, p)| (steam_id.clone(), player(steam_id, p, &map)))
        .collect();

    let observed = raw.player.as_ref();
    let player = match observed {
        Some(o) => match players.get(&o.player.steam_id) {
            Some(p) => p.clone(),
            None => self::player(&o.player.steam_id, &o.player, &map),
        },
        None => Player::default(),
    };

    let bomb = raw
        .bomb
        .as_ref()
        .map(|b| bomb(b, raw_players, &map));

    Snapshot {
        provider: raw.provider.as_ref().map(provider).unwrap_or_default(),
        round: raw.round.as_ref().map(round).unwrap_or_default(),
        observer: observed.map(observer).unwrap_or_default(),
        grenades: raw.grenades.as_ref().map(grenades).unwrap_or_default(),
        phase_countdowns: raw
            .phase_countdowns
            .as_ref()
            .map(phase_countdown)
            .unwrap_or_default(),
        auth: Auth {
            token: raw.auth.as_ref().map(|a| a.token.clone()).unwrap_or_default(),
        },
        player,
        players,
        bomb,
        map,
    }
}

/// Parses the client's `"x, y, z"` vectors. Anything malformed is the zero
/// vector.
pub fn parse_vector(text: &str) -> Vector {
    if text.is_empty() {
        return [0.0; 3];
    }

    let parts: Vec<_> = text.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        tracing::debug!(?text, "Vector does not have 3 components");
        return [0.0; 3];
    }

    let mut vector = [0.0; 3];
    for (slot, part) in vector.iter_mut().zip(parts) {
        match part.parse::<f32>() {
            Ok(v) if v.is_finite() => *slot = v,
            Ok(v) => {
                tracing::debug!(?text, "Vector component is not finite: {}", v);
                return [0.0; 3];
            }
            Err(e) => {
                tracing::debug!(?text, "Parsing vector component: {}", e);
                return [0.0; 3];
            }
        };
    }
    vector
}

/// Parses a number sent as text, empty or garbage reads as `0`.
pub fn parse_number(field: &'static str, text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }

    match text.trim().parse::<f32>() {
        Ok(v) if v.is_finite() => v,
        Ok(v) => {
            tracing::warn!(field, value = ?text, "Number is not finite: {}", v);
            0.0
        }
        Err(e) => {
            tracing::warn!(field, value = ?text, "Failed to parse number: {}", e);
            0.0
        }
    }
}

fn provider(raw: &RawProvider) -> Provider {
    Provider {
        name: raw.name.clone(),
        app_id: raw.app_id,
        version: raw.version,
        steam_id: raw.steam_id.clone(),
        timestamp: raw.timestamp,
    }
}

fn map_map(raw: &RawMap, ct_orientation: Orientation) -> Map {
    let round_wins = raw
        .round_wins
        .iter()
        .flatten()
        .map(|(round, outcome)| (round.clone(), lookup(&tables::ROUND_OUTCOMES, outcome)))
        .collect();

    Map {
        mode: raw.mode.clone(),
        name: raw.name.clone(),
        phase: lookup(&tables::MAP_PHASES, &raw.phase),
        round: raw.round,
        team_ct: team(raw.team_ct.as_ref(), Side::Ct, ct_orientation),
        team_t: team(raw.team_t.as_ref(), Side::T, ct_orientation.opposite()),
        num_matches_to_win_series: raw.num_matches_to_win_series,
        current_spectators: raw.current_spectators,
        souvenirs_total: raw.souvenirs_total,
        round_wins,
        rounds: Vec::new(),
    }
}

/// A missing team still becomes a team, only its side is known.
fn team(raw: Option<&RawTeam>, side: Side, orientation: Orientation) -> Team {
    let raw = match raw {
        Some(r) => r,
        None => {
            return Team {
                side,
                orientation,
                ..Default::default()
            }
        }
    };

    Team {
        logo: raw.logo.clone(),
        score: raw.score,
        consecutive_round_losses: raw.consecutive_round_losses,
        timeouts_remaining: raw.timeouts_remaining,
        matches_won_this_series: raw.matches_won_this_series,
        name: raw.name.clone(),
        flag: raw.flag.clone(),
        side,
        orientation,
    }
}

/// Observer slots 1-5 are drawn on the left of the HUD, 6-9 and 0 on the right.
fn ct_orientation(players: &BTreeMap<String, RawPlayer>) -> Orientation {
    let mut orientation = Orientation::Unspecified;
    for slot in players
        .values()
        .filter(|p| lookup(&tables::SIDES, &p.team) == Side::Ct)
        .filter_map(|p| p.observer_slot)
        .filter(|slot| *slot >= 0)
    {
        if (1..=5).contains(&slot) {
            return Orientation::Left;
        }
        orientation = Orientation::Right;
    }
    orientation
}

fn round(raw: &RawRound) -> Round {
    Round {
        phase: lookup(&tables::ROUND_PHASES, &raw.phase),
        win_team: lookup(&tables::SIDES, &raw.win_team),
        bomb: lookup(&tables::BOMB_ROUND_STATES, &raw.bomb),
    }
}

fn player(steam_id: &str, raw: &RawPlayer, map: &Map) -> Player {
    let team = match lookup(&tables::SIDES, &raw.team) {
        Side::Ct => map.team_ct.clone(),
        Side::T => map.team_t.clone(),
        Side::Unspecified => {
            if raw.team.is_empty() {
                tracing::debug!(steam_id, "Player without team");
            } else {
                tracing::warn!(steam_id, team = ?raw.team, "Unknown team for player");
            }
            Team::default()
        }
    };

    Player {
        steam_id: steam_id.to_owned(),
        clan: raw.clan.clone(),
        name: raw.name.clone(),
        observer_slot: raw.observer_slot,
        team,
        activity: lookup(&tables::PLAYER_ACTIVITIES, &raw.activity),
        state: raw.state.as_ref().map(player_state).unwrap_or_default(),
        weapons: raw.weapons.as_ref().map(weapons).unwrap_or_default(),
        match_stats: raw.match_stats.as_ref().map(match_stats).unwrap_or_default(),
        position: parse_vector(&raw.position),
        forward: parse_vector(&raw.forward),
    }
}

fn observer(raw: &RawObservedPlayer) -> Observer {
    Observer {
        activity: lookup(&tables::PLAYER_ACTIVITIES, &raw.player.activity),
        spectarget: raw.spectarget.clone(),
        position: parse_vector(&raw.player.position),
        forward: parse_vector(&raw.player.forward),
    }
}

fn player_state(raw: &RawPlayerState) -> PlayerState {
    PlayerState {
        health: raw.health,
        armor: raw.armor,
        helmet: raw.helmet,
        defuse_kit: raw.defuse_kit,
        flashed: raw.flashed,
        smoked: raw.smoked,
        burning: raw.burning,
        money: raw.money,
        round_kills: raw.round_kills,
        round_killhs: raw.round_killhs,
        round_totaldmg: raw.round_totaldmg,
        equip_value: raw.equip_value,
        adr: 0,
    }
}

fn weapons(raw: &BTreeMap<String, RawWeapon>) -> BTreeMap<String, Weapon> {
    raw.values()
        .filter(|w| !w.name.is_empty())
        .map(|w| {
            (
                w.name.clone(),
                Weapon {
                    name: w.name.clone(),
                    paint_kit: w.paint_kit.clone(),
                    kind: lookup(&tables::WEAPON_TYPES, &w.kind),
                    state: lookup(&tables::WEAPON_STATES, &w.state),
                    ammo_clip: w.ammo_clip,
                    ammo_clip_max: w.ammo_clip_max,
                    ammo_reserve: w.ammo_reserve,
                },
            )
        })
        .collect()
}

fn match_stats(raw: &RawPlayerMatchStats) -> PlayerMatchStats {
    PlayerMatchStats {
        kills: raw.kills,
        assists: raw.assists,
        deaths: raw.deaths,
        mvps: raw.mvps,
        score: raw.score,
    }
}

fn bomb(raw: &RawBomb, players: &BTreeMap<String, RawPlayer>, map: &Map) -> Bomb {
    let position = parse_vector(&raw.position);

    let holder = if raw.player.is_empty() {
        None
    } else {
        match players.get(&raw.player) {
            Some(p) => Some(player(&raw.player, p, map)),
            None => {
                tracing::warn!(player = %raw.player, "Bomb player not found in allplayers");
                None
            }
        }
    };

    Bomb {
        state: lookup(&tables::BOMB_STATES, &raw.state),
        countdown: parse_number("bomb.countdown", &raw.countdown),
        player: holder,
        position,
        site: tables::bomb_site(&map.name, &position),
    }
}

fn phase_countdown(raw: &RawPhaseCountdown) -> PhaseCountdown {
    PhaseCountdown {
        phase: lookup(&tables::PHASE_TYPES, &raw.phase),
        phase_ends_in: parse_number("phase_countdowns.phase_ends_in", &raw.phase_ends_in),
    }
}

fn grenade(raw: &RawGrenade) -> Grenade {
    Grenade {
        owner: raw.owner.clone(),
        position: parse_vector(&raw.position),
        velocity: parse_vector(&raw.velocity),
        kind: lookup(&tables::GRENADE_TYPES, &raw.kind),
        lifetime: parse_number("grenades.lifetime", &raw.lifetime),
        effect_time: parse_number("grenades.effecttime", &raw.effecttime),
    }
}

/// Keyed by grenade type; for several grenades of one type the last slot wins.
fn grenades(raw: &BTreeMap<String, RawGrenade>) -> BTreeMap<common::GrenadeType, Grenade> {
    raw.values()
        .map(grenade)
        .map(|g| (g.kind, g))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use common::{BombSite, BombState, GrenadeType, MapPhase, PhaseType, RoundOutcome, WeaponType};
    use pretty_assertions::assert_eq;

    use crate::raw;

    #[test]
    fn vectors() {
        assert_eq!([1.5, -2.0, 300.25], parse_vector("1.5, -2.00, 300.25"));
        assert_eq!([1.0, 2.0, 3.0], parse_vector("1,2,3"));
        assert_eq!([0.0; 3], parse_vector(""));
        assert_eq!([0.0; 3], parse_vector("1.0, 2.0"));
        assert_eq!([0.0; 3], parse_vector("1.0, 2.0, 3.0, 4.0"));
        assert_eq!([0.0; 3], parse_vector("1.0, abc, 3.0"));
        assert_eq!([0.0; 3], parse_vector("1.0, NaN, 2.0"));
        assert_eq!([0.0; 3], parse_vector("inf, 0.0, 0.0"));
    }

    #[test]
    fn numbers() {
        assert_eq!(0.0, parse_number("test", ""));
        assert_eq!(0.0, parse_number("test", "later"));
        assert_eq!(12.5, parse_number("test", "12.5"));
        assert_eq!(0.0, parse_number("test", "nan"));
        assert_eq!(0.0, parse_number("test", "inf"));
        assert_eq!(0.0, parse_number("test", "-infinity"));
        assert_eq!(0.0, parse_number("test", "1e39"));
    }

    #[test]
    fn missing_teams_keep_their_side() {
        let raw = raw::decode(br#"{"map": {"name": "de_dust2", "phase": "live", "round": 1}}"#).unwrap();
        let snapshot = map(&raw);

        assert_eq!(Side::Ct, snapshot.map.team_ct.side);
        assert_eq!(Side::T, snapshot.map.team_t.side);
        assert_eq!(0, snapshot.map.team_ct.score);
        assert_eq!(MapPhase::Live, snapshot.map.phase);
    }

    #[test]
    fn unknown_strings_degrade() {
        let raw = raw::decode(
            br#"{
                "map": {"name": "de_dust2", "phase": "overtime_break", "round_wins": {"1": "ct_win_rescue", "2": "t_win_bomb"}},
                "phase_countdowns": {"phase": "halftime", "phase_ends_in": "3.0"}
            }"#,
        )
        .unwrap();
        let snapshot = map(&raw);

        assert_eq!(MapPhase::Unspecified, snapshot.map.phase);
        assert_eq!(PhaseType::Unspecified, snapshot.phase_countdowns.phase);
        assert_eq!(3.0, snapshot.phase_countdowns.phase_ends_in);
        assert_eq!(RoundOutcome::Unspecified, snapshot.map.round_wins["1"]);
        assert_eq!(RoundOutcome::TWinBomb, snapshot.map.round_wins["2"]);
    }

    #[test]
    fn players_bomb_and_grenades() {
        let raw = raw::decode(
            br#"{
                "map": {"name": "de_dust2", "phase": "live", "round": 4,
                    "team_ct": {"name": "Alpha", "score": 3},
                    "team_t": {"name": "Bravo", "score": 1}},
                "player": {"steamid": "2", "name": "planter", "spectarget": "76561198000000002"},
                "allplayers": {
                    "1": {"name": "defender", "team": "CT", "observer_slot": 1, "state": {"health": 100}},
                    "2": {"name": "planter", "team": "T", "observer_slot": 6,
                        "weapons": {
                            "weapon_0": {"name": "weapon_knife_t", "type": "Knife", "state": "holstered"},
                            "weapon_1": {"name": "weapon_c4", "type": "C4", "state": "active", "ammo_clip": 0},
                            "weapon_2": false
                        },
                        "match_stats": {"kills": 4, "mvps": 1}},
                    "3": {"name": "ghost", "team": "SPECTATOR"}
                },
                "bomb": {"state": "planting", "position": "-1400.0, 2500.0, 100.0", "player": 2, "countdown": "3.1"},
                "grenades": {"100": {"owner": 1, "type": "smoke", "position": "1, 2, 3", "lifetime": "1.25"}}
            }"#,
        )
        .unwrap();
        let snapshot = map(&raw);

        assert_eq!(Orientation::Left, snapshot.map.team_ct.orientation);
        assert_eq!(Orientation::Right, snapshot.map.team_t.orientation);

        let planter = &snapshot.players["2"];
        assert_eq!("2", planter.steam_id);
        assert_eq!("Bravo", planter.team.name);
        assert_eq!(2, planter.weapons.len());
        assert_eq!(WeaponType::C4, planter.weapons["weapon_c4"].kind);
        assert_eq!(4, planter.match_stats.kills);
        assert_eq!(planter, &snapshot.player);
        assert_eq!("76561198000000002", snapshot.observer.spectarget);

        assert_eq!(Team::default(), snapshot.players["3"].team);
        assert!(snapshot.players["1"].is_alive());
        assert!(!snapshot.players["3"].is_alive());

        let bomb = snapshot.bomb.unwrap();
        assert_eq!(BombState::Planting, bomb.state);
        assert_eq!(BombSite::B, bomb.site);
        assert_eq!(3.1, bomb.countdown);
        assert_eq!(Some("planter"), bomb.player.as_ref().map(|p| p.name.as_str()));

        let smoke = &snapshot.grenades[&GrenadeType::Smoke];
        assert_eq!("1", smoke.owner);
        assert_eq!([1.0, 2.0, 3.0], smoke.position);
        assert_eq!(1.25, smoke.lifetime);
    }

    #[test]
    fn false_fields_map_like_absent_ones() {
        let with_false = raw::decode(
            br#"{
                "map": {"name": "de_nuke", "round_wins": false},
                "round": {"phase": "live", "win_team": false, "bomb": false},
                "allplayers": {"1": {"name": "a", "team": "CT", "weapons": false, "observer_slot": false, "steamid": false}},
                "bomb": {"state": "carried", "countdown": false, "player": false},
                "grenades": false
            }"#,
        )
        .unwrap();
        let absent = raw::decode(
            br#"{
                "map": {"name": "de_nuke"},
                "round": {"phase": "live"},
                "allplayers": {"1": {"name": "a", "team": "CT"}},
                "bomb": {"state": "carried"}
            }"#,
        )
        .unwrap();

        assert_eq!(map(&absent), map(&with_false));
    }
}
