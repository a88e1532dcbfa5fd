//! Plausibility checks on a raw snapshot.
//!
//! Only a missing map or a missing phase countdown block fails validation.
//! Everything else is reported as a [`Finding`] and logged, the snapshot is
//! still processed with the values as sent.

use std::collections::BTreeMap;

use crate::{
    raw::{RawMap, RawObservedPlayer, RawPhaseCountdown, RawPlayer, RawPlayerState, RawProvider, RawRound, RawSnapshot, RawTeam},
    tables, ValidationError,
};

const CS2_APP_ID: i32 = 730;
const MAX_PLAYERS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub field: String,
    pub message: String,
}

impl core::fmt::Display for Finding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Default)]
struct Findings(Vec<Finding>);

impl Findings {
    fn report(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let finding = Finding {
            field: field.into(),
            message: message.into(),
        };
        tracing::warn!(field = %finding.field, "{}", finding.message);
        self.0.push(finding);
    }

    fn range(&mut self, field: impl Into<String>, what: &str, value: i32, min: i32, max: i32) {
        if value < min || value > max {
            self.report(field, format!("unusual {}: {} (expected {}..={})", what, value, min, max));
        }
    }
}

pub fn validate(raw: &RawSnapshot) -> Result<Vec<Finding>, ValidationError> {
    let map = raw.map.as_ref().ok_or(ValidationError::MissingMap)?;
    let phase = raw
        .phase_countdowns
        .as_ref()
        .ok_or(ValidationError::MissingPhaseCountdowns)?;

    let mut findings = Findings::default();

    if let Some(players) = raw.players.as_ref() {
        validate_players(&mut findings, players);
    }
    validate_map(&mut findings, map);
    validate_phase_countdowns(&mut findings, phase);
    if let Some(provider) = raw.provider.as_ref() {
        validate_provider(&mut findings, provider);
    }
    if let Some(round) = raw.round.as_ref() {
        validate_round(&mut findings, round);
    }
    if let Some(observed) = raw.player.as_ref() {
        validate_observed(&mut findings, observed);
    }

    Ok(findings.0)
}

fn validate_players(findings: &mut Findings, players: &BTreeMap<String, RawPlayer>) {
    if players.len() > MAX_PLAYERS {
        findings.report("allplayers", format!("unexpected number of players: {}", players.len()));
    }

    for (steam_id, player) in players.iter() {
        validate_player(findings, &format!("allplayers.{}", steam_id), steam_id, player);
    }
}

fn validate_player(findings: &mut Findings, prefix: &str, steam_id: &str, player: &RawPlayer) {
    if steam_id.is_empty() {
        findings.report(prefix, "steam id is empty");
    }

    if player.name.is_empty() {
        findings.report(format!("{}.name", prefix), "player has an empty name");
    } else if player.name.chars().count() > 100 {
        findings.report(format!("{}.name", prefix), "player name is unusually long");
    }

    if let Some(state) = player.state.as_ref() {
        validate_player_state(findings, prefix, state);
    }

    if !player.team.is_empty() && !tables::SIDES.contains_key(player.team.as_str()) {
        findings.report(format!("{}.team", prefix), format!("invalid team assignment: {:?}", player.team));
    }

    if let Some(slot) = player.observer_slot {
        findings.range(format!("{}.observer_slot", prefix), "observer slot", slot, -1, 10);
    }
}

fn validate_player_state(findings: &mut Findings, prefix: &str, state: &RawPlayerState) {
    findings.range(format!("{}.state.health", prefix), "health", state.health, 0, 100);
    findings.range(format!("{}.state.armor", prefix), "armor", state.armor, 0, 100);
    findings.range(format!("{}.state.money", prefix), "money", state.money, 0, 16000);
    findings.range(format!("{}.state.round_kills", prefix), "round kills", state.round_kills, 0, 5);
    if state.round_killhs < 0 || state.round_killhs > state.round_kills {
        findings.report(
            format!("{}.state.round_killhs", prefix),
            format!("{} headshot kills with {} kills", state.round_killhs, state.round_kills),
        );
    }
    findings.range(format!("{}.state.round_totaldmg", prefix), "round damage", state.round_totaldmg, 0, 1000);
    findings.range(format!("{}.state.equip_value", prefix), "equipment value", state.equip_value, 0, 16000);
}

fn validate_map(findings: &mut Findings, map: &RawMap) {
    if !map.name.is_empty() && !tables::is_known_map(&map.name) {
        findings.report("map.name", format!("unknown map: {}", common::short_map_name(&map.name)));
    }

    findings.range("map.round", "round number", map.round, 0, 50);

    match map.team_ct.as_ref() {
        Some(team) => validate_team(findings, "map.team_ct", team),
        None => findings.report("map.team_ct", "team is missing"),
    };
    match map.team_t.as_ref() {
        Some(team) => validate_team(findings, "map.team_t", team),
        None => findings.report("map.team_t", "team is missing"),
    };

    findings.range("map.current_spectators", "spectator count", map.current_spectators, 0, 100);
    findings.range("map.num_matches_to_win_series", "series length", map.num_matches_to_win_series, 0, 5);
}

fn validate_team(findings: &mut Findings, prefix: &str, team: &RawTeam) {
    findings.range(format!("{}.score", prefix), "team score", team.score, 0, 30);
    findings.range(format!("{}.consecutive_round_losses", prefix), "consecutive losses", team.consecutive_round_losses, 0, 15);
    findings.range(format!("{}.timeouts_remaining", prefix), "timeouts remaining", team.timeouts_remaining, 0, 4);
    findings.range(format!("{}.matches_won_this_series", prefix), "matches won", team.matches_won_this_series, 0, 3);
}

fn validate_phase_countdowns(findings: &mut Findings, phase: &RawPhaseCountdown) {
    if !phase.phase.is_empty() && !tables::PHASE_TYPES.contains_key(phase.phase.as_str()) {
        findings.report("phase_countdowns.phase", format!("unknown phase type: {:?}", phase.phase));
    }

    if phase.phase_ends_in.is_empty() {
        return;
    }
    match phase.phase_ends_in.trim().parse::<f64>() {
        Ok(left) if !(-10.0..=300.0).contains(&left) => {
            findings.report("phase_countdowns.phase_ends_in", format!("unusual phase time remaining: {}", left));
        }
        Ok(_) => {}
        Err(_) => {
            findings.report(
                "phase_countdowns.phase_ends_in",
                format!("invalid phase ends in value: {:?}", phase.phase_ends_in),
            );
        }
    };
}

fn validate_provider(findings: &mut Findings, provider: &RawProvider) {
    if provider.app_id != CS2_APP_ID {
        findings.report("provider.appid", format!("unexpected app id: {}", provider.app_id));
    }

    // Anything before 2001 is not a unix timestamp of a live game
    if provider.timestamp > 0.0 && provider.timestamp < 1_000_000_000.0 {
        findings.report("provider.timestamp", format!("unusual timestamp: {}", provider.timestamp));
    }
}

fn validate_round(findings: &mut Findings, round: &RawRound) {
    if !round.phase.is_empty() && !tables::ROUND_PHASES.contains_key(round.phase.as_str()) {
        findings.report("round.phase", format!("unknown round phase: {:?}", round.phase));
    }

    if !round.win_team.is_empty() && !tables::SIDES.contains_key(round.win_team.as_str()) {
        findings.report("round.win_team", format!("invalid win team: {:?}", round.win_team));
    }

    if !round.bomb.is_empty() && !tables::BOMB_ROUND_STATES.contains_key(round.bomb.as_str()) {
        findings.report("round.bomb", format!("unknown bomb state: {:?}", round.bomb));
    }
}

fn validate_observed(findings: &mut Findings, observed: &RawObservedPlayer) {
    let player = &observed.player;
    if !player.steam_id.is_empty() {
        validate_player(findings, "player", &player.steam_id, player);
    }

    let len = observed.spectarget.len();
    if !observed.spectarget.is_empty() && !(10..=20).contains(&len) {
        findings.report("player.spectarget", format!("unusual spectarget steam id length: {}", len));
    }
}
