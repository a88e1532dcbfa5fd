use std::collections::BTreeMap;

use crate::{
    BombRoundState, BombSite, BombState, GrenadeType, MapPhase, Orientation, PhaseType,
    PlayerActivity, RoundOutcome, RoundPhase, Side, WeaponState, WeaponType,
};

/// A position or direction in world space, `[x, y, z]`.
pub type Vector = [f32; 3];

/// One normalized push from the game client.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub provider: Provider,
    pub map: Map,
    pub round: Round,
    /// The player currently observed by the client.
    pub player: Player,
    pub observer: Observer,
    /// Every player in the match, keyed by steam id.
    pub players: BTreeMap<String, Player>,
    pub bomb: Option<Bomb>,
    pub grenades: BTreeMap<GrenadeType, Grenade>,
    pub phase_countdowns: PhaseCountdown,
    pub auth: Auth,
}

impl Snapshot {
    pub fn team(&self, side: Side) -> Option<&Team> {
        self.map.team(side)
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Provider {
    pub name: String,
    pub app_id: i32,
    pub version: i32,
    pub steam_id: String,
    pub timestamp: f64,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Map {
    pub mode: String,
    pub name: String,
    pub phase: MapPhase,
    /// Number of rounds already played on this map.
    pub round: i32,
    pub team_ct: Team,
    pub team_t: Team,
    pub num_matches_to_win_series: i32,
    pub current_spectators: i32,
    pub souvenirs_total: i32,
    /// Round index ("1", "2", ...) to the recorded outcome of that round.
    pub round_wins: BTreeMap<String, RoundOutcome>,
    /// Reconstructed history of every known round, ordered by round.
    pub rounds: Vec<RoundInfo>,
}

impl Map {
    /// The map name without any workshop/path prefix, `workshop/123/de_nuke` -> `de_nuke`.
    pub fn short_name(&self) -> &str {
        short_map_name(&self.name)
    }

    pub fn team(&self, side: Side) -> Option<&Team> {
        match side {
            Side::Ct => Some(&self.team_ct),
            Side::T => Some(&self.team_t),
            Side::Unspecified => None,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> Option<&mut Team> {
        match side {
            Side::Ct => Some(&mut self.team_ct),
            Side::T => Some(&mut self.team_t),
            Side::Unspecified => None,
        }
    }
}

pub fn short_map_name(name: &str) -> &str {
    match name.rfind('/') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Round {
    pub phase: RoundPhase,
    pub win_team: Side,
    pub bomb: BombRoundState,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RoundInfo {
    /// The team that won the round.
    pub team: Team,
    pub round: u32,
    /// The side the winning team played in that round.
    pub side: Side,
    pub outcome: RoundOutcome,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Player {
    pub steam_id: String,
    pub clan: String,
    pub name: String,
    pub observer_slot: Option<i32>,
    pub team: Team,
    pub activity: PlayerActivity,
    pub state: PlayerState,
    /// Keyed by weapon name, e.g. `weapon_ak47`.
    pub weapons: BTreeMap<String, Weapon>,
    pub match_stats: PlayerMatchStats,
    pub position: Vector,
    pub forward: Vector,
}

impl Player {
    pub fn is_alive(&self) -> bool {
        self.state.health > 0
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Observer {
    pub activity: PlayerActivity,
    pub spectarget: String,
    pub position: Vector,
    pub forward: Vector,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Team {
    pub logo: String,
    pub score: i32,
    pub consecutive_round_losses: i32,
    pub timeouts_remaining: i32,
    pub matches_won_this_series: i32,
    pub name: String,
    pub flag: String,
    pub side: Side,
    pub orientation: Orientation,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayerState {
    pub health: i32,
    pub armor: i32,
    pub helmet: bool,
    pub defuse_kit: bool,
    pub flashed: i32,
    pub smoked: i32,
    pub burning: i32,
    pub money: i32,
    pub round_kills: i32,
    pub round_killhs: i32,
    pub round_totaldmg: i32,
    pub equip_value: i32,
    /// Average damage per completed round on the current map.
    pub adr: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Weapon {
    pub name: String,
    pub paint_kit: String,
    #[serde(rename = "type")]
    pub kind: WeaponType,
    pub state: WeaponState,
    pub ammo_clip: i32,
    pub ammo_clip_max: i32,
    pub ammo_reserve: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayerMatchStats {
    pub kills: i32,
    pub assists: i32,
    pub deaths: i32,
    pub mvps: i32,
    pub score: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Auth {
    pub token: String,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bomb {
    pub state: BombState,
    pub countdown: f32,
    /// The carrier, planter or defuser, when the game names one.
    pub player: Option<Player>,
    pub position: Vector,
    pub site: BombSite,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseCountdown {
    pub phase: PhaseType,
    pub phase_ends_in: f32,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Grenade {
    pub owner: String,
    pub position: Vector,
    pub velocity: Vector,
    #[serde(rename = "type")]
    pub kind: GrenadeType,
    pub lifetime: f32,
    pub effect_time: f32,
}
