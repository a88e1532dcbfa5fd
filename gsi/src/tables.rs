//! Closed lookup tables from the client's wire strings to our enums.
//!
//! Anything not listed here maps to the `Unspecified` variant.

use common::{
    BombRoundState, BombSite, BombState, GrenadeType, MapPhase, PhaseType, PlayerActivity,
    RoundOutcome, RoundPhase, Side, Vector, WeaponState, WeaponType,
};

pub fn lookup<T>(table: &phf::Map<&'static str, T>, value: &str) -> T
where
    T: Copy + Default,
{
    table.get(value).copied().unwrap_or_default()
}

pub static SIDES: phf::Map<&'static str, Side> = phf::phf_map! {
    "CT" => Side::Ct,
    "T" => Side::T,
};

pub static PLAYER_ACTIVITIES: phf::Map<&'static str, PlayerActivity> = phf::phf_map! {
    "active" => PlayerActivity::Active,
    "menu" => PlayerActivity::Menu,
    "textinput" => PlayerActivity::TextInput,
};

pub static MAP_PHASES: phf::Map<&'static str, MapPhase> = phf::phf_map! {
    "warmup" => MapPhase::Warmup,
    "live" => MapPhase::Live,
    "intermission" => MapPhase::Intermission,
    "gameover" => MapPhase::GameOver,
};

pub static ROUND_OUTCOMES: phf::Map<&'static str, RoundOutcome> = phf::phf_map! {
    "ct_win_elimination" => RoundOutcome::CtWinElimination,
    "t_win_elimination" => RoundOutcome::TWinElimination,
    "ct_win_time" => RoundOutcome::CtWinTime,
    "ct_win_defuse" => RoundOutcome::CtWinDefuse,
    "t_win_bomb" => RoundOutcome::TWinBomb,
};

pub static BOMB_ROUND_STATES: phf::Map<&'static str, BombRoundState> = phf::phf_map! {
    "planted" => BombRoundState::Planted,
    "exploded" => BombRoundState::Exploded,
    "defused" => BombRoundState::Defused,
};

pub static ROUND_PHASES: phf::Map<&'static str, RoundPhase> = phf::phf_map! {
    "freezetime" => RoundPhase::FreezeTime,
    "live" => RoundPhase::Live,
    "over" => RoundPhase::Over,
};

pub static BOMB_STATES: phf::Map<&'static str, BombState> = phf::phf_map! {
    "carried" => BombState::Carried,
    "dropped" => BombState::Dropped,
    "planted" => BombState::Planted,
    "exploded" => BombState::Exploded,
    "defused" => BombState::Defused,
    "defusing" => BombState::Defusing,
    "planting" => BombState::Planting,
};

pub static PHASE_TYPES: phf::Map<&'static str, PhaseType> = phf::phf_map! {
    "freezetime" => PhaseType::Freezetime,
    "bomb" => PhaseType::Bomb,
    "warmup" => PhaseType::Warmup,
    "live" => PhaseType::Live,
    "over" => PhaseType::Over,
    "defuse" => PhaseType::Defuse,
    "paused" => PhaseType::Paused,
    "timeout_ct" => PhaseType::TimeoutCt,
    "timeout_t" => PhaseType::TimeoutT,
};

pub static GRENADE_TYPES: phf::Map<&'static str, GrenadeType> = phf::phf_map! {
    "flash" => GrenadeType::Flash,
    "decoy" => GrenadeType::Decoy,
    "frag" => GrenadeType::Frag,
    "smoke" => GrenadeType::Smoke,
    "firebomb" => GrenadeType::Molotov,
    "inferno" => GrenadeType::Incendiary,
};

pub static WEAPON_STATES: phf::Map<&'static str, WeaponState> = phf::phf_map! {
    "active" => WeaponState::Active,
    "holstered" => WeaponState::Holstered,
    "reloading" => WeaponState::Reloading,
};

pub static WEAPON_TYPES: phf::Map<&'static str, WeaponType> = phf::phf_map! {
    "Knife" => WeaponType::Knife,
    "Pistol" => WeaponType::Pistol,
    "Grenade" => WeaponType::Grenade,
    "Rifle" => WeaponType::Rifle,
    "SniperRifle" => WeaponType::SniperRifle,
    "C4" => WeaponType::C4,
    "Submachine Gun" => WeaponType::SubmachineGun,
    "Shotgun" => WeaponType::Shotgun,
    "Machine Gun" => WeaponType::MachineGun,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Splits a map into its two bomb sites along a single axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteSplit {
    pub axis: Axis,
    pub threshold: f32,
    /// `true` if site A lies above the threshold, `false` if below.
    pub a_above: bool,
}

impl SiteSplit {
    pub fn site(&self, position: &Vector) -> BombSite {
        let value = match self.axis {
            Axis::X => position[0],
            Axis::Y => position[1],
            Axis::Z => position[2],
        };

        let above = value > self.threshold;
        let below = value < self.threshold;
        if (self.a_above && above) || (!self.a_above && below) {
            BombSite::A
        } else {
            BombSite::B
        }
    }
}

/// Keyed by the map name without its path prefix. Doubles as the list of
/// known competitive maps.
pub static BOMB_SITES: phf::Map<&'static str, SiteSplit> = phf::phf_map! {
    "de_mirage" => SiteSplit { axis: Axis::Y, threshold: -600.0, a_above: false },
    "de_cache" => SiteSplit { axis: Axis::Y, threshold: 0.0, a_above: true },
    "de_overpass" => SiteSplit { axis: Axis::Z, threshold: 400.0, a_above: true },
    "de_nuke" => SiteSplit { axis: Axis::Z, threshold: -500.0, a_above: true },
    "de_dust2" => SiteSplit { axis: Axis::X, threshold: -500.0, a_above: true },
    "de_inferno" => SiteSplit { axis: Axis::X, threshold: 1400.0, a_above: true },
    "de_vertigo" => SiteSplit { axis: Axis::X, threshold: -1400.0, a_above: true },
    "de_train" => SiteSplit { axis: Axis::Y, threshold: -450.0, a_above: true },
    "de_ancient" => SiteSplit { axis: Axis::X, threshold: -500.0, a_above: false },
    "de_anubis" => SiteSplit { axis: Axis::X, threshold: 0.0, a_above: true },
};

/// Infers the bomb site from a position. `map` may still carry its path prefix.
pub fn bomb_site(map: &str, position: &Vector) -> BombSite {
    match BOMB_SITES.get(common::short_map_name(map)) {
        Some(split) => split.site(position),
        None => BombSite::Unspecified,
    }
}

pub fn is_known_map(map: &str) -> bool {
    BOMB_SITES.contains_key(common::short_map_name(map))
}
