//! The snapshot exactly as the game client pushes it.
//!
//! The client serializes "nothing here" as a literal `false` in a number of
//! places where an object, map or string would otherwise be. Those fields go
//! through the helpers in [`lenient`] so that a `false` (or any other
//! unexpected shape) decodes the same way as an absent field instead of
//! failing the whole push.
//!
//! The `previously` and `added` echoes are not declared at all. They are a
//! partial copy of the snapshot itself and are skipped without being decoded,
//! the pipeline derives deltas from its own history instead.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::DecodeError;

pub fn decode(buf: &[u8]) -> Result<RawSnapshot, DecodeError> {
    let raw = serde_json::from_slice(buf)?;
    Ok(raw)
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawSnapshot {
    pub provider: Option<RawProvider>,
    pub map: Option<RawMap>,
    pub round: Option<RawRound>,
    pub player: Option<RawObservedPlayer>,
    #[serde(rename = "allplayers")]
    pub players: Option<BTreeMap<String, RawPlayer>>,
    pub bomb: Option<RawBomb>,
    #[serde(deserialize_with = "lenient::object_map")]
    pub grenades: Option<BTreeMap<String, RawGrenade>>,
    pub phase_countdowns: Option<RawPhaseCountdown>,
    pub auth: Option<RawAuth>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawProvider {
    pub name: String,
    #[serde(rename = "appid")]
    pub app_id: i32,
    pub version: i32,
    #[serde(rename = "steamid", deserialize_with = "lenient::id")]
    pub steam_id: String,
    pub timestamp: f64,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawMap {
    pub mode: String,
    pub name: String,
    pub phase: String,
    pub round: i32,
    pub team_ct: Option<RawTeam>,
    pub team_t: Option<RawTeam>,
    pub num_matches_to_win_series: i32,
    pub current_spectators: i32,
    pub souvenirs_total: i32,
    #[serde(deserialize_with = "lenient::string_map")]
    pub round_wins: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawTeam {
    pub logo: String,
    pub score: i32,
    pub consecutive_round_losses: i32,
    pub timeouts_remaining: i32,
    pub matches_won_this_series: i32,
    pub name: String,
    pub flag: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRound {
    pub phase: String,
    #[serde(deserialize_with = "lenient::string")]
    pub win_team: String,
    #[serde(deserialize_with = "lenient::string")]
    pub bomb: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawPlayer {
    #[serde(rename = "steamid", deserialize_with = "lenient::id")]
    pub steam_id: String,
    pub clan: String,
    pub name: String,
    #[serde(deserialize_with = "lenient::slot")]
    pub observer_slot: Option<i32>,
    pub team: String,
    pub activity: String,
    pub state: Option<RawPlayerState>,
    #[serde(deserialize_with = "lenient::object_map")]
    pub weapons: Option<BTreeMap<String, RawWeapon>>,
    pub match_stats: Option<RawPlayerMatchStats>,
    #[serde(deserialize_with = "lenient::text")]
    pub position: String,
    #[serde(deserialize_with = "lenient::text")]
    pub forward: String,
}

/// The `player` block: the player the client is currently looking through.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawObservedPlayer {
    #[serde(flatten)]
    pub player: RawPlayer,
    #[serde(deserialize_with = "lenient::id")]
    pub spectarget: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawPlayerState {
    pub health: i32,
    pub armor: i32,
    pub helmet: bool,
    #[serde(alias = "defusekit")]
    pub defuse_kit: bool,
    pub flashed: i32,
    pub smoked: i32,
    pub burning: i32,
    pub money: i32,
    pub round_kills: i32,
    pub round_killhs: i32,
    pub round_totaldmg: i32,
    pub equip_value: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawWeapon {
    pub name: String,
    #[serde(rename = "paintkit")]
    pub paint_kit: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub state: String,
    pub ammo_clip: i32,
    pub ammo_clip_max: i32,
    pub ammo_reserve: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawPlayerMatchStats {
    pub kills: i32,
    pub assists: i32,
    pub deaths: i32,
    pub mvps: i32,
    pub score: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawAuth {
    pub token: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawBomb {
    pub state: String,
    #[serde(deserialize_with = "lenient::text")]
    pub countdown: String,
    /// Steam id of the carrier/planter/defuser.
    #[serde(deserialize_with = "lenient::id")]
    pub player: String,
    #[serde(deserialize_with = "lenient::text")]
    pub position: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawPhaseCountdown {
    pub phase: String,
    #[serde(deserialize_with = "lenient::text")]
    pub phase_ends_in: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawGrenade {
    #[serde(deserialize_with = "lenient::id")]
    pub owner: String,
    #[serde(deserialize_with = "lenient::text")]
    pub position: String,
    #[serde(deserialize_with = "lenient::text")]
    pub velocity: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "lenient::text")]
    pub lifetime: String,
    #[serde(alias = "effect_time", deserialize_with = "lenient::text")]
    pub effecttime: String,
}

mod lenient {
    use std::collections::BTreeMap;

    use serde::{de::DeserializeOwned, Deserialize, Deserializer};
    use serde_json::Value;

    /// A map of objects where single entries may be `false`.
    ///
    /// Entries that are not objects, or objects that do not fit `T`, are
    /// dropped. Anything but an object at the top level counts as absent.
    pub fn object_map<'de, D, T>(deserializer: D) -> Result<Option<BTreeMap<String, T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let entries = match Value::deserialize(deserializer)? {
            Value::Object(entries) => entries,
            _ => return Ok(None),
        };

        let mut result = BTreeMap::new();
        for (key, value) in entries {
            if !value.is_object() {
                continue;
            }

            match T::deserialize(value) {
                Ok(entry) => {
                    result.insert(key, entry);
                }
                Err(e) => {
                    tracing::debug!(?key, "Dropping undecodable entry: {}", e);
                }
            }
        }

        Ok(Some(result))
    }

    /// A map of strings where single entries may be `false`.
    pub fn string_map<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = match Value::deserialize(deserializer)? {
            Value::Object(entries) => entries,
            _ => return Ok(None),
        };

        Ok(Some(
            entries
                .into_iter()
                .filter_map(|(key, value)| match value {
                    Value::String(s) => Some((key, s)),
                    _ => None,
                })
                .collect(),
        ))
    }

    /// A string that may be `false`, which reads as the empty string.
    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            _ => Ok(String::new()),
        }
    }

    /// Numeric data the client sends as text. A bare number is kept as its
    /// textual form so it parses the same way downstream.
    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            _ => Ok(String::new()),
        }
    }

    /// Steam ids show up both as strings and as 64-bit numbers.
    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        text(deserializer)
    }

    pub fn slot<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(n.as_i64().and_then(|v| i32::try_from(v).ok())),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn false_grenades_read_as_absent() {
        let with_false = decode(br#"{"grenades": false}"#).unwrap();
        let without = decode(br#"{}"#).unwrap();

        assert_eq!(with_false, without);
        assert!(with_false.grenades.is_none());
    }

    #[test]
    fn false_grenade_slots_are_dropped() {
        let raw = decode(
            br#"{"grenades": {
                "1": false,
                "2": {"owner": 76561198000000001, "position": "1.0, 2.0, 3.0", "type": "smoke", "lifetime": "1.5", "effecttime": "0.0"},
                "3": 12
            }}"#,
        )
        .unwrap();

        let grenades = raw.grenades.unwrap();
        assert_eq!(1, grenades.len());
        assert_eq!("76561198000000001", grenades["2"].owner);
        assert_eq!("smoke", grenades["2"].kind);
    }

    #[test]
    fn round_fields_accept_false() {
        let raw = decode(br#"{"round": {"phase": "live", "win_team": false, "bomb": false}}"#).unwrap();
        let round = raw.round.unwrap();

        assert_eq!("live", round.phase);
        assert_eq!("", round.win_team);
        assert_eq!("", round.bomb);
    }

    #[test]
    fn round_wins_skip_false_entries() {
        let raw = decode(br#"{"map": {"name": "de_nuke", "round_wins": {"1": "ct_win_elimination", "2": false}}}"#).unwrap();
        let wins = raw.map.unwrap().round_wins.unwrap();

        assert_eq!(1, wins.len());
        assert_eq!("ct_win_elimination", wins["1"]);
    }

    #[test]
    fn player_fields_accept_false() {
        let raw = decode(
            br#"{"allplayers": {"7656": {
                "steamid": false,
                "observer_slot": false,
                "weapons": false,
                "name": "someone"
            }}}"#,
        )
        .unwrap();

        let player = &raw.players.unwrap()["7656"];
        assert_eq!("", player.steam_id);
        assert_eq!(None, player.observer_slot);
        assert_eq!(None, player.weapons);
        assert_eq!("someone", player.name);
    }

    #[test]
    fn bomb_fields_accept_false() {
        let raw = decode(br#"{"bomb": {"state": "carried", "countdown": false, "player": false, "position": "1, 2, 3"}}"#).unwrap();
        let bomb = raw.bomb.unwrap();

        assert_eq!("", bomb.countdown);
        assert_eq!("", bomb.player);
        assert_eq!("1, 2, 3", bomb.position);
    }

    #[test]
    fn echoes_are_ignored() {
        let raw = decode(
            br#"{
                "previously": {"map": {"name": "de_dust2"}, "previously": {"round": {}}},
                "added": false
            }"#,
        )
        .unwrap();

        assert_eq!(RawSnapshot::default(), raw);
    }

    #[test]
    fn malformed_json_fails() {
        assert!(decode(br#"{"map": "#).is_err());
    }
}
