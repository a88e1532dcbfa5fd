use crate::{Map, Player, Snapshot, Team};

/// Outcome of a finished round (or map).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Score {
    pub winner: Team,
    pub loser: Team,
    pub map: Map,
    pub map_end: bool,
}

/// Tag of an [`Event`], used to subscribe to one kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Data,
    RoundEnd,
    MatchEnd,
    Mvp,
    TimeoutStart,
    TimeoutEnd,
    FreezetimeStart,
    FreezetimeEnd,
    IntermissionStart,
    IntermissionEnd,
    BombPlantStart,
    BombPlantStop,
    BombPlanted,
    BombDefused,
    BombExploded,
    DefuseStart,
    DefuseEnd,
}

impl EventKind {
    pub const ALL: [EventKind; 17] = [
        Self::Data,
        Self::RoundEnd,
        Self::MatchEnd,
        Self::Mvp,
        Self::TimeoutStart,
        Self::TimeoutEnd,
        Self::FreezetimeStart,
        Self::FreezetimeEnd,
        Self::IntermissionStart,
        Self::IntermissionEnd,
        Self::BombPlantStart,
        Self::BombPlantStop,
        Self::BombPlanted,
        Self::BombDefused,
        Self::BombExploded,
        Self::DefuseStart,
        Self::DefuseEnd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::RoundEnd => "roundEnd",
            Self::MatchEnd => "matchEnd",
            Self::Mvp => "mvp",
            Self::TimeoutStart => "timeoutStart",
            Self::TimeoutEnd => "timeoutEnd",
            Self::FreezetimeStart => "freezetimeStart",
            Self::FreezetimeEnd => "freezetimeEnd",
            Self::IntermissionStart => "intermissionStart",
            Self::IntermissionEnd => "intermissionEnd",
            Self::BombPlantStart => "bombPlantStart",
            Self::BombPlantStop => "bombPlantStop",
            Self::BombPlanted => "bombPlanted",
            Self::BombDefused => "bombDefused",
            Self::BombExploded => "bombExploded",
            Self::DefuseStart => "defuseStart",
            Self::DefuseEnd => "defuseEnd",
        }
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A semantic event derived from two consecutive snapshots.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    Data(Box<Snapshot>),
    RoundEnd(Score),
    MatchEnd(Score),
    Mvp(Player),
    TimeoutStart(Team),
    TimeoutEnd,
    FreezetimeStart,
    FreezetimeEnd,
    IntermissionStart,
    IntermissionEnd,
    BombPlantStart(Option<Player>),
    BombPlantStop(Option<Player>),
    BombPlanted(Option<Player>),
    BombDefused(Option<Player>),
    BombExploded,
    DefuseStart(Option<Player>),
    DefuseEnd(Option<Player>),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Data(_) => EventKind::Data,
            Self::RoundEnd(_) => EventKind::RoundEnd,
            Self::MatchEnd(_) => EventKind::MatchEnd,
            Self::Mvp(_) => EventKind::Mvp,
            Self::TimeoutStart(_) => EventKind::TimeoutStart,
            Self::TimeoutEnd => EventKind::TimeoutEnd,
            Self::FreezetimeStart => EventKind::FreezetimeStart,
            Self::FreezetimeEnd => EventKind::FreezetimeEnd,
            Self::IntermissionStart => EventKind::IntermissionStart,
            Self::IntermissionEnd => EventKind::IntermissionEnd,
            Self::BombPlantStart(_) => EventKind::BombPlantStart,
            Self::BombPlantStop(_) => EventKind::BombPlantStop,
            Self::BombPlanted(_) => EventKind::BombPlanted,
            Self::BombDefused(_) => EventKind::BombDefused,
            Self::BombExploded => EventKind::BombExploded,
            Self::DefuseStart(_) => EventKind::DefuseStart,
            Self::DefuseEnd(_) => EventKind::DefuseEnd,
        }
    }
}
