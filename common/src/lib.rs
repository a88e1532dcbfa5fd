pub mod events;
pub mod snapshot;

pub use events::{Event, EventKind, Score};
pub use snapshot::*;

/// Declares a closed vocabulary of wire strings.
///
/// Every enum gets an `Unspecified` variant that serializes as the empty
/// string and is used whenever the game sends something we do not know.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            #[default]
            #[serde(rename = "")]
            Unspecified,
            $(
                #[serde(rename = $wire)]
                $variant,
            )*
        }

        impl $name {
            pub const KNOWN: &'static [$name] = &[$($name::$variant),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    Self::Unspecified => "",
                    $(Self::$variant => $wire,)*
                }
            }

            pub fn is_unspecified(&self) -> bool {
                matches!(self, Self::Unspecified)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(Side {
    Ct => "CT",
    T => "T",
});

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Ct => Self::T,
            Self::T => Self::Ct,
            Self::Unspecified => Self::Unspecified,
        }
    }
}

wire_enum!(Orientation {
    Left => "left",
    Right => "right",
});

impl Orientation {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Unspecified => Self::Unspecified,
        }
    }
}

wire_enum!(PlayerActivity {
    Active => "active",
    Menu => "menu",
    TextInput => "textinput",
});

wire_enum!(MapPhase {
    Warmup => "warmup",
    Live => "live",
    Intermission => "intermission",
    GameOver => "gameover",
});

wire_enum!(RoundOutcome {
    CtWinElimination => "ct_win_elimination",
    TWinElimination => "t_win_elimination",
    CtWinTime => "ct_win_time",
    CtWinDefuse => "ct_win_defuse",
    TWinBomb => "t_win_bomb",
});

wire_enum!(BombRoundState {
    Planted => "planted",
    Exploded => "exploded",
    Defused => "defused",
});

wire_enum!(RoundPhase {
    FreezeTime => "freezetime",
    Live => "live",
    Over => "over",
});

wire_enum!(
    /// State of the C4 as reported in the `bomb` block.
    BombState {
        Carried => "carried",
        Dropped => "dropped",
        Planted => "planted",
        Exploded => "exploded",
        Defused => "defused",
        Defusing => "defusing",
        Planting => "planting",
    }
);

wire_enum!(BombSite {
    A => "A",
    B => "B",
});

wire_enum!(PhaseType {
    Freezetime => "freezetime",
    Bomb => "bomb",
    Warmup => "warmup",
    Live => "live",
    Over => "over",
    Defuse => "defuse",
    Paused => "paused",
    TimeoutCt => "timeout_ct",
    TimeoutT => "timeout_t",
});

impl PhaseType {
    pub fn is_timeout(&self) -> bool {
        self.as_str().starts_with("timeout")
    }
}

wire_enum!(GrenadeType {
    Flash => "flash",
    Decoy => "decoy",
    Frag => "frag",
    Smoke => "smoke",
    Molotov => "firebomb",
    Incendiary => "inferno",
});

wire_enum!(WeaponState {
    Active => "active",
    Holstered => "holstered",
    Reloading => "reloading",
});

wire_enum!(WeaponType {
    Knife => "Knife",
    Pistol => "Pistol",
    Grenade => "Grenade",
    Rifle => "Rifle",
    SniperRifle => "SniperRifle",
    C4 => "C4",
    SubmachineGun => "Submachine Gun",
    Shotgun => "Shotgun",
    MachineGun => "Machine Gun",
});
