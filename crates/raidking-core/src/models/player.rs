use serde::{Deserialize, Serialize};

use super::ids::PlayerId;

/// Playable class. Only used for grouping and colouring in the roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum WowClass {
    #[serde(rename = "Death Knight")]
    DeathKnight,
    #[serde(rename = "Demon Hunter")]
    DemonHunter,
    Druid,
    Evoker,
    Hunter,
    Mage,
    Monk,
    Paladin,
    Priest,
    Rogue,
    Shaman,
    Warlock,
    #[default]
    Warrior,
}

impl WowClass {
    /// Every class, in the order the add-player form offers them
    pub const ALL: [WowClass; 13] = [
        WowClass::DeathKnight,
        WowClass::DemonHunter,
        WowClass::Druid,
        WowClass::Evoker,
        WowClass::Hunter,
        WowClass::Mage,
        WowClass::Monk,
        WowClass::Paladin,
        WowClass::Priest,
        WowClass::Rogue,
        WowClass::Shaman,
        WowClass::Warlock,
        WowClass::Warrior,
    ];

    /// Get the display name for this class.
    pub fn display_name(&self) -> &'static str {
        match self {
            WowClass::DeathKnight => "Death Knight",
            WowClass::DemonHunter => "Demon Hunter",
            WowClass::Druid => "Druid",
            WowClass::Evoker => "Evoker",
            WowClass::Hunter => "Hunter",
            WowClass::Mage => "Mage",
            WowClass::Monk => "Monk",
            WowClass::Paladin => "Paladin",
            WowClass::Priest => "Priest",
            WowClass::Rogue => "Rogue",
            WowClass::Shaman => "Shaman",
            WowClass::Warlock => "Warlock",
            WowClass::Warrior => "Warrior",
        }
    }

    /// Class colour as an RGB triple
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            WowClass::DeathKnight => (0xC4, 0x1E, 0x3A),
            WowClass::DemonHunter => (0xA3, 0x30, 0xC9),
            WowClass::Druid => (0xFF, 0x7C, 0x0A),
            WowClass::Evoker => (0x33, 0x93, 0x7F),
            WowClass::Hunter => (0xAA, 0xD3, 0x72),
            WowClass::Mage => (0x3F, 0xC7, 0xEB),
            WowClass::Monk => (0x00, 0xFF, 0x98),
            WowClass::Paladin => (0xF4, 0x8C, 0xBA),
            WowClass::Priest => (0xFF, 0xFF, 0xFF),
            WowClass::Rogue => (0xFF, 0xF4, 0x68),
            WowClass::Shaman => (0x00, 0x70, 0xDD),
            WowClass::Warlock => (0x87, 0x88, 0xEE),
            WowClass::Warrior => (0xC6, 0x9B, 0x6D),
        }
    }

    /// Next class in `ALL` (wrapping around)
    pub fn next(&self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous class in `ALL` (wrapping around)
    pub fn prev(&self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }
}

impl std::fmt::Display for WowClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A guild member in the registry. Raid tables refer to players by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub class: WowClass,
}

impl Player {
    pub fn new(name: impl Into<String>, class: WowClass) -> Self {
        Self {
            id: PlayerId::generate(),
            name: name.into(),
            class,
        }
    }
}
