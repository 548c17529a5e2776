use serde::{Deserialize, Serialize};

use super::ids::{PlayerId, TableId};
use super::player::{Player, WowClass};
use crate::roster::renumber;

/// Attendance for one member of one raid table.
///
/// Clicking a member's status walks the cycle
/// `Present -> Absent -> Missing -> Present`. Only `Present` members take part
/// in the suicide king rotation; the others keep their slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    Missing,
}

impl AttendanceStatus {
    /// The cycle, in click order
    pub const CYCLE: [AttendanceStatus; 3] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Missing,
    ];

    /// Next status in the cycle (wrapping around)
    pub fn advance(self) -> Self {
        match self {
            AttendanceStatus::Present => AttendanceStatus::Absent,
            AttendanceStatus::Absent => AttendanceStatus::Missing,
            AttendanceStatus::Missing => AttendanceStatus::Present,
        }
    }

    pub fn is_present(self) -> bool {
        self == AttendanceStatus::Present
    }

    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Missing => "missing",
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A player's membership record within one raid table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct RaidMember {
    /// The player's registry id
    pub id: PlayerId,
    pub status: AttendanceStatus,
    pub order: u32,
}

impl RaidMember {
    pub fn new(id: PlayerId, order: u32) -> Self {
        Self {
            id,
            status: AttendanceStatus::Present,
            order,
        }
    }
}

/// A named roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct RaidTable {
    pub id: TableId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<RaidMember>,
}

impl RaidTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TableId::generate(),
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn member(&self, id: &PlayerId) -> Option<&RaidMember> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn member_mut(&mut self, id: &PlayerId) -> Option<&mut RaidMember> {
        self.members.iter_mut().find(|m| &m.id == id)
    }

    /// Order key for a member appended at the end, past every existing key
    pub fn next_order(&self) -> u32 {
        self.members.iter().map(|m| m.order).max().unwrap_or(0) + 1
    }

    /// Re-sort by order key and renumber 1..N
    pub fn renumber(&mut self) {
        self.members.sort_by_key(|m| m.order);
        renumber(&mut self.members);
    }
}

/// A raid member joined with its player record, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct EnrichedRaidMember {
    pub id: PlayerId,
    pub name: String,
    pub class: WowClass,
    pub status: AttendanceStatus,
    pub order: u32,
}

impl EnrichedRaidMember {
    pub fn from_parts(player: &Player, member: &RaidMember) -> Self {
        Self {
            id: member.id.clone(),
            name: player.name.clone(),
            class: player.class,
            status: member.status,
            order: member.order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_cycle() {
        assert_eq!(AttendanceStatus::Present.advance(), AttendanceStatus::Absent);
        assert_eq!(AttendanceStatus::Absent.advance(), AttendanceStatus::Missing);
        assert_eq!(AttendanceStatus::Missing.advance(), AttendanceStatus::Present); // Wraps around
    }

    #[test]
    fn test_advance_full_cycle_is_identity() {
        for status in AttendanceStatus::CYCLE {
            let mut s = status;
            for _ in 0..AttendanceStatus::CYCLE.len() {
                s = s.advance();
            }
            assert_eq!(s, status);
        }
    }

    #[test]
    fn test_advance_follows_cycle_order() {
        for (i, status) in AttendanceStatus::CYCLE.iter().enumerate() {
            let expected = AttendanceStatus::CYCLE[(i + 1) % AttendanceStatus::CYCLE.len()];
            assert_eq!(status.advance(), expected);
        }
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AttendanceStatus::Missing).unwrap(), "\"missing\"");
        let status: AttendanceStatus = serde_json::from_str("\"absent\"").unwrap();
        assert_eq!(status, AttendanceStatus::Absent);
    }

    #[test]
    fn test_table_renumber() {
        let mut table = RaidTable::new("Main Raid");
        table.members = vec![
            RaidMember::new(PlayerId::from("c"), 9),
            RaidMember::new(PlayerId::from("a"), 2),
            RaidMember::new(PlayerId::from("b"), 5),
        ];
        table.renumber();
        let ids: Vec<&str> = table.members.iter().map(|m| m.id.as_str()).collect();
        let orders: Vec<u32> = table.members.iter().map(|m| m.order).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_next_order_skips_past_gaps() {
        let mut table = RaidTable::new("Main Raid");
        table.members = vec![
            RaidMember::new(PlayerId::from("b"), 1),
            RaidMember::new(PlayerId::from("a"), 3),
        ];
        assert_eq!(table.next_order(), 4);
    }

    #[test]
    fn test_table_without_members_deserializes() {
        let table: RaidTable = serde_json::from_str(r#"{"id":"t1","name":"Alt Raid"}"#).unwrap();
        assert!(table.members.is_empty());
        assert_eq!(table.next_order(), 1);
    }

    #[test]
    fn test_enriched_from_parts() {
        let player = Player::new("Thrall", WowClass::Shaman);
        let member = RaidMember::new(player.id.clone(), 3);
        let enriched = EnrichedRaidMember::from_parts(&player, &member);
        assert_eq!(enriched.name, "Thrall");
        assert_eq!(enriched.class, WowClass::Shaman);
        assert_eq!(enriched.order, 3);
        assert_eq!(enriched.status, AttendanceStatus::Present);
    }
}
