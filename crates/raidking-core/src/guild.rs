//! The guild: a registry of players plus the raid tables that list them.
//!
//! Players are owned here. A table's members only carry the player id, so a
//! member whose player is gone is dropped whenever the table is read for
//! display or rewritten.
//!
//! Every mutating operation returns the `Change`s the persistence side has to
//! apply to stay in sync. One user action maps to one batch.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::RosterError;
use crate::models::{
    EnrichedRaidMember, Player, PlayerId, RaidMember, RaidTable, TableId, WowClass,
};
use crate::roster::{manual_swap, renumber, suicide_king_rotate};
use crate::utils::eq_ignore_case;

/// Name of the table every new guild starts with
pub const DEFAULT_TABLE_NAME: &str = "Main Raid";

/// One persistence instruction.
///
/// `ReplaceMembers` is a full replacement of one table's member list and is
/// what reorders produce; the other variants are single upserts or deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Change {
    UpsertPlayer { player: Player },
    RemovePlayer { id: PlayerId },
    UpsertTable { id: TableId, name: String },
    RemoveTable { id: TableId },
    ReplaceMembers { table: TableId, members: Vec<RaidMember> },
    UpsertMember { table: TableId, member: RaidMember },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Guild {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub tables: Vec<RaidTable>,
}

impl Default for Guild {
    fn default() -> Self {
        Self::new()
    }
}

impl Guild {
    /// An empty guild with a single default table
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            tables: vec![RaidTable::new(DEFAULT_TABLE_NAME)],
        }
    }

    /// Make sure there is at least one table to show.
    /// Returns true if a table had to be created.
    pub fn ensure_table(&mut self) -> bool {
        if self.tables.is_empty() {
            self.tables.push(RaidTable::new(DEFAULT_TABLE_NAME));
            true
        } else {
            false
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn table(&self, id: &TableId) -> Option<&RaidTable> {
        self.tables.iter().find(|t| &t.id == id)
    }

    pub fn table_index(&self, id: &TableId) -> Option<usize> {
        self.tables.iter().position(|t| &t.id == id)
    }

    fn table_mut(&mut self, id: &TableId) -> Result<&mut RaidTable, RosterError> {
        self.tables
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| RosterError::UnknownTable(id.clone()))
    }

    /// Members of a table whose player still exists, sorted by order key
    fn live_members(&self, table: &RaidTable) -> Vec<RaidMember> {
        let mut live: Vec<RaidMember> = table
            .members
            .iter()
            .filter(|m| self.player(&m.id).is_some())
            .cloned()
            .collect();
        live.sort_by_key(|m| m.order);
        live
    }

    /// A table's members joined with their players, sorted by order key.
    /// Members whose player no longer exists are left out.
    pub fn members_for(&self, table_id: &TableId) -> Vec<EnrichedRaidMember> {
        let Some(table) = self.table(table_id) else {
            return Vec::new();
        };
        let mut enriched: Vec<EnrichedRaidMember> = table
            .members
            .iter()
            .filter_map(|m| {
                let player = self.player(&m.id);
                if player.is_none() {
                    debug!(table = %table_id, player = %m.id, "Skipping member with no player");
                }
                player.map(|p| EnrichedRaidMember::from_parts(p, m))
            })
            .collect();
        enriched.sort_by_key(|m| m.order);
        enriched
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// Register a player and append them to every table as present.
    ///
    /// Names are trimmed and must be unique ignoring case.
    pub fn add_player(
        &mut self,
        name: &str,
        class: WowClass,
    ) -> Result<(PlayerId, Vec<Change>), RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        if self.players.iter().any(|p| eq_ignore_case(&p.name, name)) {
            return Err(RosterError::duplicate(name));
        }

        let player = Player::new(name, class);
        let id = player.id.clone();
        let mut changes = vec![Change::UpsertPlayer {
            player: player.clone(),
        }];
        self.players.push(player);

        for table in &mut self.tables {
            let member = RaidMember::new(id.clone(), table.next_order());
            changes.push(Change::UpsertMember {
                table: table.id.clone(),
                member: member.clone(),
            });
            table.members.push(member);
        }

        info!(player = %id, name, class = %class, tables = self.tables.len(), "Player added");
        Ok((id, changes))
    }

    /// Remove a player from the registry and from every table.
    ///
    /// Tables that held the player are renumbered so their order keys stay
    /// dense.
    pub fn delete_player(&mut self, id: &PlayerId) -> Result<Vec<Change>, RosterError> {
        let idx = self
            .players
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| RosterError::UnknownPlayer(id.clone()))?;
        self.players.remove(idx);

        let mut changes = vec![Change::RemovePlayer { id: id.clone() }];
        for table in &mut self.tables {
            let before = table.members.len();
            table.members.retain(|m| &m.id != id);
            if table.members.len() != before {
                table.renumber();
                changes.push(Change::ReplaceMembers {
                    table: table.id.clone(),
                    members: table.members.clone(),
                });
            }
        }

        info!(player = %id, "Player deleted");
        Ok(changes)
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Create a table holding every registered player, all present, in
    /// registry order.
    pub fn add_table(&mut self, name: &str) -> Result<(TableId, Vec<Change>), RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }

        let mut table = RaidTable::new(name);
        table.members = self
            .players
            .iter()
            .enumerate()
            .map(|(i, p)| RaidMember::new(p.id.clone(), i as u32 + 1))
            .collect();

        let id = table.id.clone();
        let changes = vec![
            Change::UpsertTable {
                id: id.clone(),
                name: table.name.clone(),
            },
            Change::ReplaceMembers {
                table: id.clone(),
                members: table.members.clone(),
            },
        ];
        self.tables.push(table);

        info!(table = %id, name, "Table added");
        Ok((id, changes))
    }

    /// Remove a table. The last remaining table cannot be removed.
    pub fn remove_table(&mut self, id: &TableId) -> Result<Vec<Change>, RosterError> {
        let idx = self
            .table_index(id)
            .ok_or_else(|| RosterError::UnknownTable(id.clone()))?;
        if self.tables.len() <= 1 {
            return Err(RosterError::LastTable);
        }
        self.tables.remove(idx);

        info!(table = %id, "Table removed");
        Ok(vec![Change::RemoveTable { id: id.clone() }])
    }

    // =========================================================================
    // Roster operations
    // =========================================================================

    /// Advance one member's attendance status
    pub fn toggle_status(
        &mut self,
        table_id: &TableId,
        player: &PlayerId,
    ) -> Result<Vec<Change>, RosterError> {
        let table = self.table_mut(table_id)?;
        let member = table
            .member_mut(player)
            .ok_or_else(|| RosterError::UnknownPlayer(player.clone()))?;
        member.status = member.status.advance();

        debug!(table = %table_id, player = %player, status = %member.status, "Status toggled");
        Ok(vec![Change::UpsertMember {
            table: table_id.clone(),
            member: member.clone(),
        }])
    }

    /// Exchange two members' order keys
    pub fn swap_members(
        &mut self,
        table_id: &TableId,
        a: &PlayerId,
        b: &PlayerId,
    ) -> Result<Vec<Change>, RosterError> {
        let table = self
            .table(table_id)
            .ok_or_else(|| RosterError::UnknownTable(table_id.clone()))?;
        let mut swapped = manual_swap(&self.live_members(table), a, b)?;
        // Pruned dangling members would otherwise leave gaps
        renumber(&mut swapped);

        self.table_mut(table_id)?.members = swapped.clone();
        Ok(vec![Change::ReplaceMembers {
            table: table_id.clone(),
            members: swapped,
        }])
    }

    /// Send a present member to the back of the present queue.
    /// Returns no changes when the rotation does nothing.
    pub fn suicide_king(
        &mut self,
        table_id: &TableId,
        player: &PlayerId,
    ) -> Result<Vec<Change>, RosterError> {
        let table = self
            .table(table_id)
            .ok_or_else(|| RosterError::UnknownTable(table_id.clone()))?;
        let live = self.live_members(table);
        let rotated = suicide_king_rotate(&live, player);
        if rotated == live {
            return Ok(Vec::new());
        }

        self.table_mut(table_id)?.members = rotated.clone();
        info!(table = %table_id, player = %player, "Suicide king");
        Ok(vec![Change::ReplaceMembers {
            table: table_id.clone(),
            members: rotated,
        }])
    }

    // =========================================================================
    // Replaying changes
    // =========================================================================

    /// Apply a change to this document.
    ///
    /// Upserts insert or overwrite, removes of absent items are ignored, and
    /// member changes for an unknown table are dropped.
    pub fn apply(&mut self, change: &Change) {
        match change {
            Change::UpsertPlayer { player } => {
                match self.players.iter_mut().find(|p| p.id == player.id) {
                    Some(existing) => *existing = player.clone(),
                    None => self.players.push(player.clone()),
                }
            }
            Change::RemovePlayer { id } => {
                self.players.retain(|p| &p.id != id);
            }
            Change::UpsertTable { id, name } => match self.table_mut(id) {
                Ok(table) => table.name = name.clone(),
                Err(_) => self.tables.push(RaidTable {
                    id: id.clone(),
                    name: name.clone(),
                    members: Vec::new(),
                }),
            },
            Change::RemoveTable { id } => {
                self.tables.retain(|t| &t.id != id);
            }
            Change::ReplaceMembers { table, members } => {
                if let Ok(table) = self.table_mut(table) {
                    table.members = members.clone();
                }
            }
            Change::UpsertMember { table, member } => {
                if let Ok(table) = self.table_mut(table) {
                    match table.member_mut(&member.id) {
                        Some(existing) => *existing = member.clone(),
                        None => table.members.push(member.clone()),
                    }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
