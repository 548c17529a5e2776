//! Application state management for raidking.
//!
//! This module contains the core `App` struct that owns the authoritative
//! guild, all UI state, and the channel to the background writer that
//! persists change batches.

use std::path::PathBuf;

use raidking_core::utils::contains_ignore_case;
use raidking_core::{
    Change, Config, EnrichedRaidMember, Guild, JsonStore, PlayerId, RosterError, RosterSink,
    TableId, WowClass,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the change batch channel.
/// Each key press produces at most one batch, so 32 is plenty.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for player and table names typed into forms.
pub const MAX_NAME_LENGTH: usize = 32;

/// Number of rows to move on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    AddingPlayer,
    AddingTable,
    ConfirmingDelete,
    ConfirmingRemoveTable,
    ConfirmingQuit,
    Quitting,
}

/// Add-player form focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPlayerFocus {
    Name,
    Class,
}

impl AddPlayerFocus {
    pub fn toggle(&self) -> Self {
        match self {
            AddPlayerFocus::Name => AddPlayerFocus::Class,
            AddPlayerFocus::Class => AddPlayerFocus::Name,
        }
    }
}

/// What the status bar says about persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// Nothing written this session; holds the age of the loaded snapshot
    Loaded(String),
    Saving,
    Saved,
    Failed(String),
}

// ============================================================================
// Background Writer
// ============================================================================

/// Outcome of one change batch, sent back from the writer task
#[derive(Debug)]
enum SaveResult {
    Saved(usize),
    Failed(String),
}

/// Apply change batches to the sink until the sending side is dropped
async fn run_writer<S: RosterSink>(
    mut sink: S,
    mut batches: mpsc::Receiver<Vec<Change>>,
    results: mpsc::UnboundedSender<SaveResult>,
) {
    debug!("Writer task started");
    while let Some(batch) = batches.recv().await {
        let result = match sink.apply(&batch) {
            Ok(()) => SaveResult::Saved(batch.len()),
            Err(e) => {
                error!(error = %e, changes = batch.len(), "Failed to persist changes");
                SaveResult::Failed(e.to_string())
            }
        };
        if results.send(result).is_err() {
            warn!("Save result channel closed");
        }
    }
    debug!("Writer task finished");
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    pub config: Config,
    /// Where `config` is written back; `None` keeps it in memory only
    config_path: Option<PathBuf>,
    pub guild: Guild,

    // UI State
    pub state: AppState,
    pub active_table: usize,
    pub selection: usize,
    pub search_query: String,
    /// Member picked up for a keyboard drag-and-drop swap
    pub grabbed: Option<PlayerId>,

    // Add-player form
    pub new_player_name: String,
    pub new_player_class: WowClass,
    pub add_player_focus: AddPlayerFocus,

    // Add-table form
    pub new_table_name: String,

    // Status
    pub status_message: Option<String>,
    pub save_status: SaveStatus,
    pending_batches: usize,

    // Background writer
    save_tx: Option<mpsc::Sender<Vec<Change>>>,
    save_rx: mpsc::UnboundedReceiver<SaveResult>,
    writer: Option<JoinHandle<()>>,
}

impl App {
    /// Create the app on top of an opened store. The store moves into the
    /// background writer.
    pub fn new(config: Config, store: JsonStore) -> Self {
        let guild = store.guild().clone();
        let age = store.snapshot().age_display();
        let mut app = Self::with_sink(config, guild, store);
        app.save_status = SaveStatus::Loaded(age);
        app.config_path = Config::path()
            .map_err(|e| warn!(error = %e, "Config location unavailable, table choice will not be remembered"))
            .ok();
        app
    }

    /// Create the app with any sink. Must be called inside a tokio runtime.
    pub fn with_sink<S>(config: Config, guild: Guild, sink: S) -> Self
    where
        S: RosterSink + Send + 'static,
    {
        let (save_tx, batches_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        // Unbounded so the writer never waits on the UI while shutting down
        let (results_tx, save_rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(run_writer(sink, batches_rx, results_tx));

        let active_table = config
            .last_table
            .as_ref()
            .and_then(|id| guild.table_index(id))
            .unwrap_or(0);
        debug!(active_table, tables = guild.tables.len(), "App created");

        Self {
            config,
            config_path: None,
            guild,

            state: AppState::Normal,
            active_table,
            selection: 0,
            search_query: String::new(),
            grabbed: None,

            new_player_name: String::new(),
            new_player_class: WowClass::default(),
            add_player_focus: AddPlayerFocus::Name,

            new_table_name: String::new(),

            status_message: None,
            save_status: SaveStatus::Loaded("never".to_string()),
            pending_batches: 0,

            save_tx: Some(save_tx),
            save_rx,
            writer: Some(writer),
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Hand a batch to the writer task
    async fn persist(&mut self, changes: Vec<Change>) {
        if changes.is_empty() {
            return;
        }
        let Some(ref tx) = self.save_tx else {
            warn!("Writer already shut down, dropping changes");
            return;
        };
        if let Err(e) = tx.send(changes).await {
            error!(error = %e, "Failed to queue changes - writer stopped");
            self.save_status = SaveStatus::Failed("writer stopped".to_string());
            return;
        }
        self.pending_batches += 1;
        self.save_status = SaveStatus::Saving;
    }

    /// Drain results from the writer task
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.save_rx.try_recv() {
            self.pending_batches = self.pending_batches.saturating_sub(1);
            match result {
                SaveResult::Saved(count) => {
                    debug!(changes = count, "Changes saved");
                    // The sink retries failed changes, so a later success covers them
                    if self.pending_batches == 0 {
                        self.save_status = SaveStatus::Saved;
                    }
                }
                SaveResult::Failed(e) => {
                    self.save_status = SaveStatus::Failed(e);
                }
            }
        }
    }

    /// Stop the writer after it has flushed every queued batch
    pub async fn shutdown(&mut self) {
        self.save_tx.take();
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.await {
                error!(error = %e, "Writer task failed");
            }
        }
        self.check_background_tasks();
        info!("Writer flushed");
    }

    fn report(&mut self, err: RosterError) {
        warn!(error = %err, "Roster operation rejected");
        self.status_message = Some(err.to_string());
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn active_table_id(&self) -> Option<TableId> {
        self.guild.tables.get(self.active_table).map(|t| t.id.clone())
    }

    pub fn active_table_name(&self) -> &str {
        self.guild
            .tables
            .get(self.active_table)
            .map(|t| t.name.as_str())
            .unwrap_or("")
    }

    fn member_matches_search(member: &EnrichedRaidMember, query: &str) -> bool {
        contains_ignore_case(&member.name, query)
            || contains_ignore_case(member.class.display_name(), query)
    }

    /// Members of the active table in order, filtered by the search query
    pub fn visible_members(&self) -> Vec<EnrichedRaidMember> {
        let Some(table_id) = self.active_table_id() else {
            return Vec::new();
        };
        let mut members = self.guild.members_for(&table_id);
        if !self.search_query.is_empty() {
            let query = self.search_query.to_lowercase();
            members.retain(|m| Self::member_matches_search(m, &query));
        }
        members
    }

    pub fn selected_member(&self) -> Option<EnrichedRaidMember> {
        self.visible_members().into_iter().nth(self.selection)
    }

    /// Display name of the grabbed member, if any
    pub fn grabbed_name(&self) -> Option<&str> {
        self.grabbed
            .as_ref()
            .and_then(|id| self.guild.player(id))
            .map(|p| p.name.as_str())
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_members().len();
        self.selection = self.selection.min(len.saturating_sub(1));
    }

    fn select_member(&mut self, id: &PlayerId) {
        if let Some(pos) = self.visible_members().iter().position(|m| &m.id == id) {
            self.selection = pos;
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn select_next(&mut self, step: usize) {
        let len = self.visible_members().len();
        if len > 0 {
            self.selection = (self.selection + step).min(len - 1);
        }
    }

    pub fn select_last(&mut self) {
        self.selection = self.visible_members().len().saturating_sub(1);
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selection = self.selection.saturating_sub(step);
    }

    pub fn select_table(&mut self, index: usize) {
        if index >= self.guild.tables.len() || index == self.active_table {
            return;
        }
        self.active_table = index;
        self.selection = 0;
        self.grabbed = None;
        self.remember_active_table();
    }

    pub fn next_table(&mut self) {
        let count = self.guild.tables.len();
        if count > 1 {
            self.select_table((self.active_table + 1) % count);
        }
    }

    pub fn prev_table(&mut self) {
        let count = self.guild.tables.len();
        if count > 1 {
            self.select_table((self.active_table + count - 1) % count);
        }
    }

    fn remember_active_table(&mut self) {
        self.config.last_table = self.active_table_id();
        let Some(ref path) = self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            warn!(error = %e, "Failed to save config");
        }
    }

    pub fn start_search(&mut self) {
        self.state = AppState::Searching;
        self.search_query.clear();
        self.selection = 0;
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.selection = 0;
    }

    // =========================================================================
    // Roster actions
    // =========================================================================

    /// Advance the selected member's attendance status
    pub async fn toggle_selected_status(&mut self) {
        let (Some(table), Some(member)) = (self.active_table_id(), self.selected_member()) else {
            return;
        };
        match self.guild.toggle_status(&table, &member.id) {
            Ok(changes) => {
                self.status_message = None;
                self.persist(changes).await;
            }
            Err(e) => self.report(e),
        }
    }

    /// Suicide king the selected member
    pub async fn suicide_king_selected(&mut self) {
        let (Some(table), Some(member)) = (self.active_table_id(), self.selected_member()) else {
            return;
        };
        match self.guild.suicide_king(&table, &member.id) {
            Ok(changes) if changes.is_empty() => {
                let reason = if member.status.is_present() {
                    "is already last"
                } else {
                    "is not present"
                };
                self.status_message = Some(format!("{} {}", member.name, reason));
            }
            Ok(changes) => {
                self.status_message = Some(format!("{} moved to the back", member.name));
                self.persist(changes).await;
                self.select_member(&member.id);
            }
            Err(e) => self.report(e),
        }
    }

    /// Pick up the selected member, or swap with the one already picked up
    pub async fn grab_or_swap(&mut self) {
        let (Some(table), Some(member)) = (self.active_table_id(), self.selected_member()) else {
            return;
        };
        let Some(grabbed) = self.grabbed.take() else {
            self.status_message = Some(format!(
                "Moving {} - select a member and press Space to swap",
                member.name
            ));
            self.grabbed = Some(member.id);
            return;
        };
        if grabbed == member.id {
            self.status_message = None;
            return;
        }
        match self.guild.swap_members(&table, &grabbed, &member.id) {
            Ok(changes) => {
                self.status_message = None;
                self.persist(changes).await;
                self.select_member(&grabbed);
            }
            Err(e) => self.report(e),
        }
    }

    pub fn release_grab(&mut self) {
        if self.grabbed.take().is_some() {
            self.status_message = None;
        }
    }

    /// Delete the selected player from the whole guild
    pub async fn delete_selected_player(&mut self) {
        let Some(member) = self.selected_member() else {
            return;
        };
        match self.guild.delete_player(&member.id) {
            Ok(changes) => {
                if self.grabbed.as_ref() == Some(&member.id) {
                    self.grabbed = None;
                }
                self.status_message = Some(format!("Deleted {}", member.name));
                self.persist(changes).await;
                self.clamp_selection();
            }
            Err(e) => self.report(e),
        }
    }

    /// Remove the active table
    pub async fn remove_active_table(&mut self) {
        let Some(table) = self.active_table_id() else {
            return;
        };
        let name = self.active_table_name().to_string();
        match self.guild.remove_table(&table) {
            Ok(changes) => {
                self.status_message = Some(format!("Removed table {}", name));
                self.persist(changes).await;
                self.active_table = self.active_table.min(self.guild.tables.len().saturating_sub(1));
                self.selection = 0;
                self.grabbed = None;
                self.remember_active_table();
            }
            Err(e) => self.report(e),
        }
    }

    // =========================================================================
    // Forms
    // =========================================================================

    pub fn start_add_player(&mut self) {
        self.state = AppState::AddingPlayer;
        self.new_player_name.clear();
        self.new_player_class = WowClass::default();
        self.add_player_focus = AddPlayerFocus::Name;
        self.status_message = None;
    }

    pub async fn submit_new_player(&mut self) {
        match self.guild.add_player(&self.new_player_name, self.new_player_class) {
            Ok((id, changes)) => {
                self.persist(changes).await;
                self.state = AppState::Normal;
                self.clear_search();
                self.select_member(&id);
                self.status_message = Some(format!("Added {}", self.new_player_name.trim()));
                self.new_player_name.clear();
            }
            // Keep the form open so the name can be fixed
            Err(e) => self.report(e),
        }
    }

    pub fn start_add_table(&mut self) {
        self.state = AppState::AddingTable;
        self.new_table_name.clear();
        self.status_message = None;
    }

    pub async fn submit_new_table(&mut self) {
        match self.guild.add_table(&self.new_table_name) {
            Ok((id, changes)) => {
                self.persist(changes).await;
                self.state = AppState::Normal;
                self.new_table_name.clear();
                if let Some(index) = self.guild.table_index(&id) {
                    self.select_table(index);
                }
            }
            Err(e) => self.report(e),
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a name character should be accepted
pub fn can_add_name_char(current_len: usize, c: char) -> bool {
    current_len < MAX_NAME_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use raidking_core::AttendanceStatus;
    use std::sync::{Arc, Mutex};

    /// Sink that records every batch it is given
    #[derive(Clone, Default)]
    struct RecordingSink {
        batches: Arc<Mutex<Vec<Vec<Change>>>>,
    }

    impl RosterSink for RecordingSink {
        fn apply(&mut self, changes: &[Change]) -> Result<()> {
            self.batches.lock().unwrap().push(changes.to_vec());
            Ok(())
        }
    }

    struct FailingSink;

    impl RosterSink for FailingSink {
        fn apply(&mut self, _changes: &[Change]) -> Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }
    }

    /// Fails its first write, then succeeds
    #[derive(Default)]
    struct FlakySink {
        calls: usize,
    }

    impl RosterSink for FlakySink {
        fn apply(&mut self, _changes: &[Change]) -> Result<()> {
            self.calls += 1;
            if self.calls == 1 {
                return Err(anyhow::anyhow!("disk full"));
            }
            Ok(())
        }
    }

    fn guild_with(names: &[&str]) -> Guild {
        let mut guild = Guild::new();
        for name in names {
            guild.add_player(name, WowClass::Paladin).unwrap();
        }
        guild
    }

    fn visible_names(app: &App) -> Vec<String> {
        app.visible_members().into_iter().map(|m| m.name).collect()
    }

    // -------------------------------------------------------------------------
    // AddPlayerFocus / input validation
    // -------------------------------------------------------------------------

    #[test]
    fn test_add_player_focus_toggle() {
        assert_eq!(AddPlayerFocus::Name.toggle(), AddPlayerFocus::Class);
        assert_eq!(AddPlayerFocus::Class.toggle(), AddPlayerFocus::Name);
    }

    #[test]
    fn test_can_add_name_char() {
        assert!(can_add_name_char(0, 'a'));
        assert!(can_add_name_char(31, 'é'));
        // Exceeds max length
        assert!(!can_add_name_char(32, 'a'));
        // Control characters rejected
        assert!(!can_add_name_char(0, '\x00'));
        assert!(!can_add_name_char(0, '\n'));
        assert!(!can_add_name_char(0, '\t'));
    }

    // -------------------------------------------------------------------------
    // App flows
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_suicide_king_persists_one_batch() {
        let sink = RecordingSink::default();
        let mut app = App::with_sink(Config::default(), guild_with(&["A", "B", "C"]), sink.clone());

        app.suicide_king_selected().await;
        assert_eq!(visible_names(&app), vec!["B", "C", "A"]);
        // Selection follows the rotated member
        assert_eq!(app.selected_member().unwrap().name, "A");

        app.shutdown().await;
        let batches = sink.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert!(matches!(batches[0][0], Change::ReplaceMembers { .. }));
        assert_eq!(app.save_status, SaveStatus::Saved);
    }

    #[tokio::test]
    async fn test_suicide_king_on_absent_member_is_noop() {
        let sink = RecordingSink::default();
        let mut app = App::with_sink(Config::default(), guild_with(&["A", "B"]), sink.clone());

        app.toggle_selected_status().await;
        assert_eq!(app.selected_member().unwrap().status, AttendanceStatus::Absent);
        app.suicide_king_selected().await;
        assert_eq!(visible_names(&app), vec!["A", "B"]);
        assert_eq!(app.status_message.as_deref(), Some("A is not present"));

        app.shutdown().await;
        // Only the toggle reached the sink
        assert_eq!(sink.batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_grab_and_swap() {
        let sink = RecordingSink::default();
        let mut app = App::with_sink(Config::default(), guild_with(&["A", "B", "C"]), sink);

        app.grab_or_swap().await;
        assert_eq!(app.grabbed_name(), Some("A"));
        app.select_next(2);
        app.grab_or_swap().await;

        assert!(app.grabbed.is_none());
        assert_eq!(visible_names(&app), vec!["C", "B", "A"]);
        assert_eq!(app.selected_member().unwrap().name, "A");
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_grab_same_member_releases() {
        let mut app = App::with_sink(Config::default(), guild_with(&["A", "B"]), RecordingSink::default());
        app.grab_or_swap().await;
        app.grab_or_swap().await;
        assert!(app.grabbed.is_none());
        assert_eq!(visible_names(&app), vec!["A", "B"]);
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_add_player_form() {
        let mut app = App::with_sink(Config::default(), guild_with(&["Jaina"]), RecordingSink::default());

        app.start_add_player();
        app.new_player_name = "jaina".to_string();
        app.submit_new_player().await;
        // Duplicate: form stays open with the error shown
        assert_eq!(app.state, AppState::AddingPlayer);
        assert!(app.status_message.as_deref().unwrap().contains("already exists"));

        app.new_player_name = "Thrall".to_string();
        app.new_player_class = WowClass::Shaman;
        app.submit_new_player().await;
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(visible_names(&app), vec!["Jaina", "Thrall"]);
        assert_eq!(app.selected_member().unwrap().class, WowClass::Shaman);
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_search_filters_by_name_and_class() {
        let mut guild = guild_with(&["Jaina", "Thrall"]);
        guild.add_player("Arthas", WowClass::DeathKnight).unwrap();
        let mut app = App::with_sink(Config::default(), guild, RecordingSink::default());

        app.start_search();
        app.search_query = "knight".to_string();
        assert_eq!(visible_names(&app), vec!["Arthas"]);
        app.search_query = "THR".to_string();
        assert_eq!(visible_names(&app), vec!["Thrall"]);
        app.clear_search();
        assert_eq!(visible_names(&app).len(), 3);
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_delete_selected_clamps_selection() {
        let mut app = App::with_sink(Config::default(), guild_with(&["A", "B"]), RecordingSink::default());
        app.select_next(1);
        app.delete_selected_player().await;
        assert_eq!(visible_names(&app), vec!["A"]);
        assert_eq!(app.selection, 0);
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_successful_retry_clears_save_failure() {
        let mut app = App::with_sink(Config::default(), guild_with(&["A"]), FlakySink::default());
        app.toggle_selected_status().await;
        app.toggle_selected_status().await;
        app.shutdown().await;
        assert_eq!(app.save_status, SaveStatus::Saved);
    }

    #[tokio::test]
    async fn test_failed_save_is_reported() {
        let mut app = App::with_sink(Config::default(), guild_with(&["A"]), FailingSink);
        app.toggle_selected_status().await;
        app.shutdown().await;
        assert_eq!(app.save_status, SaveStatus::Failed("disk full".to_string()));
    }

    #[tokio::test]
    async fn test_last_table_cannot_be_removed() {
        let mut app = App::with_sink(Config::default(), guild_with(&["A"]), RecordingSink::default());
        app.remove_active_table().await;
        assert_eq!(app.guild.tables.len(), 1);
        assert_eq!(app.status_message.as_deref(), Some("Cannot remove the last raid table"));
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_changes_reach_json_store_before_shutdown_returns() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        let mut app = App::new(Config::default(), store);
        assert!(matches!(app.save_status, SaveStatus::Loaded(_)));

        app.start_add_player();
        app.new_player_name = "Sylvanas".to_string();
        app.new_player_class = WowClass::Hunter;
        app.submit_new_player().await;
        app.shutdown().await;

        let reopened = JsonStore::open(dir.path()).unwrap();
        assert_eq!(reopened.guild(), &app.guild);
        assert_eq!(reopened.guild().players[0].name, "Sylvanas");
    }

    #[tokio::test]
    async fn test_starts_on_remembered_table() {
        let mut guild = guild_with(&["A"]);
        let (alt, _) = guild.add_table("Alt Raid").unwrap();
        let config = Config {
            last_table: Some(alt),
            ..Config::default()
        };
        let mut app = App::with_sink(config, guild, RecordingSink::default());
        assert_eq!(app.active_table, 1);
        assert_eq!(app.active_table_name(), "Alt Raid");
        app.shutdown().await;
    }
}
