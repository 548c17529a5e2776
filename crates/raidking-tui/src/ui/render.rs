use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use raidking_core::utils::truncate_string;

use crate::app::{AddPlayerFocus, App, AppState, SaveStatus, MAX_NAME_LENGTH};

use super::roster;
use super::styles;

/// Longest table name shown in the tab bar
const TAB_LABEL_WIDTH: usize = 16;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tables
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    roster::render(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::AddingPlayer => render_add_player_overlay(frame, app),
        AppState::AddingTable => render_add_table_overlay(frame, app),
        AppState::ConfirmingDelete => {
            let name = app.selected_member().map(|m| m.name).unwrap_or_default();
            render_confirm_overlay(
                frame,
                &format!("Delete {} from every table?", truncate_string(&name, 20)),
            );
        }
        AppState::ConfirmingRemoveTable => {
            render_confirm_overlay(
                frame,
                &format!("Remove table {}?", truncate_string(app.active_table_name(), 20)),
            );
        }
        AppState::ConfirmingQuit => render_confirm_overlay(frame, "Are you sure you want to quit?"),
        AppState::Normal | AppState::Searching | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  Raid King";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, table) in app.guild.tables.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        // Only the first nine tables have a number key
        let label = if i < 9 {
            format!("[{}] {}", i + 1, truncate_string(&table.name, TAB_LABEL_WIDTH))
        } else {
            truncate_string(&table.name, TAB_LABEL_WIDTH)
        };
        if i == app.active_table {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn save_status_text(status: &SaveStatus) -> String {
    match status {
        SaveStatus::Loaded(age) => format!("Saved {}", age),
        SaveStatus::Saving => "Saving...".to_string(),
        SaveStatus::Saved => "All changes saved".to_string(),
        SaveStatus::Failed(e) => format!("Save failed: {}", e),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[r] suicide king | [s]tatus | [a]dd | [q]uit";

    let (left_text, left_style) = if matches!(app.state, AppState::Searching) {
        (format!(" /{}▌ ", app.search_query), styles::search_style())
    } else if let Some(ref msg) = app.status_message {
        (format!(" {} ", msg), styles::highlight_style())
    } else if !app.search_query.is_empty() {
        (format!(" Filter: {} ", app.search_query), styles::search_style())
    } else if let SaveStatus::Failed(_) = app.save_status {
        (format!(" {} ", save_status_text(&app.save_status)), styles::error_style())
    } else {
        (format!(" {} ", save_status_text(&app.save_status)), styles::muted_style())
    };

    let right_text = format!(" {} ", shortcuts);
    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 26, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  Raid King", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("↑/↓ j/k", "Move selection"),
        help_line("PgUp/PgDn", "Move a page"),
        help_line("←/→ [/]", "Previous/next table"),
        help_line("1-9", "Jump to table"),
        help_line("/", "Filter by name or class"),
        Line::from(""),
        Line::from(Span::styled(" Roster", styles::highlight_style())),
        help_line("s Enter", "Cycle present/absent/missing"),
        help_line("r", "Suicide king (send to back)"),
        help_line("Space", "Pick up / swap with picked up"),
        help_line("Esc", "Drop picked up member"),
        Line::from(""),
        Line::from(Span::styled(" Manage", styles::highlight_style())),
        help_line("a", "Add player"),
        help_line("d", "Delete player"),
        help_line("t", "Add table"),
        help_line("X", "Remove table"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Text field line shared by the add forms
fn field_line(label: &'static str, value: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(label, styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", value, cursor, width = MAX_NAME_LENGTH),
            style,
        ),
        Span::styled("]", styles::muted_style()),
    ])
}

fn form_error_lines(app: &App) -> Vec<Line<'static>> {
    match app.status_message {
        Some(ref error) => vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", error), styles::error_style())),
        ],
        None => vec![],
    }
}

fn render_add_player_overlay(frame: &mut Frame, app: &App) {
    let height = if app.status_message.is_some() { 11 } else { 9 };
    let area = centered_rect_fixed(54, height, frame.area());
    frame.render_widget(Clear, area);

    let class_focused = app.add_player_focus == AddPlayerFocus::Class;
    let class_label = if class_focused {
        format!("◀ {} ▶", app.new_player_class)
    } else {
        format!("  {}  ", app.new_player_class)
    };
    let class_style = if class_focused {
        styles::class_style(app.new_player_class).patch(styles::selected_style())
    } else {
        styles::class_style(app.new_player_class)
    };

    let mut lines = vec![
        Line::from(""),
        field_line(
            "Name:  ",
            &app.new_player_name,
            app.add_player_focus == AddPlayerFocus::Name,
        ),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("Class: ", styles::muted_style()),
            Span::styled(class_label, class_style),
        ]),
    ];
    lines.extend(form_error_lines(app));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  [Tab]", styles::help_key_style()),
        Span::styled(" field  ", styles::muted_style()),
        Span::styled("[Enter]", styles::help_key_style()),
        Span::styled(" add  ", styles::muted_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));

    let block = Block::default()
        .title(" Add Player ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_add_table_overlay(frame: &mut Frame, app: &App) {
    let height = if app.status_message.is_some() { 9 } else { 7 };
    let area = centered_rect_fixed(54, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        field_line("Name:  ", &app.new_table_name, true),
    ];
    lines.extend(form_error_lines(app));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  [Enter]", styles::help_key_style()),
        Span::styled(" create  ", styles::muted_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));

    let block = Block::default()
        .title(" Add Raid Table ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_confirm_overlay(frame: &mut Frame, question: &str) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to confirm, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed_fits_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect_fixed(46, 10, outer);
        assert_eq!(inner, Rect::new(27, 15, 46, 10));

        // Clamped on tiny terminals
        let small = centered_rect_fixed(46, 10, Rect::new(0, 0, 20, 5));
        assert_eq!((small.width, small.height), (20, 5));
    }

    #[test]
    fn test_save_status_text() {
        assert_eq!(save_status_text(&SaveStatus::Loaded("5m ago".into())), "Saved 5m ago");
        assert_eq!(save_status_text(&SaveStatus::Saving), "Saving...");
        assert_eq!(
            save_status_text(&SaveStatus::Failed("disk full".into())),
            "Save failed: disk full"
        );
    }
}
