use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use raidking_core::utils::truncate_string;
use raidking_core::EnrichedRaidMember;

use crate::app::App;
use crate::ui::styles;

/// Name column width before truncation kicks in
const NAME_COLUMN_WIDTH: usize = 24;

/// Render the active raid table - ordered list with a detail panel
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let members = app.visible_members();
    render_member_table(frame, app, &members, chunks[0]);
    render_member_detail(frame, app, members.get(app.selection), chunks[1]);
}

fn render_member_table(frame: &mut Frame, app: &App, members: &[EnrichedRaidMember], area: Rect) {
    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Name"),
        Cell::from("Class"),
        Cell::from("Status"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = members
        .iter()
        .enumerate()
        .map(|(i, member)| {
            let grabbed = app.grabbed.as_ref() == Some(&member.id);
            let style = if grabbed {
                styles::grabbed_style()
            } else if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(format!("{:>3}", member.order)),
                Cell::from(truncate_string(&member.name, NAME_COLUMN_WIDTH)),
                Cell::from(Span::styled(
                    member.class.display_name(),
                    styles::class_style(member.class),
                )),
                Cell::from(Span::styled(
                    member.status.label(),
                    styles::status_style(member.status),
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Percentage(45),
        Constraint::Fill(2),
        Constraint::Length(8),
    ];

    let total = app
        .active_table_id()
        .map(|id| app.guild.members_for(&id).len())
        .unwrap_or(0);
    let title = if app.search_query.is_empty() {
        format!(" {} ({}) ", app.active_table_name(), total)
    } else {
        format!(" {} ({}/{}) ", app.active_table_name(), members.len(), total)
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !members.is_empty() {
        state.select(Some(app.selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_member_detail(
    frame: &mut Frame,
    app: &App,
    selected: Option<&EnrichedRaidMember>,
    area: Rect,
) {
    let content = match selected {
        Some(member) => {
            let mut lines = vec![
                Line::from(Span::styled(member.name.clone(), styles::title_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Class:      ", styles::muted_style()),
                    Span::styled(member.class.display_name(), styles::class_style(member.class)),
                ]),
                Line::from(vec![
                    Span::styled("Status:     ", styles::muted_style()),
                    Span::styled(member.status.label(), styles::status_style(member.status)),
                ]),
                Line::from(vec![
                    Span::styled("Position:   ", styles::muted_style()),
                    Span::raw(member.order.to_string()),
                ]),
            ];

            // Standing in every other table
            let others: Vec<Line> = app
                .guild
                .tables
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != app.active_table)
                .filter_map(|(_, table)| {
                    let standing = app
                        .guild
                        .members_for(&table.id)
                        .into_iter()
                        .find(|m| m.id == member.id)?;
                    Some(Line::from(vec![
                        Span::styled(
                            format!("{:<12}", truncate_string(&table.name, 11)),
                            styles::muted_style(),
                        ),
                        Span::raw(format!("#{} ", standing.order)),
                        Span::styled(standing.status.label(), styles::status_style(standing.status)),
                    ]))
                })
                .collect();

            if !others.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Other Tables", styles::highlight_style())));
                lines.extend(others);
            }

            if let Some(grabbed) = app.grabbed_name() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("Moving {} - [Space] to swap, [Esc] to cancel", grabbed),
                    styles::highlight_style(),
                )));
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "No players yet - press [a] to add one",
            styles::muted_style(),
        ))],
    };

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .title(" Details ")
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}
