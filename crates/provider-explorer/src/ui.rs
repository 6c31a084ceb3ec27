use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, Focus, Mode, Stage};
use crate::entities::short_provider_name;

const ELLIPSIS: char = '…';

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Main area
            Constraint::Length(2), // Status bar
        ])
        .split(f.size());

    draw_title_bar(f, app, chunks[0]);

    if app.show_help() {
        draw_help(f, chunks[1]);
    } else {
        match app.stage() {
            Stage::Loading => draw_loading(f, chunks[1]),
            Stage::Browse => draw_browser(f, app, chunks[1]),
            Stage::Export => draw_export(f, app, chunks[1]),
        }
    }

    if app.mode() == Mode::InstancePrompt {
        draw_instance_prompt(f, app, chunks[1]);
    }

    draw_status_bar(f, app, chunks[2]);
}

fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let title = match (app.catalog.provider_name(), app.browser.entity()) {
        (Some(provider), Some(entity)) => format!(
            "  Provider Explorer -- {} / {}",
            short_provider_name(provider),
            entity
        ),
        (Some(provider), None) => {
            format!("  Provider Explorer -- {}", short_provider_name(provider))
        }
        _ => String::from("  Provider Explorer"),
    };

    let title_bar = Paragraph::new(truncate_to_width(&title, area.width as usize))
        .style(
            Style::default()
                .bg(app.config.theme.status_background())
                .fg(Color::White),
        )
        .alignment(Alignment::Left);

    f.render_widget(title_bar, area);
}

fn draw_loading(f: &mut Frame, area: Rect) {
    let loading = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Loading provider schemas...",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(loading, area);
}

fn pane_border(app: &App, focused: bool) -> Style {
    if focused {
        Style::default().fg(app.config.theme.accent())
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_browser(f: &mut Frame, app: &mut App, area: Rect) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    draw_entities(f, app, panes[0]);
    draw_tree(f, app, panes[1]);
}

fn draw_entities(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(pane_border(app, app.focus() == Focus::Entities))
        .title(format!(" {} ({}) ", app.catalog.kind().title(), app.catalog.len()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let show_filter = app.mode() == Mode::Filter || !app.catalog.filter().is_empty();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(if show_filter { 1 } else { 0 }),
        ])
        .split(inner);

    app.catalog.set_height(chunks[0].height as usize);

    let width = chunks[0].width as usize;
    let cursor = app.catalog.cursor();
    let selection_style = Style::default()
        .fg(Color::Black)
        .bg(app.config.theme.selection());

    let lines: Vec<Line> = if app.catalog.is_empty() {
        vec![Line::from(Span::styled(
            "No matching entities",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.catalog
            .window()
            .into_iter()
            .map(|(row, entity)| {
                let text = truncate_to_width(&format!(" {}", entity.name), width);
                if row == cursor {
                    Line::from(Span::styled(text, selection_style))
                } else {
                    Line::from(text)
                }
            })
            .collect()
    };
    f.render_widget(Paragraph::new(lines), chunks[0]);

    if show_filter {
        let filter_text = if app.mode() == Mode::Filter {
            format!("/{}", app.ui_state.input_buffer())
        } else {
            format!("filter: {}", app.catalog.filter())
        };
        let filter = Paragraph::new(truncate_to_width(&filter_text, width))
            .style(Style::default().fg(app.config.theme.accent()));
        f.render_widget(filter, chunks[1]);

        if app.mode() == Mode::Filter {
            let x = chunks[1].x + (filter_text.chars().count() as u16).min(chunks[1].width);
            f.set_cursor(x, chunks[1].y);
        }
    }
}

fn draw_tree(f: &mut Frame, app: &mut App, area: Rect) {
    let title = match app.catalog.selected() {
        Some(entity) if app.browser.entity().is_none() => format!(" {} ", entity.description()),
        _ => format!(" {} ", app.browser.entity().unwrap_or("Schema")),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(pane_border(app, app.focus() == Focus::Tree))
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.browser.schema().is_none() {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from("Select a resource or data source and press Enter"),
        ])
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
        f.render_widget(hint, inner);
        return;
    }

    app.browser.set_height(inner.height as usize);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let width = inner.width as usize;
    let accent = app.config.theme.accent();
    let selected_color = app.config.theme.selection();

    let title = Paragraph::new(app.browser.title())
        .style(Style::default().fg(accent).add_modifier(Modifier::BOLD));
    f.render_widget(title, chunks[0]);

    let lines: Vec<Line> = app
        .browser
        .tree_lines()
        .into_iter()
        .map(|line| {
            let mut style = Style::default();
            if line.selected {
                style = style.fg(selected_color);
            }
            if line.cursor {
                style = style.add_modifier(Modifier::BOLD).bg(Color::DarkGray);
            }
            Line::from(Span::styled(truncate_to_width(&line.text, width), style))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), chunks[1]);

    let summary = Paragraph::new(truncate_to_width(&app.browser.summary(), width))
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(summary, chunks[2]);
}

fn draw_export(f: &mut Frame, app: &App, area: Rect) {
    let Some(document) = app.export() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let body = Paragraph::new(document.content.as_str())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Exported HCL: {} ", document.file_name()))
                .border_style(Style::default().fg(app.config.theme.accent())),
        );
    f.render_widget(body, chunks[0]);

    let hint = Paragraph::new("Press 'w' to write to file, 'esc' to return")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[1]);
}

fn draw_instance_prompt(f: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(60, 7, area);
    f.render_widget(Clear, popup);

    let accent = app.config.theme.accent();
    let prompt = Paragraph::new(vec![
        Line::from(format!(
            "Enter instance name (default '{}'):",
            app.config.export.default_instance
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(accent)),
            Span::raw(app.ui_state.input_buffer()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Enter to confirm • Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Export Outputs: Resource Instance Name ")
            .border_style(Style::default().fg(accent)),
    );
    f.render_widget(prompt, popup);
}

/// A `width`% wide, `height` rows tall rectangle centred in `area`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width) / 2),
            Constraint::Percentage(width),
            Constraint::Percentage((100 - width) / 2),
        ])
        .split(vertical[1])[1]
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Context and shortcuts
            Constraint::Length(1), // Status message
        ])
        .split(area);

    let key_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let shortcuts: &[(&str, &str)] = match (app.stage(), app.focus()) {
        (Stage::Export, _) => &[("w", " Write  "), ("esc", " Back  ")],
        (_, Focus::Tree) => &[
            ("space", " Select  "),
            ("a", " Mode  "),
            ("e", " Export  "),
            ("tab", " Entities  "),
        ],
        (_, Focus::Entities) => &[
            ("/", " Filter  "),
            ("t", " Type  "),
            ("p", " Provider  "),
            ("enter", " Open  "),
        ],
    };

    let mut spans = vec![Span::raw(format!(
        " {}  ",
        app.ui_state.status_manager.context_line()
    ))];
    for (key, label) in shortcuts {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::raw(*label));
    }
    spans.push(Span::styled("?", key_style));
    spans.push(Span::raw(" Help"));

    let shortcut_bar = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(app.config.theme.status_background()));
    f.render_widget(shortcut_bar, chunks[0]);

    let status = Paragraph::new(truncate_to_width(
        app.status_message(),
        chunks[1].width as usize,
    ))
    .style(Style::default().fg(app.config.theme.accent()));
    f.render_widget(status, chunks[1]);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            " HELP -- Provider Explorer Key Bindings",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(" Entity list:"),
        Line::from("  j k / Arrow keys       - Move"),
        Line::from("  PgUp PgDn              - Move one page"),
        Line::from("  /                      - Filter by name"),
        Line::from("  t                      - Toggle Resources / Data Sources"),
        Line::from("  p                      - Next provider"),
        Line::from("  Enter                  - Open schema tree"),
        Line::from("  Esc                    - Clear filter"),
        Line::from(""),
        Line::from(" Schema tree:"),
        Line::from("  j k / Arrow keys       - Move"),
        Line::from("  space                  - Select node (blocks select their children)"),
        Line::from("  ctrl+a                 - Select all / clear"),
        Line::from("  a                      - Toggle Arguments / Attributes"),
        Line::from("  e                      - Export selection"),
        Line::from("  Esc                    - Clear selection, then back"),
        Line::from(""),
        Line::from(" Export:"),
        Line::from("  w                      - Write to <entity>_variables.tf / _outputs.tf"),
        Line::from("  Esc                    - Return to tree"),
        Line::from(""),
        Line::from(" tab switches panes, q quits, ctrl+c exits anywhere"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Press ? to exit help",
            Style::default().add_modifier(Modifier::ITALIC),
        )]),
    ];

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(Color::Blue)),
        )
        .alignment(Alignment::Left);

    f.render_widget(help, area);
}

/// Cuts `text` to at most `width` display columns, ending in `…` when cut.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let budget = width - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_to_width("aws_instance", 20), "aws_instance");
        assert_eq!(truncate_to_width("", 0), "");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("aws_instance", 5), "aws_…");
        assert_eq!(truncate_to_width("aws_instance", 1), "…");
        assert_eq!(truncate_to_width("aws_instance", 0), "");
    }

    #[test]
    fn test_truncate_counts_wide_chars() {
        // each CJK char takes two columns
        assert_eq!(truncate_to_width("日本語", 6), "日本語");
        assert_eq!(truncate_to_width("日本語", 4), "日…");
    }

    #[test]
    fn test_tree_glyphs_measure_one_column() {
        assert_eq!(truncate_to_width("├──> [ ] ami", 12), "├──> [ ] ami");
    }
}
