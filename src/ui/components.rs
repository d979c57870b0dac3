//! Shared UI components (status bar, modal helpers).

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{AppState, FormField, InputMode, Theme};

/// Render the bottom status bar: a live toast when one is up, otherwise
/// mode and collection counts.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    if let Some(toast) = &app.toast {
        let p = Paragraph::new(format!(" {}", toast.message)).style(
            Style::default()
                .fg(app.theme.severity_color(toast.severity))
                .bg(app.theme.header_bg)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(p, area);
        return;
    }

    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Modal => "MODAL",
    };
    let (visible, filtered, total) = app.active_counts();
    let msg = format!(
        "mode: {mode}  {}: showing {visible} of {filtered} matching ({total} loaded)  api: {}",
        app.active_tab.title(),
        app.api.base_url()
    );
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Vertical menu with a `▶` marker on the highlighted entry.
pub fn render_menu(
    f: &mut Frame,
    area: Rect,
    theme: &Theme,
    title: &str,
    options: &[&str],
    selected: usize,
) {
    let width = (options.iter().map(|o| o.len()).max().unwrap_or(10) as u16 + 8).max(30);
    let height = options.len() as u16 + 2;
    let rect = centered_rect(width, height, area);
    let mut text = String::new();
    for (idx, label) in options.iter().enumerate() {
        if idx == selected {
            text.push_str(&format!("▶ {}\n", label));
        } else {
            text.push_str(&format!("  {}\n", label));
        }
    }
    let p = Paragraph::new(text).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Yes/No confirmation; `selected` 0 is Yes, 1 is No.
pub fn render_confirm(
    f: &mut Frame,
    area: Rect,
    theme: &Theme,
    title: &str,
    question: &str,
    selected: usize,
) {
    let width = (question.len() as u16 + 6).max(40).min(area.width.saturating_sub(4));
    let rect = centered_rect(width, 6, area);
    let yes = if selected == 0 { "▶ Yes" } else { "  Yes" };
    let no = if selected == 1 { "▶ No" } else { "  No" };
    let body = format!("{question}\n\n{yes}    {no}");
    let p = Paragraph::new(body).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Single-line text prompt (import file path).
pub fn render_prompt(f: &mut Frame, area: Rect, theme: &Theme, title: &str, value: &str) {
    let width = 60u16.min(area.width.saturating_sub(4)).max(40);
    let rect = centered_rect(width, 5, area);
    let body = format!("{value}_\n\nEnter: run    Esc: cancel");
    let p = Paragraph::new(body).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Edit/create form: one line per field, the focused one marked, and the
/// field's own validation message right below it.
pub fn render_form(
    f: &mut Frame,
    area: Rect,
    theme: &Theme,
    title: &str,
    fields: &[FormField],
    focus: usize,
    notice: Option<&str>,
) {
    let error_lines = fields.iter().filter(|fld| fld.error.is_some()).count() as u16;
    let height = (fields.len() as u16 + error_lines + 5).min(area.height.saturating_sub(2));
    let width = 64u16.min(area.width.saturating_sub(4)).max(44);
    let rect = centered_rect(width, height, area);

    let mut text = String::new();
    for (idx, field) in fields.iter().enumerate() {
        let marker = if idx == focus { "▶" } else { " " };
        let tail = if idx == focus { "_" } else { "" };
        text.push_str(&format!("{marker} {}: {}{tail}\n", field.spec.label, field.value));
        if let Some(err) = &field.error {
            text.push_str(&format!("      ! {err}\n"));
        }
    }
    text.push('\n');
    match notice {
        Some(notice) => text.push_str(notice),
        None => text.push_str("Enter: save    Esc: discard"),
    }

    let p = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Multi-line report (import failures, disposal results).
pub fn render_report(f: &mut Frame, area: Rect, theme: &Theme, title: &str, lines: &[String]) {
    let width = 70u16.min(area.width.saturating_sub(4)).max(50);
    let height = (lines.len() as u16 + 4).min(area.height.saturating_sub(4)).max(6);
    let rect = centered_rect(width, height, area);
    let mut body = lines.join("\n");
    body.push_str("\n\nEsc: close");
    let p = Paragraph::new(body).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, theme: &Theme, message: &str) {
    let max_w = area.width.saturating_sub(6).max(30);
    let width = 44u16.min(max_w);
    let approx_lines = (message.len() as u16 / width.saturating_sub(4).max(10)).max(1);
    let height = (approx_lines + 4).min(area.height.saturating_sub(4)).max(5);
    let rect = centered_rect(width, height, area);
    let p = Paragraph::new(message.to_string()).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Info")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Checkbox list over the visible inventory rows for a disposal batch.
pub fn render_dispose_select(
    f: &mut Frame,
    area: Rect,
    theme: &Theme,
    labels: &[String],
    cursor: usize,
    picked: &[usize],
) {
    let width = 60u16.min(area.width.saturating_sub(4)).max(40);
    let height = (labels.len() as u16 + 4).min(area.height.saturating_sub(4)).max(6);
    let rect = centered_rect(width, height, area);
    let mut text = String::new();
    for (idx, label) in labels.iter().enumerate() {
        let marker = if idx == cursor { "▶" } else { " " };
        let checkbox = if picked.contains(&idx) { "[x]" } else { "[ ]" };
        text.push_str(&format!("{marker} {checkbox} {label}\n"));
    }
    text.push_str("\nSpace: mark    Enter: dispose marked    Esc: cancel");
    let p = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Dispose inventory")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
