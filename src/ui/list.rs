//! Generic list table and detail pane, shared by every resource tab.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::app::Theme;
use crate::listman::ListManager;
use crate::resource::Resource;

/// Render the visible slice of a collection, windowed around the cursor so
/// the highlighted row always stays on screen.
pub fn render_table<T: Resource>(f: &mut Frame, area: Rect, lm: &ListManager<T>, theme: &Theme) {
    let visible = lm.visible();
    let rows_per_page = (area.height.saturating_sub(3) as usize).max(1);
    let cursor = lm.cursor();
    let start = (cursor / rows_per_page) * rows_per_page;
    let end = (start + rows_per_page).min(visible.len());
    let slice = if start < end { &visible[start..end] } else { &[][..] };

    let specs: Vec<_> = T::field_specs().iter().filter(|s| s.column).collect();
    let selected_id = lm.selected_id().map(str::to_string);

    let rows = slice.iter().enumerate().map(|(i, record)| {
        let absolute_index = start + i;
        let style = if absolute_index == cursor {
            Style::default()
                .fg(theme.highlight_fg)
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        let marker = if selected_id.as_deref() == Some(record.id()) { "●" } else { " " };
        let mut cells = vec![Cell::from(marker.to_string())];
        cells.extend(specs.iter().map(|s| Cell::from(record.get(s.key))));
        Row::new(cells).style(style)
    });

    let share = (100 / specs.len().max(1)) as u16;
    let mut widths = vec![Constraint::Length(1)];
    widths.extend(specs.iter().map(|_| Constraint::Percentage(share)));

    let mut header_cells = vec![Cell::from(" ")];
    header_cells.extend(specs.iter().map(|s| Cell::from(s.label)));
    let header = Row::new(header_cells)
        .style(Style::default().fg(theme.title).add_modifier(Modifier::BOLD));

    let mut title = format!("{} ({}/{})", T::kind().title(), lm.filtered().len(), lm.len());
    if lm.has_more() {
        title.push_str("  [m: load more]");
    }

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        )
        .column_spacing(1);
    f.render_widget(table, area);
}

/// Field-by-field view of the selected record, falling back to the row
/// under the cursor when nothing is selected.
pub fn render_details<T: Resource>(f: &mut Frame, area: Rect, lm: &ListManager<T>, theme: &Theme) {
    let (record, title) = match lm.selected_record() {
        Some(r) => (Some(r), "Details (selected)"),
        None => (lm.cursor_record(), "Details"),
    };

    let text = match record {
        Some(record) => {
            let mut out = String::new();
            for spec in T::field_specs() {
                out.push_str(&format!("{}: {}\n", spec.label, record.get(spec.key)));
            }
            out
        }
        None => String::new(),
    };

    let p = Paragraph::new(text).style(Style::default().fg(theme.text)).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    f.render_widget(p, area);
}
