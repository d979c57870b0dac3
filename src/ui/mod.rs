pub mod components;
pub mod list;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{ActiveTab, AppState, InputMode, ModalState};
use crate::resource::Resource;

pub fn render(f: &mut Frame, app: &mut AppState) {
    if app.logged_out {
        render_login_required(f, app);
        return;
    }

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(root[1]);

    let tabs = app
        .allowed_tabs()
        .iter()
        .map(|t| {
            if *t == app.active_tab {
                format!("[{}]", t.title())
            } else {
                t.title().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    let prompt = match app.input_mode {
        InputMode::Search => format!("  Search: {}_", app.active_query_input()),
        _ if !app.active_query_input().is_empty() => {
            format!("  Search: {}", app.active_query_input())
        }
        _ => String::new(),
    };
    let p = Paragraph::new(format!(
        "backdesk ({})  {tabs}{prompt}  — Tab: switch; /: search; Enter: select; n: new; i: import; d: dispose; e: export; r: refresh; q: quit",
        app.session.user.as_deref().unwrap_or("unknown")
    ))
    .block(
        Block::default()
            .title("backdesk")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    match app.active_tab {
        ActiveTab::Customers => {
            list::render_table(f, body[0], &app.customers, &app.theme);
            list::render_details(f, body[1], &app.customers, &app.theme);
        }
        ActiveTab::Products => {
            list::render_table(f, body[0], &app.products, &app.theme);
            list::render_details(f, body[1], &app.products, &app.theme);
        }
        ActiveTab::Inventory => {
            list::render_table(f, body[0], &app.inventory, &app.theme);
            list::render_details(f, body[1], &app.inventory, &app.theme);
        }
        ActiveTab::Categories => {
            list::render_table(f, body[0], &app.categories, &app.theme);
            list::render_details(f, body[1], &app.categories, &app.theme);
        }
        ActiveTab::Users => {
            list::render_table(f, body[0], &app.users, &app.theme);
            list::render_details(f, body[1], &app.users, &app.theme);
        }
    }

    components::render_status_bar(f, root[2], app);

    if app.modal.is_some() {
        render_modal(f, f.area(), app);
    }
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(state) = &app.modal else { return };
    match state {
        ModalState::Actions { selected } => {
            components::render_menu(
                f,
                area,
                &app.theme,
                "Actions",
                &["Edit", "Delete", "Export record"],
                *selected,
            );
        }
        ModalState::Form { kind, id, fields, focus, notice } => {
            let title = match id {
                Some(id) => format!("Edit {} {id}", kind.slug()),
                None => format!("New {}", kind.slug()),
            };
            components::render_form(f, area, &app.theme, &title, fields, *focus, notice.as_deref());
        }
        ModalState::DeleteConfirm { selected } => {
            components::render_confirm(
                f,
                area,
                &app.theme,
                "Delete",
                "Delete the selected record? This cannot be undone.",
                *selected,
            );
        }
        ModalState::ImportPrompt { path } => {
            components::render_prompt(f, area, &app.theme, "Import from file", path);
        }
        ModalState::Report { title, lines } => {
            components::render_report(f, area, &app.theme, title, lines);
        }
        ModalState::DisposeSelect { cursor, picked } => {
            let labels: Vec<String> = app
                .inventory
                .visible()
                .iter()
                .map(|r| format!("{}  (qty {})", r.get("name"), r.get("quantity")))
                .collect();
            components::render_dispose_select(f, area, &app.theme, &labels, *cursor, picked);
        }
        ModalState::DisposeConfirm { ids, selected } => {
            components::render_confirm(
                f,
                area,
                &app.theme,
                "Dispose",
                &format!("Dispose {} inventory record(s)?", ids.len()),
                *selected,
            );
        }
        ModalState::Info { message } => {
            components::render_info_modal(f, area, &app.theme, message);
        }
    }
}

fn render_login_required(f: &mut Frame, app: &AppState) {
    let rect = components::centered_rect(54, 7, f.area());
    let body = "Your session is no longer valid.\n\n\
                Sign in again with `backdesk login` and restart.\n\n\
                Press q to exit.";
    let p = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(app.theme.text))
        .block(
            Block::default()
                .title("Session expired")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.err).add_modifier(Modifier::BOLD)),
        );
    f.render_widget(p, rect);
}
