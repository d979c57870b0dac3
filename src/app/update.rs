//! Event loop and state transitions.
//!
//! All state changes happen in response to discrete events: a key press, a
//! completed network call, or the 100 ms poll tick that drives the search
//! debounce and toast expiry. Network calls run at the operation boundary
//! and every failure is caught right there: logged, toasted, and (for 401)
//! turned into the login-required screen. Nothing propagates further up.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::app::{
    blank_form, form_from_record, ActiveTab, AppState, FormField, InputMode, ModalState, Severity,
};
use crate::error::ApiError;
use crate::export;
use crate::import::{self, ImportOutcome, ImportSeverity};
use crate::listman::{ListManager, DEFAULT_PAGE_SIZE};
use crate::model::InventoryItem;
use crate::resource::{Resource, ResourceKind};
use crate::validate;

/// Run an expression against the active tab's list manager.
macro_rules! with_active {
    ($app:expr, $lm:ident => $e:expr) => {
        match $app.active_tab {
            ActiveTab::Customers => {
                let $lm = &mut $app.customers;
                $e
            }
            ActiveTab::Products => {
                let $lm = &mut $app.products;
                $e
            }
            ActiveTab::Inventory => {
                let $lm = &mut $app.inventory;
                $e
            }
            ActiveTab::Categories => {
                let $lm = &mut $app.categories;
                $e
            }
            ActiveTab::Users => {
                let $lm = &mut $app.users;
                $e
            }
        }
    };
}

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut app: AppState,
) -> Result<()> {
    load_all(&mut app);

    loop {
        app.tick(Instant::now());

        terminal.draw(|f| {
            crate::ui::render(f, &mut app);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if app.logged_out {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => break,
                            _ => {}
                        }
                        continue;
                    }
                    match app.input_mode {
                        InputMode::Normal => {
                            if !handle_normal_key(&mut app, key.code) {
                                break;
                            }
                        }
                        InputMode::Search => handle_search_key(&mut app, key.code),
                        InputMode::Modal => handle_modal_key(&mut app, key.code),
                    }
                }
            }
        }
    }

    Ok(())
}

/// Fetch every collection the session may see. 401 aborts the walk.
pub fn load_all(app: &mut AppState) {
    for tab in app.allowed_tabs() {
        if app.logged_out {
            break;
        }
        refresh_tab(app, tab);
    }
}

pub fn refresh_tab(app: &mut AppState, tab: ActiveTab) {
    let result = match tab {
        ActiveTab::Customers => refresh(&app.api, &mut app.customers),
        ActiveTab::Products => refresh(&app.api, &mut app.products),
        ActiveTab::Inventory => refresh(&app.api, &mut app.inventory),
        ActiveTab::Categories => refresh(&app.api, &mut app.categories),
        ActiveTab::Users => refresh(&app.api, &mut app.users),
    };
    match result {
        Ok(n) => info!(tab = tab.title(), rows = n, "collection loaded"),
        Err(ApiError::Unauthorized) => drop_session(app),
        Err(e) => {
            warn!(tab = tab.title(), error = %e, "fetch failed");
            app.toast(format!("{}: {e}", tab.title()), Severity::Error);
        }
    }
}

fn refresh<T>(api: &ApiClient, lm: &mut ListManager<T>) -> Result<usize, ApiError>
where
    T: Resource + DeserializeOwned,
{
    let items = api.fetch_all::<T>()?;
    let n = items.len();
    lm.set_items(items);
    Ok(n)
}

fn drop_session(app: &mut AppState) {
    warn!("server rejected the session token");
    app.logged_out = true;
    app.modal = None;
    app.input_mode = InputMode::Normal;
}

/// Returns `false` to quit.
fn handle_normal_key(app: &mut AppState, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('q') => return false,
        KeyCode::Char('/') => app.input_mode = InputMode::Search,
        KeyCode::Tab => app.cycle_tab(true),
        KeyCode::BackTab => app.cycle_tab(false),
        KeyCode::Up | KeyCode::Char('k') => {
            with_active!(app, lm => lm.move_up());
        }
        KeyCode::Down | KeyCode::Char('j') => {
            with_active!(app, lm => lm.move_down());
        }
        KeyCode::Left | KeyCode::Char('h') => {
            with_active!(app, lm => lm.jump(-(DEFAULT_PAGE_SIZE as isize)));
        }
        KeyCode::Right | KeyCode::Char('l') => {
            with_active!(app, lm => lm.jump(DEFAULT_PAGE_SIZE as isize));
        }
        KeyCode::Char('m') => {
            with_active!(app, lm => lm.load_more());
        }
        KeyCode::Char('r') => {
            refresh_tab(app, app.active_tab);
            if !app.logged_out {
                app.toast(format!("{} refreshed", app.active_tab.title()), Severity::Info);
            }
        }
        KeyCode::Char('e') => export_active_view(app),
        KeyCode::Char('n') => {
            let kind = app.active_tab.kind();
            app.modal = Some(ModalState::Form {
                kind,
                id: None,
                fields: blank_form_for(kind),
                focus: 0,
                notice: None,
            });
            app.input_mode = InputMode::Modal;
        }
        KeyCode::Char('i') => {
            let kind = app.active_tab.kind();
            if import::aliases_for(kind).is_some() {
                app.modal = Some(ModalState::ImportPrompt { path: String::new() });
                app.input_mode = InputMode::Modal;
            } else {
                app.toast(
                    format!("no bulk import for {}", app.active_tab.title()),
                    Severity::Warning,
                );
            }
        }
        KeyCode::Char('d') => {
            if app.active_tab == ActiveTab::Inventory {
                app.modal = Some(ModalState::DisposeSelect { cursor: 0, picked: Vec::new() });
                app.input_mode = InputMode::Modal;
            }
        }
        KeyCode::Enter => {
            let selected = with_active!(app, lm => toggle_cursor_selection(lm));
            if selected {
                app.modal = Some(ModalState::Actions { selected: 0 });
                app.input_mode = InputMode::Modal;
            }
        }
        _ => {}
    }
    true
}

fn handle_search_key(app: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Esc => {
            with_active!(app, lm => lm.clear_query());
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            with_active!(app, lm => edit_query(lm, |s| {
                s.pop();
            }));
        }
        KeyCode::Char(c) => {
            with_active!(app, lm => edit_query(lm, |s| s.push(c)));
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut AppState, code: KeyCode) {
    let Some(mut modal) = app.modal.take() else {
        app.input_mode = InputMode::Normal;
        return;
    };
    // `keep` restores the current modal after the match; transitions assign
    // `app.modal` directly instead.
    let mut keep = true;

    match &mut modal {
        ModalState::Actions { selected } => match code {
            KeyCode::Esc => keep = false,
            KeyCode::Up | KeyCode::Char('k') => {
                if *selected > 0 {
                    *selected -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if *selected < 2 {
                    *selected += 1;
                }
            }
            KeyCode::Enter => {
                keep = false;
                match *selected {
                    0 => app.modal = open_edit_form(app.active_tab, app),
                    1 => app.modal = Some(ModalState::DeleteConfirm { selected: 1 }),
                    2 => export_selected_record(app),
                    _ => {}
                }
            }
            _ => {}
        },

        ModalState::Form { kind, id, fields, focus, notice } => match code {
            // abandoning the draft never touches the collection
            KeyCode::Esc => keep = false,
            KeyCode::Up => {
                if *focus > 0 {
                    *focus -= 1;
                }
            }
            KeyCode::Down | KeyCode::Tab => {
                if *focus + 1 < fields.len() {
                    *focus += 1;
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = fields.get_mut(*focus) {
                    field.value.pop();
                    field.error = validate::check_field(field.spec, &field.value);
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = fields.get_mut(*focus) {
                    field.value.push(c);
                    field.error = validate::check_field(field.spec, &field.value);
                }
            }
            KeyCode::Enter => match dispatch_save(app, *kind, id, fields) {
                SaveOutcome::Saved(label) => {
                    keep = false;
                    let verb = if id.is_some() { "saved" } else { "created" };
                    app.toast(format!("{verb} {label}"), Severity::Success);
                }
                SaveOutcome::Invalid => {
                    *notice = Some("fix the highlighted fields".to_string());
                }
                SaveOutcome::Failed(msg) => {
                    // edit mode stays active, the draft is kept
                    *notice = Some(msg.clone());
                    app.toast(msg, Severity::Error);
                }
                SaveOutcome::LoggedOut => {
                    keep = false;
                    drop_session(app);
                }
            },
            _ => {}
        },

        ModalState::DeleteConfirm { selected } => match code {
            KeyCode::Esc => keep = false,
            KeyCode::Left | KeyCode::Right => *selected = if *selected == 0 { 1 } else { 0 },
            KeyCode::Enter => {
                keep = false;
                if *selected == 0 {
                    delete_active_selection(app);
                }
            }
            _ => {}
        },

        ModalState::ImportPrompt { path } => match code {
            KeyCode::Esc => keep = false,
            KeyCode::Backspace => {
                path.pop();
            }
            KeyCode::Char(c) => path.push(c),
            KeyCode::Enter => {
                keep = false;
                run_import_for_active(app, path);
            }
            _ => {}
        },

        ModalState::Report { .. } | ModalState::Info { .. } => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => keep = false,
            _ => {}
        },

        ModalState::DisposeSelect { cursor, picked } => {
            let total = app.inventory.visible().len();
            match code {
                KeyCode::Esc => keep = false,
                KeyCode::Up | KeyCode::Char('k') => {
                    if *cursor > 0 {
                        *cursor -= 1;
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if *cursor + 1 < total {
                        *cursor += 1;
                    }
                }
                KeyCode::Char(' ') => {
                    if let Some(pos) = picked.iter().position(|p| p == cursor) {
                        picked.remove(pos);
                    } else if *cursor < total {
                        picked.push(*cursor);
                    }
                }
                KeyCode::Enter => {
                    let visible = app.inventory.visible();
                    let mut ids: Vec<String> = picked
                        .iter()
                        .filter_map(|&i| visible.get(i).map(|r| r.id().to_string()))
                        .collect();
                    ids.dedup();
                    keep = false;
                    if ids.is_empty() {
                        app.modal = Some(ModalState::Info {
                            message: "no rows marked for disposal".to_string(),
                        });
                    } else {
                        app.modal = Some(ModalState::DisposeConfirm { ids, selected: 1 });
                    }
                }
                _ => {}
            }
        }

        ModalState::DisposeConfirm { ids, selected } => match code {
            KeyCode::Esc => keep = false,
            KeyCode::Left | KeyCode::Right => *selected = if *selected == 0 { 1 } else { 0 },
            KeyCode::Enter => {
                let ids = std::mem::take(ids);
                keep = false;
                if *selected == 0 {
                    dispose_batch(app, &ids);
                }
            }
            _ => {}
        },
    }

    if keep {
        app.modal = Some(modal);
    }
    app.input_mode = if app.modal.is_some() { InputMode::Modal } else { InputMode::Normal };
}

// --- generic operation helpers ---------------------------------------------

fn edit_query<T: Resource>(lm: &mut ListManager<T>, edit: impl FnOnce(&mut String)) {
    let mut input = lm.query_input().to_string();
    edit(&mut input);
    lm.set_query_input(input, Instant::now());
}

fn toggle_cursor_selection<T: Resource>(lm: &mut ListManager<T>) -> bool {
    let Some(id) = lm.cursor_record().map(|r| r.id().to_string()) else {
        return false;
    };
    lm.toggle_select(&id);
    lm.selected_id().is_some()
}

fn open_edit_form(tab: ActiveTab, app: &AppState) -> Option<ModalState> {
    fn form<T: Resource>(lm: &ListManager<T>) -> Option<ModalState> {
        let record = lm.selected_record()?;
        Some(ModalState::Form {
            kind: T::kind(),
            id: Some(record.id().to_string()),
            fields: form_from_record(record),
            focus: 0,
            notice: None,
        })
    }
    match tab {
        ActiveTab::Customers => form(&app.customers),
        ActiveTab::Products => form(&app.products),
        ActiveTab::Inventory => form(&app.inventory),
        ActiveTab::Categories => form(&app.categories),
        ActiveTab::Users => form(&app.users),
    }
}

fn blank_form_for(kind: ResourceKind) -> Vec<FormField> {
    use crate::model::{AdminUser, Category, Customer, Product};
    match kind {
        ResourceKind::Customer => blank_form::<Customer>(),
        ResourceKind::Product => blank_form::<Product>(),
        ResourceKind::Inventory => blank_form::<InventoryItem>(),
        ResourceKind::Category => blank_form::<Category>(),
        ResourceKind::AdminUser => blank_form::<AdminUser>(),
    }
}

enum SaveOutcome {
    Saved(String),
    Invalid,
    Failed(String),
    LoggedOut,
}

fn dispatch_save(
    app: &mut AppState,
    kind: ResourceKind,
    id: &Option<String>,
    fields: &mut [FormField],
) -> SaveOutcome {
    match kind {
        ResourceKind::Customer => save_form(&app.api, &mut app.customers, id, fields),
        ResourceKind::Product => save_form(&app.api, &mut app.products, id, fields),
        ResourceKind::Inventory => save_form(&app.api, &mut app.inventory, id, fields),
        ResourceKind::Category => save_form(&app.api, &mut app.categories, id, fields),
        ResourceKind::AdminUser => save_form(&app.api, &mut app.users, id, fields),
    }
}

/// Validate the whole draft, build the record, and issue the network call.
/// A failing validation never reaches the network and leaves the canonical
/// collection untouched.
fn save_form<T>(
    api: &ApiClient,
    lm: &mut ListManager<T>,
    id: &Option<String>,
    fields: &mut [FormField],
) -> SaveOutcome
where
    T: Resource + Default + Serialize + DeserializeOwned,
{
    let errors = validate::validate_all(fields.iter().map(|f| (f.spec, f.value.as_str())));
    for field in fields.iter_mut() {
        field.error = errors.get(field.spec.key).cloned();
    }
    if !errors.is_empty() {
        return SaveOutcome::Invalid;
    }

    let mut draft: T = id
        .as_deref()
        .and_then(|id| lm.items().iter().find(|r| r.id() == id).cloned())
        .unwrap_or_default();
    let mut parse_failed = false;
    for field in fields.iter_mut() {
        if let Err(msg) = draft.set(field.spec.key, field.value.trim()) {
            field.error = Some(msg);
            parse_failed = true;
        }
    }
    if parse_failed {
        return SaveOutcome::Invalid;
    }

    let result = match id {
        Some(id) => api.update(id, &draft),
        None => api.create(&draft),
    };
    match result {
        Ok(saved) => {
            let label = display_label(&saved);
            match id {
                Some(_) => lm.apply_saved(saved),
                None => lm.prepend(saved),
            }
            SaveOutcome::Saved(label)
        }
        Err(ApiError::Unauthorized) => SaveOutcome::LoggedOut,
        Err(ApiError::FieldConflict { field, message }) => {
            if let Some(form_field) = fields.iter_mut().find(|f| f.spec.key == field) {
                form_field.error = Some(message.clone());
            }
            warn!(field = %field, message = %message, "save rejected with field conflict");
            SaveOutcome::Failed(format!("{field}: {message}"))
        }
        Err(e) => {
            warn!(error = %e, "save failed");
            SaveOutcome::Failed(e.to_string())
        }
    }
}

fn display_label<T: Resource>(record: &T) -> String {
    let name = record.get("name");
    if name.is_empty() { record.id().to_string() } else { name }
}

fn delete_active_selection(app: &mut AppState) {
    fn delete<T: Resource>(api: &ApiClient, lm: &mut ListManager<T>) -> Result<Option<String>, ApiError> {
        let Some(id) = lm.selected_id().map(str::to_string) else {
            return Ok(None);
        };
        api.delete::<T>(&id)?;
        lm.remove(&id);
        Ok(Some(id))
    }
    let result = match app.active_tab {
        ActiveTab::Customers => delete(&app.api, &mut app.customers),
        ActiveTab::Products => delete(&app.api, &mut app.products),
        ActiveTab::Inventory => delete(&app.api, &mut app.inventory),
        ActiveTab::Categories => delete(&app.api, &mut app.categories),
        ActiveTab::Users => delete(&app.api, &mut app.users),
    };
    match result {
        Ok(Some(id)) => app.toast(format!("deleted {id}"), Severity::Success),
        Ok(None) => {}
        Err(ApiError::Unauthorized) => drop_session(app),
        Err(e) => {
            warn!(error = %e, "delete failed");
            app.toast(e.to_string(), Severity::Error);
        }
    }
}

fn export_active_view(app: &mut AppState) {
    fn export_view<T: Resource>(lm: &ListManager<T>) -> (String, std::io::Result<()>) {
        let csv = export::view_to_csv(&lm.visible());
        let path = format!("{}-export.csv", T::kind().plural());
        let result = export::write_export(Path::new(&path), &csv);
        (path, result)
    }
    let (path, result) = with_active!(app, lm => export_view(lm));
    match result {
        Ok(()) => app.toast(format!("view exported to {path}"), Severity::Success),
        Err(e) => {
            warn!(error = %e, "export failed");
            app.toast(format!("export failed: {e}"), Severity::Error);
        }
    }
}

fn export_selected_record(app: &mut AppState) {
    fn export_one<T: Resource>(lm: &ListManager<T>) -> Option<(String, std::io::Result<()>)> {
        let record = lm.selected_record()?;
        let path = format!("{}-{}.txt", T::kind().slug(), record.id());
        let doc = export::record_document(record);
        Some((path.clone(), export::write_export(Path::new(&path), &doc)))
    }
    let outcome = with_active!(app, lm => export_one(lm));
    match outcome {
        Some((path, Ok(()))) => app.toast(format!("record exported to {path}"), Severity::Success),
        Some((_, Err(e))) => {
            warn!(error = %e, "record export failed");
            app.toast(format!("export failed: {e}"), Severity::Error);
        }
        None => {}
    }
}

fn run_import_for_active(app: &mut AppState, path: &str) {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(path, error = %e, "import file unreadable");
            app.toast(format!("could not read {path}: {e}"), Severity::Error);
            return;
        }
    };
    let result = match app.active_tab {
        ActiveTab::Customers => import_into(&app.api, &mut app.customers, &text, path),
        ActiveTab::Categories => import_into(&app.api, &mut app.categories, &text, path),
        ActiveTab::Inventory => import_into(&app.api, &mut app.inventory, &text, path),
        _ => return,
    };
    match result {
        Ok((severity, lines)) => {
            let toast_severity = match severity {
                ImportSeverity::AllSucceeded => Severity::Success,
                ImportSeverity::PartialSuccess => Severity::Warning,
                ImportSeverity::NoneSucceeded => Severity::Error,
            };
            app.toast(lines[0].clone(), toast_severity);
            if lines.len() > 1 {
                app.modal = Some(ModalState::Report {
                    title: "Import result".to_string(),
                    lines,
                });
            }
        }
        Err(ApiError::Unauthorized) => drop_session(app),
        Err(e) => {
            warn!(error = %e, "bulk import failed");
            app.toast(format!("import failed: {e}"), Severity::Error);
        }
    }
}

/// Parse, validate, submit and reconcile one import run. Successes are
/// prepended; failed rows are only reported, never retried.
fn import_into<T>(
    api: &ApiClient,
    lm: &mut ListManager<T>,
    text: &str,
    source_path: &str,
) -> Result<(ImportSeverity, Vec<String>), ApiError>
where
    T: Resource + Default + Serialize + DeserializeOwned,
{
    let rows = import::parse_sheet(text);
    let batch = import::build_candidates::<T>(&rows);
    let mut outcome = ImportOutcome::<T> {
        successful: Vec::new(),
        failed: Vec::new(),
        skipped: batch.skipped,
    };
    if !batch.candidates.is_empty() {
        let results = api.bulk_create(&batch.candidates)?;
        outcome.failed = results.failed;
        outcome.successful = results.successful.clone();
        lm.prepend_many(results.successful);
    }

    let mut lines = vec![outcome.summary()];
    if outcome.has_failures() {
        let report_path = format!("{source_path}.failures.csv");
        match export::write_export(Path::new(&report_path), &outcome.failure_report_csv()) {
            Ok(()) => lines.push(format!("failure report written to {report_path}")),
            Err(e) => lines.push(format!("could not write failure report: {e}")),
        }
        for issue in &outcome.skipped {
            lines.push(format!("line {}: {}", issue.line, issue.reason));
        }
        for entry in &outcome.failed {
            let who = entry
                .record
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("(row)");
            lines.push(format!("{who}: {}", entry.reason));
        }
    }
    Ok((outcome.severity(), lines))
}

fn dispose_batch(app: &mut AppState, ids: &[String]) {
    match app.api.bulk_dispose::<InventoryItem>(ids) {
        Ok(results) => {
            for record in &results.successful {
                app.inventory.remove(record.id());
            }
            let disposed = results.successful.len();
            if results.failed.is_empty() {
                app.toast(format!("disposed {disposed} items"), Severity::Success);
            } else {
                let severity = if disposed == 0 { Severity::Error } else { Severity::Warning };
                app.toast(
                    format!("disposed {disposed}, {} failed", results.failed.len()),
                    severity,
                );
                let mut lines = vec![format!("{} rows were not disposed:", results.failed.len())];
                for entry in &results.failed {
                    lines.push(entry.reason.clone());
                }
                app.modal = Some(ModalState::Report {
                    title: "Disposal result".to_string(),
                    lines,
                });
            }
        }
        Err(ApiError::Unauthorized) => drop_session(app),
        Err(e) => {
            warn!(error = %e, "disposal failed");
            app.toast(format!("disposal failed: {e}"), Severity::Error);
        }
    }
}
