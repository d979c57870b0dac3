//! Application state types and entry glue.
//!
//! Defines the enums and structs that model the TUI state, as well as
//! helpers to construct defaults and run the event loop (re-exported as
//! `run`).

pub mod update;

use std::time::{Duration, Instant};

use ratatui::style::Color;

use crate::api::ApiClient;
use crate::listman::ListManager;
use crate::model::{AdminUser, Category, Customer, InventoryItem, Product};
use crate::resource::{FieldSpec, Resource, ResourceKind};
use crate::session::Session;

/// How long a toast stays in the status bar.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// Top-level active resource tab.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActiveTab {
    Customers,
    Products,
    Inventory,
    Categories,
    Users,
}

impl ActiveTab {
    pub const ALL: [ActiveTab; 5] = [
        ActiveTab::Customers,
        ActiveTab::Products,
        ActiveTab::Inventory,
        ActiveTab::Categories,
        ActiveTab::Users,
    ];

    pub fn kind(self) -> ResourceKind {
        match self {
            ActiveTab::Customers => ResourceKind::Customer,
            ActiveTab::Products => ResourceKind::Product,
            ActiveTab::Inventory => ResourceKind::Inventory,
            ActiveTab::Categories => ResourceKind::Category,
            ActiveTab::Users => ResourceKind::AdminUser,
        }
    }

    /// Alternative permissions that open this tab (OR semantics; `admin`
    /// always passes).
    pub fn required_permissions(self) -> &'static [&'static str] {
        match self {
            ActiveTab::Customers => &["customer"],
            ActiveTab::Products => &["product"],
            ActiveTab::Inventory => &["inventory", "disposal"],
            ActiveTab::Categories => &["category"],
            ActiveTab::Users => &["admin-users"],
        }
    }

    pub fn title(self) -> &'static str {
        self.kind().title()
    }
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Modal,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient status-bar notification.
#[derive(Clone, Debug)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
    pub shown_at: Instant,
}

/// One field of an edit/create form: the draft value lives here, never in
/// the canonical collection entry, and carries its own validation message.
pub struct FormField {
    pub spec: &'static FieldSpec,
    pub value: String,
    pub error: Option<String>,
}

/// Build a draft form from a record's editable fields.
pub fn form_from_record<T: Resource>(record: &T) -> Vec<FormField> {
    T::field_specs()
        .iter()
        .filter(|s| s.editable)
        .map(|spec| FormField {
            spec,
            value: record.get(spec.key),
            error: None,
        })
        .collect()
}

/// Blank form for a create flow.
pub fn blank_form<T: Resource>() -> Vec<FormField> {
    T::field_specs()
        .iter()
        .filter(|s| s.editable)
        .map(|spec| FormField { spec, value: String::new(), error: None })
        .collect()
}

/// Modal dialog states.
pub enum ModalState {
    /// Menu over the selected record: edit / delete / export.
    Actions { selected: usize },
    /// Edit (`id: Some`) or create (`id: None`) form.
    Form {
        kind: ResourceKind,
        id: Option<String>,
        fields: Vec<FormField>,
        focus: usize,
        notice: Option<String>,
    },
    /// Distinct confirmation step before any delete fires.
    DeleteConfirm { selected: usize },
    /// Path prompt for a bulk import file.
    ImportPrompt { path: String },
    /// Scrollable text report (import failures, export confirmations).
    Report { title: String, lines: Vec<String> },
    /// Multi-select over the visible inventory slice for a disposal batch.
    DisposeSelect { cursor: usize, picked: Vec<usize> },
    DisposeConfirm { ids: Vec<String>, selected: usize },
    Info { message: String },
}

pub struct AppState {
    pub started_at: Instant,
    pub session: Session,
    pub api: ApiClient,
    pub theme: Theme,

    pub customers: ListManager<Customer>,
    pub products: ListManager<Product>,
    pub inventory: ListManager<InventoryItem>,
    pub categories: ListManager<Category>,
    pub users: ListManager<AdminUser>,

    pub active_tab: ActiveTab,
    pub input_mode: InputMode,
    pub modal: Option<ModalState>,
    pub toast: Option<Toast>,
    /// Set when the server answers 401; the UI falls back to the
    /// login-required screen and page state is discarded.
    pub logged_out: bool,
}

impl AppState {
    pub fn new(session: Session, api: ApiClient, theme: Theme) -> Self {
        let active_tab = ActiveTab::ALL
            .into_iter()
            .find(|t| session.allows(t.required_permissions()))
            .unwrap_or(ActiveTab::Customers);
        Self {
            started_at: Instant::now(),
            session,
            api,
            theme,
            customers: ListManager::new(),
            products: ListManager::new(),
            inventory: ListManager::new(),
            categories: ListManager::new(),
            users: ListManager::new(),
            active_tab,
            input_mode: InputMode::Normal,
            modal: None,
            toast: None,
            logged_out: false,
        }
    }

    pub fn allowed_tabs(&self) -> Vec<ActiveTab> {
        ActiveTab::ALL
            .into_iter()
            .filter(|t| self.session.allows(t.required_permissions()))
            .collect()
    }

    /// Move to the next/previous tab the session may enter.
    pub fn cycle_tab(&mut self, forward: bool) {
        let allowed = self.allowed_tabs();
        if allowed.is_empty() {
            return;
        }
        let pos = allowed.iter().position(|t| *t == self.active_tab).unwrap_or(0);
        let next = if forward {
            (pos + 1) % allowed.len()
        } else {
            (pos + allowed.len() - 1) % allowed.len()
        };
        self.active_tab = allowed[next];
    }

    pub fn toast(&mut self, message: impl Into<String>, severity: Severity) {
        self.toast = Some(Toast {
            message: message.into(),
            severity,
            shown_at: Instant::now(),
        });
    }

    /// Per-frame housekeeping: debounce timers and toast expiry.
    pub fn tick(&mut self, now: Instant) {
        self.customers.tick(now);
        self.products.tick(now);
        self.inventory.tick(now);
        self.categories.tick(now);
        self.users.tick(now);
        if let Some(toast) = &self.toast {
            if now.duration_since(toast.shown_at) > TOAST_TTL {
                self.toast = None;
            }
        }
    }

    /// (visible, filtered, total) for the active tab's collection.
    pub fn active_counts(&self) -> (usize, usize, usize) {
        fn counts<T: Resource>(lm: &ListManager<T>) -> (usize, usize, usize) {
            (lm.visible().len(), lm.filtered().len(), lm.len())
        }
        match self.active_tab {
            ActiveTab::Customers => counts(&self.customers),
            ActiveTab::Products => counts(&self.products),
            ActiveTab::Inventory => counts(&self.inventory),
            ActiveTab::Categories => counts(&self.categories),
            ActiveTab::Users => counts(&self.users),
        }
    }

    /// Search box contents for the active tab.
    pub fn active_query_input(&self) -> &str {
        match self.active_tab {
            ActiveTab::Customers => self.customers.query_input(),
            ActiveTab::Products => self.products.query_input(),
            ActiveTab::Inventory => self.inventory.query_input(),
            ActiveTab::Categories => self.categories.query_input(),
            ActiveTab::Users => self.users.query_input(),
        }
    }
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub title: Color,
    pub border: Color,
    pub header_fg: Color,
    pub header_bg: Color,
    pub status_fg: Color,
    pub status_bg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub ok: Color,
    pub warn: Color,
    pub err: Color,
}

impl Theme {
    /// Plain dark default.
    pub fn slate() -> Self {
        Self {
            text: Color::Rgb(0xd0, 0xd0, 0xd0),
            title: Color::Rgb(0x7a, 0xa2, 0xf7),
            border: Color::Rgb(0x41, 0x48, 0x68),
            header_fg: Color::Rgb(0xc0, 0xca, 0xf5),
            header_bg: Color::Rgb(0x1f, 0x23, 0x35),
            status_fg: Color::Rgb(0x1a, 0x1b, 0x26),
            status_bg: Color::Rgb(0x9a, 0xa5, 0xce),
            highlight_fg: Color::Rgb(0xe0, 0xaf, 0x68),
            highlight_bg: Color::Rgb(0x2f, 0x33, 0x49),
            ok: Color::Rgb(0x9e, 0xce, 0x6a),
            warn: Color::Rgb(0xe0, 0xaf, 0x68),
            err: Color::Rgb(0xf7, 0x76, 0x8e),
        }
    }

    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Info => self.text,
            Severity::Success => self.ok,
            Severity::Warning => self.warn,
            Severity::Error => self.err,
        }
    }

    /// Load theme from a simple key=value file. Unknown or missing keys
    /// fall back to `slate`.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::slate();
        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            if let Some(color) = Self::parse_color(val) {
                match key {
                    "text" => theme.text = color,
                    "title" => theme.title = color,
                    "border" => theme.border = color,
                    "header_fg" => theme.header_fg = color,
                    "header_bg" => theme.header_bg = color,
                    "status_fg" => theme.status_fg = color,
                    "status_bg" => theme.status_bg = color,
                    "highlight_fg" => theme.highlight_fg = color,
                    "highlight_bg" => theme.highlight_bg = color,
                    "ok" => theme.ok = color,
                    "warn" => theme.warn = color,
                    "err" => theme.err = color,
                    _ => {}
                }
            }
        }
        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(&lower);
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# backdesk theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");

        let mut kv = |k: &str, v: Color| {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        };
        kv("text", self.text);
        kv("title", self.title);
        kv("border", self.border);
        kv("header_fg", self.header_fg);
        kv("header_bg", self.header_bg);
        kv("status_fg", self.status_fg);
        kv("status_bg", self.status_bg);
        kv("highlight_fg", self.highlight_fg);
        kv("highlight_bg", self.highlight_bg);
        kv("ok", self.ok);
        kv("warn", self.warn);
        kv("err", self.err);

        std::fs::write(path, buf)
    }

    /// Ensure a config file exists; if missing, write the default and
    /// return it. On parse errors, fall back to `slate`.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_else(Self::slate);
        }
        let theme = Self::slate();
        let _ = theme.write_file(path);
        theme
    }
}

fn color_to_str(c: Color) -> String {
    match c {
        Color::Rgb(r, g, b) => format!("#{r:02X}{g:02X}{b:02X}"),
        Color::Reset => "reset".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
