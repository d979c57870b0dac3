//! The `Resource` trait: what the generic list machinery needs to know
//! about a record.
//!
//! Records are otherwise opaque: a stable string id, a set of searchable
//! fields, an optional creation timestamp for default ordering, and a flat
//! list of field descriptors driving forms, tables and validation.

use chrono::{DateTime, Utc};

/// Which backend resource a record belongs to. Used to build routes and to
/// dispatch modal actions without making the modal state generic.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Customer,
    Product,
    Inventory,
    Category,
    AdminUser,
}

impl ResourceKind {
    /// Singular path segment, e.g. `customer` in `/customer/create-customer`.
    pub fn slug(self) -> &'static str {
        match self {
            ResourceKind::Customer => "customer",
            ResourceKind::Product => "product",
            ResourceKind::Inventory => "inventory",
            ResourceKind::Category => "category",
            ResourceKind::AdminUser => "user",
        }
    }

    /// Plural form used by list and bulk routes and as the bulk payload key.
    pub fn plural(self) -> &'static str {
        match self {
            ResourceKind::Customer => "customers",
            ResourceKind::Product => "products",
            ResourceKind::Inventory => "inventories",
            ResourceKind::Category => "categories",
            ResourceKind::AdminUser => "users",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ResourceKind::Customer => "Customers",
            ResourceKind::Product => "Products",
            ResourceKind::Inventory => "Inventory",
            ResourceKind::Category => "Categories",
            ResourceKind::AdminUser => "Admin users",
        }
    }
}

/// Synchronous validation rules, checked on every edit and again at save.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    Required,
    MinLen(usize),
    /// Exactly `n` ASCII digits (e.g. a 10-digit phone number).
    Digits(usize),
    Email,
    /// Parses as a number >= 0 (price, quantity).
    NonNegativeNumber,
}

/// One field of a record as the UI sees it.
pub struct FieldSpec {
    /// JSON key, also the accessor key for `Resource::get`/`set`.
    pub key: &'static str,
    pub label: &'static str,
    pub rules: &'static [Rule],
    /// Server-managed fields (id, createdAt) are not editable and are
    /// stripped from update payloads.
    pub editable: bool,
    /// Whether the field appears as a table column.
    pub column: bool,
}

/// A record the generic list manager can drive.
pub trait Resource: Clone {
    fn kind() -> ResourceKind;

    /// Stable unique id; empty string for a record not yet created.
    fn id(&self) -> &str;

    /// JSON key of the id field, stripped from update payloads.
    fn id_key() -> &'static str;

    /// Creation timestamp for default newest-first ordering. Records from
    /// older endpoints may lack it; ordering then falls back to the id.
    fn created_at(&self) -> Option<DateTime<Utc>>;

    fn field_specs() -> &'static [FieldSpec];

    /// Keys checked by the search engine, in order.
    fn search_keys() -> &'static [&'static str];

    /// Field value as a display string. Unknown keys yield an empty string,
    /// so absent fields never match a search term.
    fn get(&self, key: &str) -> String;

    /// Set a field from its string form. Returns a message when the value
    /// does not parse (e.g. a non-numeric price).
    fn set(&mut self, key: &str, value: &str) -> Result<(), String>;

    /// Case-insensitive substring match over the searchable fields.
    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        Self::search_keys()
            .iter()
            .any(|k| self.get(k).to_lowercase().contains(needle))
    }
}
