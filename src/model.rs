//! Concrete record types for the five backend resources.
//!
//! Field names mirror the backend JSON (camelCase). Ids and `createdAt` are
//! server-managed: empty/absent on records built client-side (bulk-import
//! candidates, create forms) and skipped when serializing such records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{FieldSpec, Resource, ResourceKind, Rule};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "customerId", default, skip_serializing_if = "String::is_empty")]
    pub customer_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

const CUSTOMER_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "customerId", label: "ID", rules: &[], editable: false, column: true },
    FieldSpec { key: "name", label: "Name", rules: &[Rule::Required, Rule::MinLen(2)], editable: true, column: true },
    FieldSpec { key: "email", label: "Email", rules: &[Rule::Required, Rule::Email], editable: true, column: true },
    FieldSpec { key: "phone", label: "Phone", rules: &[Rule::Required, Rule::Digits(10)], editable: true, column: true },
    FieldSpec { key: "address", label: "Address", rules: &[], editable: true, column: false },
];

impl Resource for Customer {
    fn kind() -> ResourceKind {
        ResourceKind::Customer
    }
    fn id(&self) -> &str {
        &self.customer_id
    }
    fn id_key() -> &'static str {
        "customerId"
    }
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
    fn field_specs() -> &'static [FieldSpec] {
        CUSTOMER_FIELDS
    }
    fn search_keys() -> &'static [&'static str] {
        &["name", "email", "phone"]
    }
    fn get(&self, key: &str) -> String {
        match key {
            "customerId" => self.customer_id.clone(),
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "phone" => self.phone.clone(),
            "address" => self.address.clone(),
            _ => String::new(),
        }
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            "phone" => self.phone = value.to_string(),
            "address" => self.address = value.to_string(),
            other => return Err(format!("unknown field '{other}'")),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "productId", default, skip_serializing_if = "String::is_empty")]
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

const PRODUCT_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "productId", label: "ID", rules: &[], editable: false, column: true },
    FieldSpec { key: "name", label: "Name", rules: &[Rule::Required, Rule::MinLen(2)], editable: true, column: true },
    FieldSpec { key: "barcode", label: "Barcode", rules: &[Rule::Required], editable: true, column: true },
    FieldSpec { key: "category", label: "Category", rules: &[], editable: true, column: true },
    FieldSpec { key: "price", label: "Price", rules: &[Rule::Required, Rule::NonNegativeNumber], editable: true, column: true },
    FieldSpec { key: "stock", label: "Stock", rules: &[Rule::NonNegativeNumber], editable: true, column: false },
];

impl Resource for Product {
    fn kind() -> ResourceKind {
        ResourceKind::Product
    }
    fn id(&self) -> &str {
        &self.product_id
    }
    fn id_key() -> &'static str {
        "productId"
    }
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
    fn field_specs() -> &'static [FieldSpec] {
        PRODUCT_FIELDS
    }
    fn search_keys() -> &'static [&'static str] {
        &["name", "barcode", "category"]
    }
    fn get(&self, key: &str) -> String {
        match key {
            "productId" => self.product_id.clone(),
            "name" => self.name.clone(),
            "barcode" => self.barcode.clone(),
            "category" => self.category.clone(),
            "price" => format_number(self.price),
            "stock" => self.stock.to_string(),
            _ => String::new(),
        }
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => self.name = value.to_string(),
            "barcode" => self.barcode = value.to_string(),
            "category" => self.category = value.to_string(),
            "price" => {
                self.price = value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| "price must be a number".to_string())?;
            }
            "stock" => {
                self.stock = value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| "stock must be a whole number".to_string())?;
            }
            other => return Err(format!("unknown field '{other}'")),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(rename = "inventoryId", default, skip_serializing_if = "String::is_empty")]
    pub inventory_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

const INVENTORY_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "inventoryId", label: "ID", rules: &[], editable: false, column: true },
    FieldSpec { key: "name", label: "Name", rules: &[Rule::Required, Rule::MinLen(2)], editable: true, column: true },
    FieldSpec { key: "batch", label: "Batch", rules: &[Rule::Required], editable: true, column: true },
    FieldSpec { key: "supplier", label: "Supplier", rules: &[], editable: true, column: true },
    FieldSpec { key: "quantity", label: "Quantity", rules: &[Rule::Required, Rule::NonNegativeNumber], editable: true, column: true },
];

impl Resource for InventoryItem {
    fn kind() -> ResourceKind {
        ResourceKind::Inventory
    }
    fn id(&self) -> &str {
        &self.inventory_id
    }
    fn id_key() -> &'static str {
        "inventoryId"
    }
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
    fn field_specs() -> &'static [FieldSpec] {
        INVENTORY_FIELDS
    }
    fn search_keys() -> &'static [&'static str] {
        &["name", "batch", "supplier"]
    }
    fn get(&self, key: &str) -> String {
        match key {
            "inventoryId" => self.inventory_id.clone(),
            "name" => self.name.clone(),
            "batch" => self.batch.clone(),
            "supplier" => self.supplier.clone(),
            "quantity" => self.quantity.to_string(),
            _ => String::new(),
        }
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => self.name = value.to_string(),
            "batch" => self.batch = value.to_string(),
            "supplier" => self.supplier = value.to_string(),
            "quantity" => {
                self.quantity = value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| "quantity must be a whole number".to_string())?;
            }
            other => return Err(format!("unknown field '{other}'")),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "categoryId", default, skip_serializing_if = "String::is_empty")]
    pub category_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

const CATEGORY_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "categoryId", label: "ID", rules: &[], editable: false, column: true },
    FieldSpec { key: "name", label: "Name", rules: &[Rule::Required, Rule::MinLen(2)], editable: true, column: true },
    FieldSpec { key: "description", label: "Description", rules: &[], editable: true, column: true },
];

impl Resource for Category {
    fn kind() -> ResourceKind {
        ResourceKind::Category
    }
    fn id(&self) -> &str {
        &self.category_id
    }
    fn id_key() -> &'static str {
        "categoryId"
    }
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
    fn field_specs() -> &'static [FieldSpec] {
        CATEGORY_FIELDS
    }
    fn search_keys() -> &'static [&'static str] {
        &["name", "description"]
    }
    fn get(&self, key: &str) -> String {
        match key {
            "categoryId" => self.category_id.clone(),
            "name" => self.name.clone(),
            "description" => self.description.clone(),
            _ => String::new(),
        }
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => self.name = value.to_string(),
            "description" => self.description = value.to_string(),
            other => return Err(format!("unknown field '{other}'")),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(rename = "userId", default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

const ADMIN_USER_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "userId", label: "ID", rules: &[], editable: false, column: true },
    FieldSpec { key: "name", label: "Name", rules: &[Rule::Required, Rule::MinLen(2)], editable: true, column: true },
    FieldSpec { key: "email", label: "Email", rules: &[Rule::Required, Rule::Email], editable: true, column: true },
    FieldSpec { key: "role", label: "Role", rules: &[Rule::Required], editable: true, column: true },
];

impl Resource for AdminUser {
    fn kind() -> ResourceKind {
        ResourceKind::AdminUser
    }
    fn id(&self) -> &str {
        &self.user_id
    }
    fn id_key() -> &'static str {
        "userId"
    }
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
    fn field_specs() -> &'static [FieldSpec] {
        ADMIN_USER_FIELDS
    }
    fn search_keys() -> &'static [&'static str] {
        &["name", "email", "role"]
    }
    fn get(&self, key: &str) -> String {
        match key {
            "userId" => self.user_id.clone(),
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "role" => self.role.clone(),
            _ => String::new(),
        }
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            "role" => self.role = value.to_string(),
            other => return Err(format!("unknown field '{other}'")),
        }
        Ok(())
    }
}

/// Render a price without a trailing `.0` for whole values.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_get_set_roundtrip() {
        let mut c = Customer::default();
        c.set("name", "Alice").unwrap();
        c.set("phone", "0123456789").unwrap();
        assert_eq!(c.get("name"), "Alice");
        assert_eq!(c.get("phone"), "0123456789");
        assert_eq!(c.get("nope"), "");
        assert!(c.set("customerId", "c1").is_err());
    }

    #[test]
    fn product_numeric_fields_parse_or_reject() {
        let mut p = Product::default();
        p.set("price", "12.5").unwrap();
        assert_eq!(p.price, 12.5);
        assert_eq!(p.get("price"), "12.5");
        p.set("price", "40").unwrap();
        assert_eq!(p.get("price"), "40");
        assert!(p.set("price", "cheap").is_err());
        assert!(p.set("stock", "2.5").is_err());
    }

    #[test]
    fn matches_is_case_insensitive_and_skips_absent_fields() {
        let c = Customer {
            name: "Alice".into(),
            ..Customer::default()
        };
        assert!(c.matches("ali"));
        assert!(!c.matches("bob"));
        // email/phone are empty and must never match
        assert!(!c.matches("@"));
    }

    #[test]
    fn client_side_records_skip_server_managed_fields() {
        let c = Customer {
            name: "Alice".into(),
            email: "a@example.com".into(),
            ..Customer::default()
        };
        let v = serde_json::to_value(&c).unwrap();
        assert!(v.get("customerId").is_none());
        assert!(v.get("createdAt").is_none());
        assert_eq!(v["name"], "Alice");
    }
}
