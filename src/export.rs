//! Export helpers: the current view as CSV, or one record as a printable
//! plain-text document.

use std::path::Path;

use crate::resource::Resource;

/// Serialize records to CSV, one column per field descriptor, reading the
/// view in its current order.
pub fn view_to_csv<T: Resource>(records: &[&T]) -> String {
    let specs = T::field_specs();
    let mut out = String::new();
    let header: Vec<String> = specs.iter().map(|s| escape(s.label)).collect();
    out.push_str(&header.join(","));
    out.push('\n');
    for record in records {
        let row: Vec<String> = specs.iter().map(|s| escape(&record.get(s.key))).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// A single record rendered as a labeled document.
pub fn record_document<T: Resource>(record: &T) -> String {
    let mut out = format!("{} {}\n", T::kind().title(), record.id());
    out.push_str(&"-".repeat(out.trim_end().len()));
    out.push('\n');
    for spec in T::field_specs() {
        out.push_str(&format!("{}: {}\n", spec.label, record.get(spec.key)));
    }
    out
}

pub fn write_export(path: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

fn escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Customer;

    fn sample() -> Customer {
        Customer {
            customer_id: "c1".into(),
            name: "Acme, Inc".into(),
            email: "sales@acme.test".into(),
            phone: "0123456789".into(),
            address: "1 Main St".into(),
            created_at: None,
        }
    }

    #[test]
    fn csv_quotes_cells_with_commas() {
        let c = sample();
        let csv = view_to_csv(&[&c]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "ID,Name,Email,Phone,Address");
        assert!(lines[1].starts_with("c1,\"Acme, Inc\","));
    }

    #[test]
    fn record_document_lists_every_field() {
        let doc = record_document(&sample());
        assert!(doc.starts_with("Customers c1"));
        assert!(doc.contains("Email: sales@acme.test"));
        assert!(doc.contains("Phone: 0123456789"));
    }
}
