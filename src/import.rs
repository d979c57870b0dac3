//! Bulk spreadsheet import.
//!
//! Accepts a CSV export of a spreadsheet, tolerating several header-name
//! variants per logical field ("Customer Name" / "customerName" / "Name").
//! Rows missing a hard-required field never reach the backend; they are
//! recorded with a reason instead of being dropped silently. The surviving
//! rows go out as one batch request, and the partitioned result is
//! reconciled by the caller: successes prepended to the collection, failures
//! reported (and exportable as a CSV report), never retried.

use std::collections::BTreeMap;

use crate::api::FailureEntry;
use crate::resource::{Resource, ResourceKind};

/// Header aliases for one logical field, in priority order.
pub struct FieldAlias {
    /// `Resource::set` key the column feeds.
    pub key: &'static str,
    pub aliases: &'static [&'static str],
    /// Rows missing a required field are skipped client-side.
    pub required: bool,
}

const CUSTOMER_ALIASES: &[FieldAlias] = &[
    FieldAlias { key: "name", aliases: &["customer name", "customername", "name"], required: true },
    FieldAlias { key: "email", aliases: &["email", "email address", "mail"], required: true },
    FieldAlias { key: "phone", aliases: &["phone", "phone number", "mobile"], required: false },
    FieldAlias { key: "address", aliases: &["address", "customer address"], required: false },
];

const CATEGORY_ALIASES: &[FieldAlias] = &[
    FieldAlias { key: "name", aliases: &["category name", "categoryname", "name"], required: true },
    FieldAlias { key: "description", aliases: &["description", "details"], required: false },
];

const INVENTORY_ALIASES: &[FieldAlias] = &[
    FieldAlias { key: "name", aliases: &["item name", "itemname", "name"], required: true },
    FieldAlias { key: "batch", aliases: &["batch", "batch no", "batchnumber"], required: true },
    FieldAlias { key: "supplier", aliases: &["supplier", "vendor"], required: false },
    FieldAlias { key: "quantity", aliases: &["quantity", "qty", "count"], required: true },
];

/// Alias table for an importable resource; `None` for resources without a
/// bulk-import path.
pub fn aliases_for(kind: ResourceKind) -> Option<&'static [FieldAlias]> {
    match kind {
        ResourceKind::Customer => Some(CUSTOMER_ALIASES),
        ResourceKind::Category => Some(CATEGORY_ALIASES),
        ResourceKind::Inventory => Some(INVENTORY_ALIASES),
        ResourceKind::Product | ResourceKind::AdminUser => None,
    }
}

/// One data row keyed by its normalized header names. `line` is 1-based
/// and counts the header line.
#[derive(Clone, Debug)]
pub struct SheetRow {
    pub line: usize,
    pub cells: BTreeMap<String, String>,
}

/// A row rejected before submission, with the reason shown in the report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowIssue {
    pub line: usize,
    pub reason: String,
}

/// Candidate records ready for the batch request plus the rows that never
/// made it that far.
pub struct ParsedBatch<T> {
    pub candidates: Vec<T>,
    pub skipped: Vec<RowIssue>,
}

/// Parse CSV text into rows keyed by header. Quoted cells may contain
/// commas and doubled quotes; blank lines are ignored.
pub fn parse_sheet(text: &str) -> Vec<SheetRow> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    let Some((_, header_line)) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = split_record(header_line)
        .into_iter()
        .map(|h| normalize_header(&h))
        .collect();

    let mut rows = Vec::new();
    for (idx, line) in lines {
        let cells_vec = split_record(line);
        let mut cells = BTreeMap::new();
        for (header, cell) in headers.iter().zip(cells_vec) {
            if !header.is_empty() {
                cells.insert(header.clone(), cell.trim().to_string());
            }
        }
        rows.push(SheetRow { line: idx + 1, cells });
    }
    rows
}

/// Lowercase and strip spaces/underscores/hyphens so "Customer Name",
/// "customer_name" and "customerName" all land on the same key.
fn normalize_header(h: &str) -> String {
    h.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Split one CSV record, honoring double quotes ("" escapes a quote).
fn split_record(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                cells.push(std::mem::take(&mut cell));
            }
            _ => cell.push(c),
        }
    }
    cells.push(cell);
    cells
}

/// Resolve a logical field from a row by walking its alias list in
/// priority order.
fn resolve<'a>(row: &'a SheetRow, alias: &FieldAlias) -> Option<&'a str> {
    alias
        .aliases
        .iter()
        .map(|a| normalize_header(a))
        .find_map(|a| row.cells.get(&a))
        .map(|s| s.as_str())
        .filter(|s| !s.is_empty())
}

/// Turn parsed rows into candidate records. Rows missing a required field
/// or carrying an unparseable value are skipped with a reason.
pub fn build_candidates<T>(rows: &[SheetRow]) -> ParsedBatch<T>
where
    T: Resource + Default,
{
    let aliases = aliases_for(T::kind()).unwrap_or(&[]);
    let mut candidates = Vec::new();
    let mut skipped = Vec::new();

    'rows: for row in rows {
        let mut record = T::default();
        for alias in aliases {
            match resolve(row, alias) {
                Some(value) => {
                    if let Err(msg) = record.set(alias.key, value) {
                        skipped.push(RowIssue { line: row.line, reason: msg });
                        continue 'rows;
                    }
                }
                None if alias.required => {
                    skipped.push(RowIssue {
                        line: row.line,
                        reason: format!("missing required field '{}'", alias.key),
                    });
                    continue 'rows;
                }
                None => {}
            }
        }
        candidates.push(record);
    }

    ParsedBatch { candidates, skipped }
}

/// How the mixed result should be toasted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImportSeverity {
    AllSucceeded,
    PartialSuccess,
    NoneSucceeded,
}

/// The reconciled outcome of one import run.
pub struct ImportOutcome<T> {
    pub successful: Vec<T>,
    pub failed: Vec<FailureEntry>,
    pub skipped: Vec<RowIssue>,
}

impl<T> ImportOutcome<T> {
    pub fn severity(&self) -> ImportSeverity {
        let rejected = self.failed.len() + self.skipped.len();
        if self.successful.is_empty() {
            ImportSeverity::NoneSucceeded
        } else if rejected == 0 {
            ImportSeverity::AllSucceeded
        } else {
            ImportSeverity::PartialSuccess
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} imported, {} rejected by server, {} skipped before submit",
            self.successful.len(),
            self.failed.len(),
            self.skipped.len()
        )
    }

    /// One report row per failure, downloadable as CSV.
    pub fn failure_report_csv(&self) -> String {
        let mut out = String::from("source,detail,reason\n");
        for issue in &self.skipped {
            out.push_str(&format!(
                "client,line {},{}\n",
                issue.line,
                csv_escape(&issue.reason)
            ));
        }
        for entry in &self.failed {
            let detail = entry
                .record
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            out.push_str(&format!(
                "server,{},{}\n",
                csv_escape(&detail),
                csv_escape(&entry.reason)
            ));
        }
        out
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || !self.skipped.is_empty()
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Customer, InventoryItem};

    #[test]
    fn header_aliases_resolve_in_priority_order() {
        let sheet = "Customer Name,Email Address,Phone Number\nAlice,a@example.com,0123456789\n";
        let rows = parse_sheet(sheet);
        assert_eq!(rows.len(), 1);
        let batch: ParsedBatch<Customer> = build_candidates(&rows);
        assert_eq!(batch.candidates.len(), 1);
        assert!(batch.skipped.is_empty());
        let c = &batch.candidates[0];
        assert_eq!(c.name, "Alice");
        assert_eq!(c.email, "a@example.com");
        assert_eq!(c.phone, "0123456789");
    }

    #[test]
    fn camel_case_headers_work_too() {
        let sheet = "customerName,email\nBob,b@example.com\n";
        let batch: ParsedBatch<Customer> = build_candidates(&parse_sheet(sheet));
        assert_eq!(batch.candidates[0].name, "Bob");
    }

    #[test]
    fn quoted_cells_keep_commas_and_quotes() {
        let sheet = "name,description\n\"Tools, small\",\"said \"\"ok\"\"\"\n";
        let batch: ParsedBatch<Category> = build_candidates(&parse_sheet(sheet));
        assert_eq!(batch.candidates[0].name, "Tools, small");
        assert_eq!(batch.candidates[0].description, "said \"ok\"");
    }

    #[test]
    fn rows_missing_required_fields_are_skipped_with_reason() {
        let sheet = "name,email\nAlice,a@example.com\n,missing@example.com\nCarol,\n";
        let batch: ParsedBatch<Customer> = build_candidates(&parse_sheet(sheet));
        assert_eq!(batch.candidates.len(), 1);
        assert_eq!(batch.skipped.len(), 2);
        assert_eq!(batch.skipped[0].line, 3);
        assert!(batch.skipped[0].reason.contains("name"));
        assert!(batch.skipped[1].reason.contains("email"));
    }

    #[test]
    fn unparseable_values_are_skipped_not_submitted() {
        let sheet = "item name,batch,qty\nWidget,B1,many\nBolt,B2,5\n";
        let batch: ParsedBatch<InventoryItem> = build_candidates(&parse_sheet(sheet));
        assert_eq!(batch.candidates.len(), 1);
        assert_eq!(batch.candidates[0].name, "Bolt");
        assert_eq!(batch.skipped.len(), 1);
        assert!(batch.skipped[0].reason.contains("whole number"));
    }

    #[test]
    fn severity_distinguishes_all_partial_none() {
        let full = ImportOutcome::<Customer> {
            successful: vec![Customer::default()],
            failed: vec![],
            skipped: vec![],
        };
        assert_eq!(full.severity(), ImportSeverity::AllSucceeded);

        let partial = ImportOutcome::<Customer> {
            successful: vec![Customer::default()],
            failed: vec![FailureEntry {
                record: serde_json::json!({"name": "D"}),
                reason: "duplicate".into(),
            }],
            skipped: vec![],
        };
        assert_eq!(partial.severity(), ImportSeverity::PartialSuccess);

        let none = ImportOutcome::<Customer> {
            successful: vec![],
            failed: vec![],
            skipped: vec![RowIssue { line: 2, reason: "missing".into() }],
        };
        assert_eq!(none.severity(), ImportSeverity::NoneSucceeded);
    }

    #[test]
    fn failure_report_lists_one_row_per_failure() {
        let outcome = ImportOutcome::<Customer> {
            successful: vec![],
            failed: vec![FailureEntry {
                record: serde_json::json!({"name": "Dan"}),
                reason: "duplicate, email".into(),
            }],
            skipped: vec![RowIssue { line: 4, reason: "missing required field 'name'".into() }],
        };
        let report = outcome.failure_report_csv();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 failures
        assert!(lines[1].starts_with("client,line 4,"));
        assert!(lines[2].contains("Dan"));
        assert!(lines[2].contains("\"duplicate, email\""));
    }
}
