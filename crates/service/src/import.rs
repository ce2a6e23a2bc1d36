//! Bulk intake from CSV.
//!
//! Columns are matched by header name, case-insensitively. `material`,
//! `quantity`, `source` and `carbon_savings` are required;
//! `project_location`, `used_in_project` and `date_added` (`YYYY-MM-DD`) are
//! optional. Any other column (`id` from an export, `actual_usage`, ...) is
//! ignored, so an export can be imported unchanged.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use ecoblock_core::{DomainError, DomainResult};
use ecoblock_inventory::{MaterialType, NewMaterial};

/// Outcome of one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows matching a stored record's material and `date_added`.
    pub skipped: usize,
}

/// Parse every data row into an intake payload.
///
/// Fails on the first malformed row; errors name the line it starts on.
pub fn parse_materials_csv(text: &str) -> DomainResult<Vec<NewMaterial>> {
    let mut rows = split_rows(text)?.into_iter();
    let Some((_, header)) = rows.next() else {
        return Err(DomainError::validation("csv input has no header row"));
    };
    let columns = Columns::from_header(&header)?;
    rows.map(|(line, fields)| columns.material(&fields).map_err(|e| at_line(line, e)))
        .collect()
}

struct Columns {
    material: usize,
    quantity: usize,
    source: usize,
    carbon_savings: usize,
    project_location: Option<usize>,
    used_in_project: Option<usize>,
    date_added: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> DomainResult<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                DomainError::validation(format!("csv header is missing the {name:?} column"))
            })
        };
        Ok(Self {
            material: require("material")?,
            quantity: require("quantity")?,
            source: require("source")?,
            carbon_savings: require("carbon_savings")?,
            project_location: find("project_location"),
            used_in_project: find("used_in_project"),
            date_added: find("date_added"),
        })
    }

    fn material(&self, fields: &[String]) -> DomainResult<NewMaterial> {
        let mut material = NewMaterial::new(
            MaterialType::new(field(fields, self.material))?,
            decimal("quantity", field(fields, self.quantity))?,
            field(fields, self.source),
            decimal("carbon_savings", field(fields, self.carbon_savings))?,
        );
        if let Some(location) = optional(fields, self.project_location) {
            material = material.with_project_location(location);
        }
        if let Some(project) = optional(fields, self.used_in_project) {
            material = material.with_used_in_project(project);
        }
        if let Some(raw) = optional(fields, self.date_added) {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                DomainError::validation(format!("date_added {raw:?} is not a YYYY-MM-DD date"))
            })?;
            material = material.with_date_added(date);
        }
        Ok(material)
    }
}

/// Missing trailing fields read as empty.
fn field(fields: &[String], idx: usize) -> &str {
    fields.get(idx).map(|f| f.trim()).unwrap_or("")
}

fn optional(fields: &[String], idx: Option<usize>) -> Option<&str> {
    idx.map(|i| field(fields, i)).filter(|f| !f.is_empty())
}

fn decimal(column: &str, raw: &str) -> DomainResult<Decimal> {
    Decimal::from_str(raw)
        .map_err(|_| DomainError::validation(format!("{column} {raw:?} is not a number")))
}

fn at_line(line: usize, err: DomainError) -> DomainError {
    match err {
        DomainError::Validation(msg) => DomainError::validation(format!("csv line {line}: {msg}")),
        other => other,
    }
}

/// Split CSV text into rows of unquoted fields, tagged with the line each
/// row starts on. Quoted fields may hold commas, doubled quotes and line
/// breaks. Blank lines are skipped.
fn split_rows(text: &str) -> DomainResult<Vec<(usize, Vec<String>)>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_line = 1;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                push_row(&mut rows, row_line, std::mem::take(&mut row));
                line += 1;
                row_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(DomainError::validation(format!(
            "csv line {row_line}: unterminated quoted field"
        )));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        push_row(&mut rows, row_line, row);
    }
    Ok(rows)
}

fn push_row(rows: &mut Vec<(usize, Vec<String>)>, line: usize, row: Vec<String>) {
    let blank = row.len() == 1 && row[0].trim().is_empty();
    if !blank {
        rows.push((line, row));
    }
}
