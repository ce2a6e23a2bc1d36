//! CSV export of the material list.

use ecoblock_inventory::MaterialRecord;

pub const CSV_HEADER: &str =
    "id,material,quantity,source,carbon_savings,project_location,used_in_project,date_added";

/// Render records as CSV, one line per record after the header.
///
/// Text columns are always quoted; embedded quotes are doubled. Unset
/// project metadata is written as an empty field.
pub fn materials_to_csv(records: &[MaterialRecord]) -> String {
    let mut out = String::with_capacity(96 * (records.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            r.id_typed(),
            quote(r.material_type().as_str()),
            r.quantity(),
            quote(r.source()),
            r.carbon_savings_kg(),
            r.project_location().map(quote).unwrap_or_default(),
            r.used_in_project().map(quote).unwrap_or_default(),
            r.date_added().map(|d| d.to_string()).unwrap_or_default(),
        ));
    }
    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
