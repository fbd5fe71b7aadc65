use super::Outcome;
use provision_core::report::{ReportStore, OUTPUT};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;

/// Lists reports oldest first, without their output. Fields are printed
/// in sorted order.
pub fn run(store: &ReportStore, out: &mut impl Write) -> anyhow::Result<Outcome> {
    for report in store.list_ordered()? {
        let summary = match report.content {
            Value::Object(fields) => {
                let fields: BTreeMap<String, Value> =
                    fields.into_iter().filter(|(name, _)| name != OUTPUT).collect();
                serde_json::to_string(&fields)?
            }
            other => serde_json::to_string(&other)?,
        };
        writeln!(out, "{} {} {}", report.name, report.modified.format("%c"), summary)?;
    }
    Ok(Outcome::Completed)
}
