//! render_json.rs: report models as pretty JSON.
//! Field order follows struct layout, so the output is stable without a key sort.

use crate::{ReportError, ReportModel};

#[derive(serde::Serialize)]
struct ReportBundle<'a> {
    count: usize,
    reports: &'a [ReportModel],
}

pub fn render_json(models: &[ReportModel]) -> Result<String, ReportError> {
    serde_json::to_string_pretty(&ReportBundle { count: models.len(), reports: models })
        .map_err(|e| ReportError::Serialize(e.to_string()))
}
