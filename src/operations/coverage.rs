//! API security coverage: endpoints and the controls guarding them.

use serde::Serialize;

use crate::db::CodeIndex;
use crate::error::Result;

/// One endpoint with its authorization/validation controls.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageRow {
    pub file: String,
    pub line: u32,
    pub method: String,
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler_function: Option<String>,
    /// Control names attached to the endpoint (JWT, session, ...).
    pub controls: Vec<String>,
    pub control_count: usize,
    pub has_auth: bool,
}

/// Report every endpoint with its controls.
///
/// Left-outer aggregation grouped by endpoint identity: an endpoint with no
/// controls is reported as uncontrolled, never omitted. `route_filter`
/// restricts by substring on the route pattern or path.
pub fn get_api_security_coverage(
    index: &CodeIndex,
    route_filter: Option<&str>,
) -> Result<Vec<CoverageRow>> {
    let rows = index.endpoint_coverage(route_filter)?;
    Ok(rows
        .into_iter()
        .map(|r| {
            let controls: Vec<String> = r
                .controls_concat
                .as_deref()
                .unwrap_or("")
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
            let control_count = controls.len();
            CoverageRow {
                file: r.file,
                line: r.line,
                method: r.method,
                pattern: r.pattern,
                path: r.path,
                handler_function: r.handler_function,
                controls,
                control_count,
                has_auth: control_count > 0,
            }
        })
        .collect())
}
