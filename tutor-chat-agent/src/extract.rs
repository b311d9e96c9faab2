//! Visualization extraction from agent responses.
//!
//! Walks the parts of a [`RawResponse`] and turns known tool responses into
//! typed records. Only `functionResponse` parts are inspected; a
//! `functionCall` has no result yet.
//!
//! The two tools are gated differently:
//! - `plotting_tool` yields a record whenever the body has a `plot_data` or
//!   `success` key, so failed plots still reach the error panel.
//! - `circuit_visualization_tool` yields a record only for `success: true`
//!   with `image_data`; failed circuit calls produce nothing.

use serde_json::{Map, Value};

use crate::protocol::{FunctionResponse, RawResponse};
use crate::visualization::{
    CircuitRecord, DEFAULT_CIRCUIT_TITLE, DEFAULT_PLOT_TITLE, PlotRecord, PlotSpec, Visualizations,
};

/// Tool name whose responses carry plots.
pub const PLOTTING_TOOL: &str = "plotting_tool";

/// Tool name whose responses carry circuit diagrams.
pub const CIRCUIT_TOOL: &str = "circuit_visualization_tool";

/// Extract plot and circuit records from a response.
///
/// Returns empty sequences for `None` or a response without parts. Source
/// order is kept within each sequence. Never mutates `raw`.
pub fn extract(raw: Option<&RawResponse>) -> Visualizations {
    let mut out = Visualizations::default();
    let Some(raw) = raw else {
        return out;
    };

    for resp in raw.function_responses() {
        match resp.name.as_str() {
            PLOTTING_TOOL => {
                if let Some(plot) = plot_record(resp) {
                    out.plots.push(plot);
                }
            }
            CIRCUIT_TOOL => {
                if let Some(circuit) = circuit_record(resp) {
                    out.circuits.push(circuit);
                }
            }
            other => log::trace!("Ignoring function response from tool {other:?}"),
        }
    }

    out
}

fn response_body(resp: &FunctionResponse) -> Option<&Map<String, Value>> {
    let body = resp.response.as_object();
    if body.is_none() {
        log::debug!(
            "Function response from {} is not an object; skipping",
            resp.name
        );
    }
    body
}

fn plot_record(resp: &FunctionResponse) -> Option<PlotRecord> {
    let body = response_body(resp)?;
    if !body.contains_key("plot_data") && !body.contains_key("success") {
        log::debug!("plotting_tool response has neither plot_data nor success; skipping");
        return None;
    }

    let success = body
        .get("success")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let plot_spec = body.get("plot_data").and_then(PlotSpec::from_value);
    let equations = body
        .get("equations")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|e| e.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();
    let x_range = body
        .get("x_range")
        .and_then(|v| v.as_array())
        .and_then(|arr| match arr.as_slice() {
            [lo, hi] => Some([lo.as_f64()?, hi.as_f64()?]),
            _ => None,
        });

    Some(PlotRecord {
        success,
        plot_spec,
        equations,
        x_range,
        title: string_field(body, "title").unwrap_or_else(|| DEFAULT_PLOT_TITLE.to_string()),
        error: string_field(body, "error"),
        detail: string_field(body, "detail"),
    })
}

fn circuit_record(resp: &FunctionResponse) -> Option<CircuitRecord> {
    let body = response_body(resp)?;
    let success = body.get("success").and_then(|v| v.as_bool()) == Some(true);
    let image_data = body
        .get("image_data")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty());

    match (success, image_data) {
        (true, Some(image_data)) => Some(CircuitRecord {
            success,
            image_data: image_data.to_string(),
            title: string_field(body, "title")
                .unwrap_or_else(|| DEFAULT_CIRCUIT_TITLE.to_string()),
        }),
        _ => {
            log::debug!("circuit_visualization_tool response without success/image_data; skipping");
            None
        }
    }
}

fn string_field(body: &Map<String, Value>, key: &str) -> Option<String> {
    body.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::AxisData;

    fn raw(parts: Value) -> RawResponse {
        RawResponse::from_value(&serde_json::json!({
            "content": { "parts": parts },
            "author": "tutor_agent",
            "timestamp": 1.0,
            "id": "r1"
        }))
        .unwrap()
    }

    #[test]
    fn test_extract_none_and_empty() {
        assert!(extract(None).is_empty());
        assert!(extract(Some(&raw(serde_json::json!([])))).is_empty());
        assert!(extract(Some(&RawResponse::default())).is_empty());
    }

    #[test]
    fn test_extract_plot_keeps_encoding() {
        let r = raw(serde_json::json!([
            { "functionResponse": { "name": "plotting_tool", "response": {
                "success": true,
                "plot_data": {
                    "data": [{ "x": { "bdata": "AAAAAAAA8D8=", "dtype": "f8" }, "y": [1] }],
                    "layout": {}
                },
                "equations": ["x**2", "2*x"],
                "x_range": [-10, 10],
                "title": "Parabola"
            } } }
        ]));
        let vis = extract(Some(&r));
        assert_eq!(vis.plots.len(), 1);
        assert!(vis.circuits.is_empty());
        let plot = &vis.plots[0];
        assert!(plot.success);
        assert_eq!(plot.title, "Parabola");
        assert_eq!(plot.equations, vec!["x**2", "2*x"]);
        assert_eq!(plot.x_range, Some([-10.0, 10.0]));
        let spec = plot.plot_spec.as_ref().unwrap();
        assert!(matches!(spec.series[0].x, Some(AxisData::Encoded(_))));
    }

    #[test]
    fn test_extract_plot_defaults() {
        let r = raw(serde_json::json!([
            { "functionResponse": { "name": "plotting_tool", "response": { "success": true } } }
        ]));
        let vis = extract(Some(&r));
        let plot = &vis.plots[0];
        assert_eq!(plot.title, DEFAULT_PLOT_TITLE);
        assert!(plot.equations.is_empty());
        assert!(plot.x_range.is_none());
        assert!(plot.plot_spec.is_none());
    }

    #[test]
    fn test_extract_failed_plot_is_recorded() {
        let r = raw(serde_json::json!([
            { "functionResponse": { "name": "plotting_tool", "response": {
                "success": false,
                "error": "Invalid x_range. Must be [min, max] where min < max"
            } } }
        ]));
        let vis = extract(Some(&r));
        assert_eq!(vis.plots.len(), 1);
        assert!(!vis.plots[0].success);
        assert_eq!(
            vis.plots[0].error.as_deref(),
            Some("Invalid x_range. Must be [min, max] where min < max")
        );
    }

    #[test]
    fn test_extract_plot_without_gate_keys_skipped() {
        let r = raw(serde_json::json!([
            { "functionResponse": { "name": "plotting_tool", "response": {
                "error": "Plotting dependencies not available"
            } } }
        ]));
        assert!(extract(Some(&r)).is_empty());
    }

    #[test]
    fn test_extract_failed_circuit_yields_nothing() {
        let r = raw(serde_json::json!([
            { "functionResponse": { "name": "circuit_visualization_tool", "response": {
                "success": false, "image_data": "PHN2Zz48L3N2Zz4="
            } } },
            { "functionResponse": { "name": "circuit_visualization_tool", "response": {
                "success": true
            } } }
        ]));
        assert!(extract(Some(&r)).circuits.is_empty());
    }

    #[test]
    fn test_extract_circuit_empty_image_data_skipped() {
        let r = raw(serde_json::json!([
            { "functionResponse": { "name": "circuit_visualization_tool", "response": {
                "success": true, "image_data": "", "title": "Blank"
            } } }
        ]));
        assert!(extract(Some(&r)).is_empty());
    }

    #[test]
    fn test_extract_x_range_needs_exactly_two_numbers() {
        for range in [
            serde_json::json!([]),
            serde_json::json!([1]),
            serde_json::json!([1, 2, 3]),
            serde_json::json!(["a", "b"]),
        ] {
            let r = raw(serde_json::json!([
                { "functionResponse": { "name": "plotting_tool", "response": {
                    "success": true, "x_range": range
                } } }
            ]));
            assert!(extract(Some(&r)).plots[0].x_range.is_none());
        }
    }

    #[test]
    fn test_extract_empty_titles_use_defaults() {
        let r = raw(serde_json::json!([
            { "functionResponse": { "name": "plotting_tool", "response": {
                "success": true, "title": ""
            } } },
            { "functionResponse": { "name": "circuit_visualization_tool", "response": {
                "success": true, "image_data": "PHN2Zz48L3N2Zz4=", "title": ""
            } } }
        ]));
        let vis = extract(Some(&r));
        assert_eq!(vis.plots[0].title, DEFAULT_PLOT_TITLE);
        assert_eq!(vis.circuits[0].title, DEFAULT_CIRCUIT_TITLE);
    }

    #[test]
    fn test_extract_circuit() {
        let r = raw(serde_json::json!([
            { "functionResponse": { "name": "circuit_visualization_tool", "response": {
                "success": true, "image_data": "PHN2Zz48L3N2Zz4="
            } } }
        ]));
        let vis = extract(Some(&r));
        assert_eq!(vis.circuits.len(), 1);
        assert_eq!(vis.circuits[0].title, DEFAULT_CIRCUIT_TITLE);
        assert_eq!(vis.circuits[0].decode_svg().unwrap(), "<svg></svg>");
    }

    #[test]
    fn test_extract_ignores_calls_and_unrelated_tools() {
        let r = raw(serde_json::json!([
            { "functionCall": { "name": "plotting_tool", "args": { "equations": ["x"] } } },
            { "functionResponse": { "name": "calculator", "response": { "success": true } } },
            { "functionResponse": { "response": { "success": true, "plot_data": {} } } },
            { "text": "done" }
        ]));
        assert!(extract(Some(&r)).is_empty());
    }

    #[test]
    fn test_extract_preserves_order_and_is_idempotent() {
        let r = raw(serde_json::json!([
            { "functionResponse": { "name": "plotting_tool", "response": { "success": true, "title": "first" } } },
            { "functionResponse": { "name": "circuit_visualization_tool", "response": {
                "success": true, "image_data": "PHN2Zz48L3N2Zz4=", "title": "RC" } } },
            { "functionResponse": { "name": "plotting_tool", "response": { "success": true, "title": "second" } } }
        ]));
        let first = extract(Some(&r));
        let titles: Vec<_> = first.plots.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);
        assert_eq!(first.circuits[0].title, "RC");
        assert_eq!(extract(Some(&r)), first);
    }

    #[test]
    fn test_extract_non_object_body_skipped() {
        let r = raw(serde_json::json!([
            { "functionResponse": { "name": "plotting_tool", "response": "oops" } }
        ]));
        assert!(extract(Some(&r)).is_empty());
    }
}
