//! Plain-text presentation of messages, plots and circuits, plus file export.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use tutor_chat_agent::{CircuitRecord, PlotRecord, PreparedContent};

use crate::conversation::{ChatMessage, Role};

/// `You` / `Tutor` header with local time.
pub fn header(message: &ChatMessage) -> String {
    let who = match message.role {
        Role::User => "You",
        Role::Assistant => "Tutor",
    };
    match Local.timestamp_millis_opt(message.timestamp_ms).single() {
        Some(time) => format!("{who} [{}]", time.format("%H:%M")),
        None => who.to_string(),
    }
}

/// Full text block for one prepared message.
pub fn render_message(message: &ChatMessage, prepared: &PreparedContent) -> String {
    let mut out = header(message);
    out.push('\n');
    if !prepared.text.is_empty() {
        out.push_str(&prepared.text);
        out.push('\n');
    }
    for plot in &prepared.plots {
        out.push('\n');
        out.push_str(&plot_panel(plot));
    }
    for circuit in &prepared.circuits {
        out.push('\n');
        out.push_str(&circuit_panel(circuit));
    }
    out
}

/// Summary panel for a plot record, or its error panel.
pub fn plot_panel(plot: &PlotRecord) -> String {
    if !plot.success {
        return plot_error_panel(plot);
    }
    let Some(spec) = &plot.plot_spec else {
        return "[plot] Invalid plot data structure\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "[plot] {}", plot.title);
    if plot.equations.is_empty() {
        out.push_str("  Equations: No equations specified\n");
    } else {
        let _ = writeln!(out, "  Equations: {}", plot.equations.join(", "));
    }
    match plot.x_range {
        Some([lo, hi]) => {
            let _ = writeln!(out, "  X-range: [{lo}, {hi}]");
        }
        None => out.push_str("  X-range: No range specified\n"),
    }
    for (i, series) in spec.series.iter().enumerate() {
        let name = series
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("trace {}", i + 1));
        let mode = series.mode().unwrap_or("default");
        let points = series
            .point_count()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());
        let _ = writeln!(out, "  - {name} ({mode}): {points} points");
    }
    out
}

fn plot_error_panel(plot: &PlotRecord) -> String {
    let error = plot.error.as_deref().unwrap_or("Unknown error");
    match plot.detail.as_deref() {
        Some(detail) => format!("[plot] Plot Error: {error} - {detail}\n"),
        None => format!("[plot] Plot Error: {error}\n"),
    }
}

/// Summary panel for a circuit record.
pub fn circuit_panel(circuit: &CircuitRecord) -> String {
    match circuit.decode_svg() {
        Ok(svg) => format!("[circuit] {}\n  SVG diagram, {} bytes\n", circuit.title, svg.len()),
        Err(e) => {
            log::warn!("Circuit {:?} failed to decode: {e}", circuit.title);
            "[circuit] Circuit Rendering Error: Failed to decode SVG data\n".to_string()
        }
    }
}

/// Write the message's plots as Plotly JSON and its circuits as SVG into
/// `dir`. Returns the written paths.
///
/// Plots without a spec and circuits that fail to decode are skipped.
pub fn export(dir: &Path, message_id: &str, prepared: &PreparedContent) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let stem = file_stem(message_id);
    let mut written = Vec::new();

    for (i, plot) in prepared.plots.iter().enumerate() {
        let Some(spec) = &plot.plot_spec else {
            continue;
        };
        let path = dir.join(format!("{stem}-plot-{}.json", i + 1));
        let json = serde_json::to_string_pretty(&spec.to_plotly_json())?;
        fs::write(&path, json)?;
        log::info!("Exported plot to {:?}", path);
        written.push(path);
    }

    for (i, circuit) in prepared.circuits.iter().enumerate() {
        let Ok(svg) = circuit.decode_svg() else {
            continue;
        };
        let path = dir.join(format!("{stem}-circuit-{}.svg", i + 1));
        fs::write(&path, svg)?;
        log::info!("Exported circuit to {:?}", path);
        written.push(path);
    }

    Ok(written)
}

/// Message ids come from the server; keep only filename-safe characters.
fn file_stem(message_id: &str) -> String {
    let stem: String = message_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "message".to_string()
    } else {
        stem
    }
}
