use serde_json::{Value, json};

use crate::encoding::DetectionSource;
use crate::error::DecodeAttempt;
use crate::probe::{OwnedOutcome, ProbeResult, Tally};
use crate::shape::{RootKind, Shape};

/// How a document's text encoding was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingReport {
    /// Canonical name of the encoding the document was decoded with.
    pub name: &'static str,
    /// How the initial guess was made.
    pub source: DetectionSource,
    /// Name of the encoding detection first suggested.
    pub detected: &'static str,
    /// Whether the data started with a byte order mark.
    pub has_bom: bool,
}

impl EncodingReport {
    /// Whether decoding had to fall back past the detected encoding.
    pub fn fell_back(&self) -> bool {
        self.name != self.detected
    }
}

/// Everything learned from inspecting one JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Encoding used to decode the document.
    pub encoding: EncodingReport,
    /// Candidate encodings that failed before the one that worked.
    pub attempts: Vec<DecodeAttempt>,
    /// Top-level structure.
    pub shape: Shape,
    /// Probe results against the sample item.
    pub probes: Vec<ProbeResult>,
    /// Value tallies across all items.
    pub tallies: Vec<Tally>,
}

/// Render a human-readable summary.
///
/// With `details`, the sample item is pretty-printed in full and failed
/// decode attempts are listed.
pub fn render_text(name: &str, report: &Report, details: bool) -> String {
    let shape = &report.shape;
    let enc = &report.encoding;
    let mut lines = vec![format!("File: {name}")];

    let mut encoding = format!("  Encoding: {} ({})", enc.name, enc.source);
    if enc.fell_back() {
        encoding.push_str(", fell back from ");
        encoding.push_str(enc.detected);
    }
    lines.push(encoding);
    if details {
        lines.extend(report.attempts.iter().map(|a| format!("    tried {a}")));
    }

    match (shape.root, shape.len) {
        (RootKind::Array, Some(len)) => lines.push(format!("  Root: list of length {len}")),
        (RootKind::Object, Some(len)) => {
            lines.push(format!("  Root: dict with {len} keys"));
            lines.push(format!("  Keys: {}", shape.keys.join(", ")));
        }
        (root, _) => lines.push(format!("  Root: {root}")),
    }

    if let Some(wrapper) = &shape.wrapper {
        lines.push(format!(
            "  Found {wrapper:?} key with {} items",
            shape.items.len()
        ));
    }

    if let Some(keys) = shape.sample_keys() {
        lines.push(format!("  Sample item keys: {}", keys.join(", ")));
    }

    if let Some(sample) = &shape.sample {
        if details {
            lines.push(String::new());
            lines.push("--- SAMPLE ITEM ---".to_string());
            lines.push(pretty(sample));
        } else {
            lines.push(format!("  Sample item: {sample}"));
        }
    }

    if !report.probes.is_empty() {
        lines.push(String::new());
        lines.push("--- PLATFORM CHECK ---".to_string());
        lines.extend(report.probes.iter().map(ToString::to_string));
    }

    for tally in &report.tallies {
        lines.push(String::new());
        lines.push(format!("--- TALLY {} ({} items) ---", tally.path, tally.total()));
        lines.extend(
            tally
                .counts
                .iter()
                .map(|(value, count)| format!("{count:>6}  {value}")),
        );
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Render the report as a single-line JSON object.
pub fn render_json(name: &str, report: &Report) -> String {
    let shape = &report.shape;

    let attempts: Vec<Value> = report
        .attempts
        .iter()
        .map(|a| json!({"encoding": a.encoding, "error": a.reason}))
        .collect();

    let probes: Vec<Value> = report
        .probes
        .iter()
        .map(|p| match &p.outcome {
            OwnedOutcome::Found(v) => json!({"path": p.path.to_string(), "value": v}),
            OwnedOutcome::Missing { at } => {
                json!({"path": p.path.to_string(), "missing": at})
            }
            OwnedOutcome::NotContainer { at, found } => json!({
                "path": p.path.to_string(),
                "error": format!("cannot look up {at:?} in a {found}"),
            }),
        })
        .collect();

    let tallies: Vec<Value> = report
        .tallies
        .iter()
        .map(|t| {
            let counts: serde_json::Map<String, Value> = t
                .counts
                .iter()
                .map(|(value, count)| (value.clone(), json!(count)))
                .collect();
            json!({"path": t.path.to_string(), "counts": counts})
        })
        .collect();

    json!({
        "file": name,
        "encoding": {
            "name": report.encoding.name,
            "detected": report.encoding.detected,
            "source": report.encoding.source.to_string(),
            "has_bom": report.encoding.has_bom,
        },
        "attempts": attempts,
        "root": shape.root.to_string(),
        "len": shape.len,
        "keys": shape.keys,
        "wrapper": shape.wrapper,
        "sample_keys": shape.sample_keys(),
        "sample": shape.sample,
        "probes": probes,
        "tallies": tallies,
    })
    .to_string()
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
