//! json-nose: encoding-aware JSON payload inspector
//!
//! Loads a JSON document of unknown provenance (typically an export saved from
//! a workflow-automation tool), works out its text encoding, parses it, and
//! summarises its top-level shape.
//!
//! # Quick Start
//!
//! ```no_run
//! use json_nose::Inspector;
//!
//! let inspector = Inspector::new();
//! let report = inspector.inspect_path("n8n_response.json").unwrap();
//!
//! println!("Encoding: {}", report.encoding.name);
//! println!("Root: {}", report.shape.root);
//! println!("Sample: {:?}", report.shape.sample);
//! ```
//!
//! # Encoding fallback
//!
//! Exports saved from Windows shells are often UTF-16, with or without a byte
//! order mark. Decoding tries, in order:
//! 1. the detected encoding (BOM, UTF-16 byte pattern, UTF-8 validity, or a
//!    chardetng guess)
//! 2. UTF-16LE
//! 3. UTF-8
//!
//! The first encoding that decodes cleanly *and* parses as JSON wins.
//!
//! # Probes and tallies
//!
//! ```no_run
//! use json_nose::{Inspector, KeyPath};
//!
//! let mut inspector = Inspector::new();
//! inspector
//!     .probes(vec![KeyPath::parse("properties.Status.status.name").unwrap()])
//!     .tally(KeyPath::parse("properties.Platform.select.name").unwrap());
//!
//! let report = inspector.inspect_path("n8n_response.json").unwrap();
//! for tally in &report.tallies {
//!     println!("{}: {:?}", tally.path, tally.counts);
//! }
//! ```

mod encoding;
mod error;
mod inspector;
mod probe;
mod report;
mod shape;

pub use error::{DecodeAttempt, InspectError, Result};
pub use inspector::Inspector;
pub use probe::{
    KeyPath, MISSING, OwnedOutcome, ProbeOutcome, ProbeResult, Segment, Tally, default_probes,
};
pub use report::{EncodingReport, Report, render_json, render_text};
pub use shape::{DEFAULT_WRAPPER, RootKind, Shape};

// Re-export for advanced usage
pub use encoding::{
    Detection, DetectionSource, candidate_encodings, decode_strict, detect_bom, detect_encoding,
    guess_utf16, is_utf8,
};
