//! Main Inspector builder and inspect methods.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::Encoding;
use log::{debug, warn};
use serde_json::Value;

use crate::encoding::{
    Detection, DetectionSource, candidate_encodings, decode_strict, detect_bom, detect_encoding,
};
use crate::error::{DecodeAttempt, InspectError, Result};
use crate::probe::{KeyPath, ProbeResult, Tally, default_probes};
use crate::report::{EncodingReport, Report};
use crate::shape::{DEFAULT_WRAPPER, Shape};

/// JSON payload inspector.
///
/// # Example
///
/// ```no_run
/// use json_nose::Inspector;
///
/// let inspector = Inspector::new();
/// let report = inspector.inspect_path("n8n_response.json").unwrap();
/// println!("Root: {}", report.shape.root);
/// println!("Encoding: {}", report.encoding.name);
/// ```
#[derive(Debug, Clone)]
pub struct Inspector {
    /// Encoding to use instead of detection.
    forced_encoding: Option<&'static Encoding>,
    /// Object keys whose array value holds the items.
    wrapper_keys: Vec<String>,
    /// Key paths probed against the sample item.
    probes: Vec<KeyPath>,
    /// Key paths tallied across all items.
    tallies: Vec<KeyPath>,
    /// Largest input accepted, in bytes.
    max_bytes: Option<usize>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    /// Create a new Inspector with default settings.
    pub fn new() -> Self {
        Self {
            forced_encoding: None,
            wrapper_keys: vec![DEFAULT_WRAPPER.to_string()],
            probes: default_probes(),
            tallies: Vec::new(),
            max_bytes: None,
        }
    }

    /// Force a specific encoding (skip detection and fallback).
    pub fn encoding(&mut self, encoding: &'static Encoding) -> &mut Self {
        self.forced_encoding = Some(encoding);
        self
    }

    /// Force an encoding by WHATWG label, e.g. `utf-16le` or `latin1`.
    pub fn encoding_label(&mut self, label: &str) -> Result<&mut Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| InspectError::UnknownEncoding(label.to_string()))?;
        Ok(self.encoding(encoding))
    }

    /// Set the wrapper keys checked on object roots, in priority order.
    pub fn wrapper_keys(&mut self, keys: Vec<String>) -> &mut Self {
        self.wrapper_keys = keys;
        self
    }

    /// Replace the key paths probed against the sample item.
    pub fn probes(&mut self, probes: Vec<KeyPath>) -> &mut Self {
        self.probes = probes;
        self
    }

    /// Add a key path to tally across all items.
    pub fn tally(&mut self, path: KeyPath) -> &mut Self {
        self.tallies.push(path);
        self
    }

    /// Refuse inputs larger than `max_bytes`.
    pub fn max_bytes(&mut self, max_bytes: Option<usize>) -> &mut Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Inspect a JSON file at the given path.
    pub fn inspect_path<P: AsRef<Path>>(&self, path: P) -> Result<Report> {
        let file = File::open(path.as_ref())?;
        if let Some(limit) = self.max_bytes {
            let size = file.metadata()?.len();
            if size > limit as u64 {
                return Err(InspectError::TooLarge { size, limit });
            }
        }
        self.inspect_reader(std::io::BufReader::new(file))
    }

    /// Inspect JSON data from a reader.
    pub fn inspect_reader<R: Read>(&self, reader: R) -> Result<Report> {
        let mut data = Vec::new();
        match self.max_bytes {
            Some(limit) => {
                // One byte past the limit is enough to tell it was exceeded.
                reader
                    .take((limit as u64).saturating_add(1))
                    .read_to_end(&mut data)?;
                if data.len() > limit {
                    return Err(InspectError::TooLarge {
                        size: data.len() as u64,
                        limit,
                    });
                }
            }
            None => {
                let mut reader = reader;
                reader.read_to_end(&mut data)?;
            }
        }
        self.inspect_bytes(&data)
    }

    /// Inspect JSON data from bytes.
    pub fn inspect_bytes(&self, data: &[u8]) -> Result<Report> {
        if data.is_empty() {
            return Err(InspectError::EmptyData);
        }

        let detection = match self.forced_encoding {
            Some(encoding) => Detection::new(
                encoding,
                DetectionSource::Forced,
                detect_bom(data).is_some(),
            ),
            None => detect_encoding(data),
        };

        let (value, encoding, attempts) = self.decode(data, &detection)?;
        let shape = Shape::of(&value, self.wrapper_keys.as_slice());

        let probes = match &shape.sample {
            Some(sample) => self
                .probes
                .iter()
                .map(|path| ProbeResult::run(path, sample))
                .collect(),
            None => Vec::new(),
        };

        let tallies = self
            .tallies
            .iter()
            .map(|path| Tally::count(path, &shape.items))
            .collect();

        Ok(Report {
            encoding: EncodingReport {
                name: encoding.name(),
                source: detection.source,
                detected: detection.encoding.name(),
                has_bom: detection.has_bom,
            },
            attempts,
            shape,
            probes,
            tallies,
        })
    }

    /// Walk the candidate encodings until one decodes and parses.
    fn decode(
        &self,
        data: &[u8],
        detection: &Detection,
    ) -> Result<(Value, &'static Encoding, Vec<DecodeAttempt>)> {
        let candidates = if self.forced_encoding.is_some() {
            vec![detection.encoding]
        } else {
            candidate_encodings(detection)
        };

        let mut attempts = Vec::new();
        for encoding in candidates {
            let reason = match decode_strict(data, encoding) {
                None => "malformed byte sequence".to_string(),
                Some(text) => match serde_json::from_str::<Value>(&text) {
                    Ok(value) => {
                        debug!("parsed JSON as {}", encoding.name());
                        return Ok((value, encoding, attempts));
                    }
                    Err(e) => e.to_string(),
                },
            };

            warn!("decoding as {} failed: {reason}", encoding.name());
            attempts.push(DecodeAttempt {
                encoding: encoding.name(),
                reason,
            });
        }

        Err(InspectError::Undecodable(attempts))
    }
}
