//! Encoding detection and decoding using chardetng and `encoding_rs`.

use std::fmt;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use log::debug;
use simdutf8::basic::from_utf8;

/// Number of leading bytes examined by the BOM-less UTF-16 heuristic.
const UTF16_WINDOW: usize = 4096;

/// Check if the given bytes are valid UTF-8.
///
/// Uses SIMD-accelerated validation for performance.
pub fn is_utf8(data: &[u8]) -> bool {
    from_utf8(data).is_ok()
}

/// Look for a UTF-8, UTF-16LE or UTF-16BE byte order mark.
///
/// Returns the encoding the BOM announces and the BOM length in bytes.
pub fn detect_bom(data: &[u8]) -> Option<(&'static Encoding, usize)> {
    Encoding::for_bom(data)
}

/// Guess UTF-16 byte order for text without a BOM.
///
/// JSON is overwhelmingly ASCII, so UTF-16 text has a NUL in every other
/// byte: odd positions for little-endian, even positions for big-endian.
pub fn guess_utf16(data: &[u8]) -> Option<&'static Encoding> {
    let window = &data[..data.len().min(UTF16_WINDOW)];
    let pairs = window.len() / 2;
    if pairs == 0 {
        return None;
    }

    let (mut even_nuls, mut odd_nuls) = (0usize, 0usize);
    for pair in window.chunks_exact(2) {
        if pair[0] == 0 {
            even_nuls += 1;
        }
        if pair[1] == 0 {
            odd_nuls += 1;
        }
    }

    let dominant = |nuls: usize| nuls * 10 >= pairs * 4;
    let sparse = |nuls: usize| nuls * 10 < pairs;

    if dominant(odd_nuls) && sparse(even_nuls) {
        Some(UTF_16LE)
    } else if dominant(even_nuls) && sparse(odd_nuls) {
        Some(UTF_16BE)
    } else {
        None
    }
}

/// How the detected encoding was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    /// A byte order mark at the start of the data.
    Bom,
    /// The data validated as UTF-8.
    Utf8,
    /// NUL byte distribution matched BOM-less UTF-16.
    Utf16Heuristic,
    /// Statistical guess from chardetng.
    Statistical,
    /// Set explicitly by the caller.
    Forced,
}

impl fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DetectionSource::Bom => "byte order mark",
            DetectionSource::Utf8 => "valid UTF-8",
            DetectionSource::Utf16Heuristic => "UTF-16 byte pattern",
            DetectionSource::Statistical => "statistical guess",
            DetectionSource::Forced => "forced",
        };
        f.write_str(s)
    }
}

/// The encoding detected for a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// The detected encoding.
    pub encoding: &'static Encoding,
    /// How it was detected.
    pub source: DetectionSource,
    /// Whether the data starts with a byte order mark.
    pub has_bom: bool,
}

impl Detection {
    /// Create a new `Detection`.
    pub const fn new(encoding: &'static Encoding, source: DetectionSource, has_bom: bool) -> Self {
        Self {
            encoding,
            source,
            has_bom,
        }
    }
}

/// Detect the encoding of the data.
///
/// Checks, in order: a byte order mark, the BOM-less UTF-16 byte pattern,
/// UTF-8 validity, and finally a chardetng guess. The UTF-16 pattern goes
/// before UTF-8 because ASCII-range UTF-16 is also valid UTF-8.
pub fn detect_encoding(data: &[u8]) -> Detection {
    let detection = if let Some((encoding, _)) = detect_bom(data) {
        Detection::new(encoding, DetectionSource::Bom, true)
    } else if let Some(encoding) = guess_utf16(data) {
        Detection::new(encoding, DetectionSource::Utf16Heuristic, false)
    } else if is_utf8(data) {
        Detection::new(UTF_8, DetectionSource::Utf8, false)
    } else {
        let mut detector = EncodingDetector::new();
        detector.feed(data, true);
        let encoding = detector.guess(None, true);
        Detection::new(encoding, DetectionSource::Statistical, false)
    };

    debug!(
        "detected {} ({})",
        detection.encoding.name(),
        detection.source
    );
    detection
}

/// The fallback chain to try when decoding: detected, then UTF-16, then UTF-8.
///
/// BOM-less UTF-16 is read as little-endian. Duplicates are dropped while
/// keeping the first position.
pub fn candidate_encodings(detection: &Detection) -> Vec<&'static Encoding> {
    let mut candidates = Vec::with_capacity(3);
    for encoding in [detection.encoding, UTF_16LE, UTF_8] {
        if !candidates.contains(&encoding) {
            candidates.push(encoding);
        }
    }
    candidates
}

/// Decode `data` as `encoding`, refusing malformed input.
///
/// A BOM matching `encoding` is skipped, as is a leading U+FEFF left in the
/// decoded text. Returns `None` if the bytes are not valid in `encoding`.
pub fn decode_strict(data: &[u8], encoding: &'static Encoding) -> Option<String> {
    let body = match detect_bom(data) {
        Some((bom_encoding, len)) if bom_encoding == encoding => &data[len..],
        _ => data,
    };

    let text = encoding.decode_without_bom_handling_and_without_replacement(body)?;
    let text = match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    fn utf16be(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_be_bytes).collect()
    }

    #[test]
    fn test_is_utf8() {
        assert!(is_utf8(b"{\"a\": 1}"));
        assert!(is_utf8("{\"name\": \"こんにちは\"}".as_bytes()));
        assert!(is_utf8(b""));
        assert!(!is_utf8(&[0xFF, 0xFE]));
    }

    #[test]
    fn test_detect_bom() {
        let (enc, len) = detect_bom(&[0xEF, 0xBB, 0xBF, b'{']).unwrap();
        assert_eq!(enc, UTF_8);
        assert_eq!(len, 3);

        let (enc, len) = detect_bom(&[0xFF, 0xFE, b'{', 0]).unwrap();
        assert_eq!(enc, UTF_16LE);
        assert_eq!(len, 2);

        let (enc, _) = detect_bom(&[0xFE, 0xFF, 0, b'{']).unwrap();
        assert_eq!(enc, UTF_16BE);

        assert!(detect_bom(b"{}").is_none());
    }

    #[test]
    fn test_guess_utf16() {
        assert_eq!(guess_utf16(&utf16le("[{\"id\": 1}]")), Some(UTF_16LE));
        assert_eq!(guess_utf16(&utf16be("[{\"id\": 1}]")), Some(UTF_16BE));
        assert_eq!(guess_utf16(b"[{\"id\": 1}]"), None);
        assert_eq!(guess_utf16(b"x"), None);
    }

    #[test]
    fn test_detect_encoding_order() {
        let mut bom = vec![0xFF, 0xFE];
        bom.extend(utf16le("{}"));
        let d = detect_encoding(&bom);
        assert_eq!(d.encoding, UTF_16LE);
        assert_eq!(d.source, DetectionSource::Bom);
        assert!(d.has_bom);

        let d = detect_encoding(b"{\"a\": true}");
        assert_eq!(d.encoding, UTF_8);
        assert_eq!(d.source, DetectionSource::Utf8);

        let d = detect_encoding(&utf16le("{\"a\": true}"));
        assert_eq!(d.encoding, UTF_16LE);
        assert_eq!(d.source, DetectionSource::Utf16Heuristic);
    }

    #[test]
    fn test_detect_windows1252() {
        // {"name": "Café"} with é as a single Windows-1252 byte
        let data: &[u8] = b"{\"name\": \"Caf\xE9 cr\xE8me br\xFBl\xE9e\"}";
        let d = detect_encoding(data);
        assert_eq!(d.source, DetectionSource::Statistical);
        assert_ne!(d.encoding, UTF_8);
    }

    #[test]
    fn test_candidate_encodings() {
        let d = Detection::new(UTF_8, DetectionSource::Utf8, false);
        assert_eq!(candidate_encodings(&d), vec![UTF_8, UTF_16LE]);

        let d = Detection::new(UTF_16BE, DetectionSource::Bom, true);
        assert_eq!(candidate_encodings(&d), vec![UTF_16BE, UTF_16LE, UTF_8]);

        let d = Detection::new(UTF_16LE, DetectionSource::Utf16Heuristic, false);
        assert_eq!(candidate_encodings(&d), vec![UTF_16LE, UTF_8]);
    }

    #[test]
    fn test_decode_strict_strips_bom() {
        let mut data = vec![0xFF, 0xFE];
        data.extend(utf16le("[1]"));
        assert_eq!(decode_strict(&data, UTF_16LE).as_deref(), Some("[1]"));

        let data = [0xEF, 0xBB, 0xBF, b'[', b']'];
        assert_eq!(decode_strict(&data, UTF_8).as_deref(), Some("[]"));
    }

    #[test]
    fn test_decode_strict_rejects_malformed() {
        assert_eq!(decode_strict(&[0xC3, 0x28], UTF_8), None);
        // Lone high surrogate
        assert_eq!(decode_strict(&[0x00, 0xD8, b'a', 0x00], UTF_16LE), None);
    }
}
