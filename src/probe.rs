//! Key-path probes against the sample item, and value tallies across items.

use std::fmt;
use std::str::FromStr;

use foldhash::{HashMap, HashMapExt};
use serde_json::Value;

use crate::error::{InspectError, Result};
use crate::shape::RootKind;

/// Label used in tallies for items where the path did not resolve.
pub const MISSING: &str = "<missing>";

/// One step of a key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object member.
    Key(String),
    /// Array element. Also tried as a key when the value is an object.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => f.write_str(k),
            Segment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A dotted path into a JSON value, e.g. `properties.Platform.select.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Parse a dotted path. Purely numeric segments index arrays.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(InspectError::InvalidConfig("empty key path".to_string()));
        }

        let segments = path
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(InspectError::InvalidConfig(format!(
                        "empty segment in key path {path:?}"
                    )))
                } else if let Ok(i) = seg.parse::<usize>() {
                    Ok(Segment::Index(i))
                } else {
                    Ok(Segment::Key(seg.to_string()))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { segments })
    }

    /// The path's segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Walk the path from `root`.
    pub fn resolve<'a>(&self, root: &'a Value) -> ProbeOutcome<'a> {
        let mut current = root;
        for (depth, segment) in self.segments.iter().enumerate() {
            let next = match (current, segment) {
                (Value::Object(map), Segment::Key(k)) => map.get(k),
                (Value::Object(map), Segment::Index(i)) => map.get(&i.to_string()),
                (Value::Array(items), Segment::Index(i)) => items.get(*i),
                (Value::Array(_), Segment::Key(_)) => {
                    return ProbeOutcome::NotContainer {
                        depth,
                        found: RootKind::Array,
                    };
                }
                (scalar, _) => {
                    return ProbeOutcome::NotContainer {
                        depth,
                        found: RootKind::of(scalar),
                    };
                }
            };

            match next {
                Some(value) => current = value,
                None => return ProbeOutcome::Missing { depth },
            }
        }
        ProbeOutcome::Found(current)
    }
}

impl FromStr for KeyPath {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Result of resolving a key path.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome<'a> {
    /// The path resolved to a value.
    Found(&'a Value),
    /// The segment at `depth` was absent (no such key, or index out of range).
    Missing { depth: usize },
    /// The segment at `depth` tried to descend into a value that cannot hold it.
    NotContainer { depth: usize, found: RootKind },
}

impl ProbeOutcome<'_> {
    /// The resolved value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            ProbeOutcome::Found(v) => Some(*v),
            _ => None,
        }
    }
}

/// Candidate locations of the platform field in workflow exports
/// (flat items, and Notion-style `properties.<Name>.select.name`).
pub fn default_probes() -> Vec<KeyPath> {
    [
        "platform",
        "Platform",
        "properties.Platform",
        "properties.Platform.select.name",
    ]
    .iter()
    .map(|p| KeyPath {
        segments: p.split('.').map(|k| Segment::Key(k.to_string())).collect(),
    })
    .collect()
}

/// A probe path and the rendered outcome of resolving it against the sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub path: KeyPath,
    pub outcome: OwnedOutcome,
}

/// Owned form of [`ProbeOutcome`], for storing in a report.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedOutcome {
    Found(Value),
    Missing { at: String },
    NotContainer { at: String, found: RootKind },
}

impl ProbeResult {
    /// Resolve `path` against `sample`.
    pub fn run(path: &KeyPath, sample: &Value) -> Self {
        let at = |depth: usize| path.segments[depth].to_string();
        let outcome = match path.resolve(sample) {
            ProbeOutcome::Found(v) => OwnedOutcome::Found(v.clone()),
            ProbeOutcome::Missing { depth } => OwnedOutcome::Missing { at: at(depth) },
            ProbeOutcome::NotContainer { depth, found } => OwnedOutcome::NotContainer {
                at: at(depth),
                found,
            },
        };
        Self {
            path: path.clone(),
            outcome,
        }
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            OwnedOutcome::Found(v) => write!(f, "{}: {}", self.path, v),
            OwnedOutcome::Missing { at } => write!(f, "{}: None (no {at:?})", self.path),
            OwnedOutcome::NotContainer { at, found } => {
                write!(f, "{}: Error cannot look up {at:?} in a {found}", self.path)
            }
        }
    }
}

/// Counts of the distinct values found at one path across all items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub path: KeyPath,
    /// `(value, count)` ordered by descending count, then value.
    pub counts: Vec<(String, usize)>,
}

impl Tally {
    /// Tally the values at `path` across `items`.
    ///
    /// Strings are counted by their text, other values by their JSON form.
    pub fn count(path: &KeyPath, items: &[Value]) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::with_capacity(items.len());
        for item in items {
            let label = match path.resolve(item) {
                ProbeOutcome::Found(Value::String(s)) => s.clone(),
                ProbeOutcome::Found(Value::Null) | ProbeOutcome::Missing { .. } => {
                    MISSING.to_string()
                }
                ProbeOutcome::Found(v) => v.to_string(),
                ProbeOutcome::NotContainer { .. } => MISSING.to_string(),
            };
            *counts.entry(label).or_default() += 1;
        }

        let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            path: path.clone(),
            counts,
        }
    }

    /// Total number of items counted.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notion_item(platform: Option<&str>) -> Value {
        let select = match platform {
            Some(name) => json!({"name": name, "color": "blue"}),
            None => Value::Null,
        };
        json!({
            "id": "abc",
            "properties": {
                "Name": {"title": [{"plain_text": "Launch post"}]},
                "Platform": {"type": "select", "select": select}
            }
        })
    }

    #[test]
    fn test_parse_path() {
        let path = KeyPath::parse("Name.title.0.plain_text").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("Name".to_string()),
                Segment::Key("title".to_string()),
                Segment::Index(0),
                Segment::Key("plain_text".to_string()),
            ]
        );
        assert_eq!(path.to_string(), "Name.title.0.plain_text");
    }

    #[test]
    fn test_parse_invalid_path() {
        assert!(KeyPath::parse("").is_err());
        assert!(KeyPath::parse("a..b").is_err());
        assert!("properties.".parse::<KeyPath>().is_err());
    }

    #[test]
    fn test_resolve_found() {
        let item = notion_item(Some("LinkedIn"));
        let path = KeyPath::parse("properties.Platform.select.name").unwrap();
        assert_eq!(path.resolve(&item).value(), Some(&json!("LinkedIn")));

        let path = KeyPath::parse("properties.Name.title.0.plain_text").unwrap();
        assert_eq!(path.resolve(&item).value(), Some(&json!("Launch post")));
    }

    #[test]
    fn test_resolve_missing() {
        let item = notion_item(Some("X"));
        let path = KeyPath::parse("platform").unwrap();
        assert_eq!(path.resolve(&item), ProbeOutcome::Missing { depth: 0 });

        let path = KeyPath::parse("properties.Name.title.5").unwrap();
        assert_eq!(path.resolve(&item), ProbeOutcome::Missing { depth: 3 });
    }

    #[test]
    fn test_resolve_through_scalar() {
        let item = notion_item(None);
        let path = KeyPath::parse("properties.Platform.select.name").unwrap();
        assert_eq!(
            path.resolve(&item),
            ProbeOutcome::NotContainer {
                depth: 3,
                found: RootKind::Null
            }
        );

        let path = KeyPath::parse("properties.Name.title.plain_text").unwrap();
        assert_eq!(
            path.resolve(&item),
            ProbeOutcome::NotContainer {
                depth: 3,
                found: RootKind::Array
            }
        );
    }

    #[test]
    fn test_numeric_key_on_object() {
        let value = json!({"2024": {"count": 3}});
        let path = KeyPath::parse("2024.count").unwrap();
        assert_eq!(path.resolve(&value).value(), Some(&json!(3)));
    }

    #[test]
    fn test_default_probes() {
        let probes = default_probes();
        assert_eq!(probes.len(), 4);
        assert_eq!(probes[3].to_string(), "properties.Platform.select.name");
    }

    #[test]
    fn test_probe_result_display() {
        let item = notion_item(None);
        let rendered: Vec<String> = default_probes()
            .iter()
            .map(|p| ProbeResult::run(p, &item).to_string())
            .collect();

        assert_eq!(rendered[0], "platform: None (no \"platform\")");
        assert!(rendered[2].starts_with("properties.Platform: {"));
        assert_eq!(
            rendered[3],
            "properties.Platform.select.name: Error cannot look up \"name\" in a null"
        );
    }

    #[test]
    fn test_tally() {
        let items = vec![
            notion_item(Some("LinkedIn")),
            notion_item(Some("X")),
            notion_item(Some("LinkedIn")),
            notion_item(None),
            json!("not an item"),
        ];
        let path = KeyPath::parse("properties.Platform.select.name").unwrap();
        let tally = Tally::count(&path, &items);

        assert_eq!(tally.total(), 5);
        assert_eq!(
            tally.counts,
            vec![
                (MISSING.to_string(), 2),
                ("LinkedIn".to_string(), 2),
                ("X".to_string(), 1),
            ]
        );
    }
}
