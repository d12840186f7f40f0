//! Recovery of snapshots from a store file
//!
//! Store files are a plain concatenation of pretty-printed JSON objects, later
//! followed by `#` report lines. Objects are separated by tracking brace
//! balance line by line; a chunk that closes but does not parse is dropped, and
//! an unterminated tail (a crash mid-append) is dropped at the end of input.
//!
//! Braces are counted without regard to JSON string literals. An item name
//! containing `{` or `}` unbalances the count and loses the rest of the file.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::{SnapshotHistory, StockItem};

/// Scanner state between lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Empty,
    Accumulating { depth: i64, buffer: String },
}

/// Line-driven brace balance scanner
///
/// Feed trimmed lines in order; every time the running depth returns to zero
/// the accumulated buffer is handed back as a candidate object.
#[derive(Debug)]
pub struct BraceScanner {
    state: ScanState,
    /// Buffers discarded because the depth went negative
    discarded: usize,
}

impl Default for BraceScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BraceScanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::Empty,
            discarded: 0,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Feed one line, returning a candidate chunk when braces balance
    ///
    /// Blank lines are ignored. A line without braces while `Empty` is
    /// returned immediately as its own (non-JSON) candidate.
    pub fn feed_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let delta = brace_delta(line);
        let (depth, mut buffer) = match std::mem::replace(&mut self.state, ScanState::Empty) {
            ScanState::Empty => (delta, String::new()),
            ScanState::Accumulating { depth, buffer } => (depth + delta, buffer),
        };
        buffer.push_str(line);
        buffer.push('\n');

        match depth {
            0 => Some(buffer),
            d if d < 0 => {
                // A stray closing brace can never balance again
                debug!("Dropping chunk with unbalanced closing brace");
                self.discarded += 1;
                None
            }
            d => {
                self.state = ScanState::Accumulating { depth: d, buffer };
                None
            }
        }
    }

    /// Consume the scanner, returning any unterminated tail
    pub fn finish(self) -> Option<String> {
        match self.state {
            ScanState::Empty => None,
            ScanState::Accumulating { buffer, .. } => Some(buffer),
        }
    }
}

fn brace_delta(line: &str) -> i64 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

/// Result of scanning a whole store file
#[derive(Debug, Default)]
pub struct Recovery {
    pub history: SnapshotHistory,
    /// Objects parsed and merged
    pub recovered: usize,
    /// Balanced chunks that failed to parse, including report lines
    pub dropped: usize,
    /// Whether the file ended inside an unterminated object
    pub truncated_tail: bool,
}

/// Recover every well-formed snapshot object from raw store content
///
/// Objects are merged in file order; a timestamp seen again replaces the
/// earlier items.
pub fn recover(content: &str) -> Recovery {
    let mut recovery = Recovery::default();
    let mut scanner = BraceScanner::new();

    for line in content.lines() {
        if let Some(chunk) = scanner.feed_line(line) {
            match serde_json::from_str::<SnapshotObject>(chunk.trim()) {
                Ok(object) => {
                    recovery.recovered += 1;
                    for (timestamp, value) in object.0 {
                        match items_from_value(value) {
                            Some(items) => recovery.history.insert(timestamp, items),
                            None => debug!("Skipping snapshot {} with non-list items", timestamp),
                        }
                    }
                }
                Err(_) => recovery.dropped += 1,
            }
        }
    }

    recovery.dropped += scanner.discarded();
    if scanner.finish().is_some() {
        recovery.truncated_tail = true;
        recovery.dropped += 1;
    }

    recovery
}

/// Convert a stored item list, skipping entries that are not valid items
fn items_from_value(value: Value) -> Option<Vec<StockItem>> {
    let Value::Array(entries) = value else {
        return None;
    };

    let items = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<StockItem>(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!("Skipping stored item with invalid shape: {}", e);
                None
            }
        })
        .collect();
    Some(items)
}

/// A top-level JSON object with its keys kept in file order
struct SnapshotObject(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for SnapshotObject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ObjectVisitor;

        impl<'de> Visitor<'de> for ObjectVisitor {
            type Value = SnapshotObject;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object mapping timestamps to item lists")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    entries.push((key, value));
                }
                Ok(SnapshotObject(entries))
            }
        }

        deserializer.deserialize_map(ObjectVisitor)
    }
}
