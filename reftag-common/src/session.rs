//! Session-scoped state read once at the start of a visit
//!
//! The host keeps a textual event counter in session storage and the last
//! recorded identifier in the data layer. Neither is written here; the
//! session bookkeeping collaborator owns updates.

/// Snapshot of session state for one page load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Parsed event counter; `None` when the stored text has no leading digits
    pub event_count: Option<i64>,
    /// Identifier already present in the data layer state
    pub recorded_identifier: Option<String>,
}

impl SessionState {
    /// Build from the raw session-storage counter and data-layer identifier
    pub fn from_raw(counter: Option<&str>, recorded_identifier: Option<String>) -> Self {
        Self {
            event_count: parse_event_count(counter),
            recorded_identifier,
        }
    }

    /// True only when the counter reads exactly zero
    ///
    /// An unparsable counter is treated as "not first view", so attribution
    /// is skipped rather than risking a second emission.
    pub fn is_first_view(&self) -> bool {
        self.event_count == Some(0)
    }

    pub fn has_recorded_identifier(&self) -> bool {
        self.recorded_identifier.is_some()
    }
}

/// Parse the stored event counter leniently
///
/// Missing or empty text counts as zero. Otherwise leading whitespace and an
/// optional sign are skipped and the leading run of ASCII digits is read;
/// trailing garbage is ignored (`"3 events"` reads as 3). A `0x`/`0X` prefix
/// switches to hexadecimal, so `"0x10"` reads as 16. No digits at all
/// yields `None`. Counts too large for `i64` saturate.
pub fn parse_event_count(raw: Option<&str>) -> Option<i64> {
    let raw = match raw {
        None => return Some(0),
        Some(text) if text.is_empty() => return Some(0),
        Some(text) => text.trim_start(),
    };

    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let (radix, rest) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_digit(radix))
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let magnitude = i64::from_str_radix(digits, radix).unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
