// Record ids and ISO 8601 timestamps

use chrono::{DateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
use uuid::Uuid;

const FRAGMENT_LEN: usize = 11;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a short alphanumeric record id.
///
/// The id is two independently generated base-36 fragments joined together.
/// Uniqueness is probabilistic, which is fine for a single-user local store.
pub fn generate_id() -> String {
    let mut id = random_fragment();
    id.push_str(&random_fragment());
    id
}

fn random_fragment() -> String {
    let mut n = Uuid::new_v4().as_u128();
    let mut fragment = String::with_capacity(FRAGMENT_LEN);
    for _ in 0..FRAGMENT_LEN {
        fragment.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    fragment
}

/// Current time, truncated to millisecond precision so that it survives a
/// round trip through its string form unchanged.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Timestamp for a mutation of a record last touched at `previous`.
///
/// Always strictly later than `previous`, even when the clock has not
/// advanced a full millisecond since then.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::milliseconds(1)
    }
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp written by [`format_timestamp`].
///
/// Only the canonical `YYYY-MM-DDTHH:MM:SS.sssZ` form is accepted, so a
/// decoded value always re-encodes to the exact same string.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let ts = DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp {:?}: {}", raw, e))?;

    if format_timestamp(&ts) != raw {
        return Err(format!(
            "timestamp {:?} is not in YYYY-MM-DDTHH:MM:SS.sssZ form",
            raw
        ));
    }
    Ok(ts)
}

/// Serde adapter carrying timestamps as ISO 8601 strings with millisecond
/// precision.
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(de::Error::custom)
    }
}
