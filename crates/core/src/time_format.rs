//! `HH:MM` serialisation for appointment times.
//!
//! Use with `#[serde(with = "crate::time_format")]`. Seconds are accepted on read and dropped
//! on write.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%H:%M";

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .ok()
}

pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&time.format(FORMAT))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid time '{s}', expected HH:MM")))
}
