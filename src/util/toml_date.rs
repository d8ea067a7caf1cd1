use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, ParseError};
use serde::Deserialize;

/// Calendar date read from TOML.
///
/// Accepts both a native TOML local date (`date = 2025-01-15`) and a quoted
/// string (`date = "2025-01-15"`).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TomlDate(pub NaiveDate);

impl<'de> Deserialize<'de> for TomlDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let value = match toml::Value::deserialize(deserializer)? {
            toml::Value::Datetime(dt) => dt.to_string(),
            toml::Value::String(s) => s,
            other => return Err(Error::custom(format!("expected a date, found {}", other.type_str()))),
        };
        TomlDate::from_str(value.trim()).map_err(Error::custom)
    }
}

impl FromStr for TomlDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let naive = NaiveDate::from_str(s)?;
        Ok(Self(naive))
    }
}

impl From<NaiveDate> for TomlDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl fmt::Display for TomlDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
