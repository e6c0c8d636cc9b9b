//! Maps keyed by page number
//!
//! JSON object keys are strings. Inside `#[serde(untagged)]` and
//! `#[serde(flatten)]` the input is buffered first, and buffered string keys
//! are not coerced to integers, so the keys are parsed here instead.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

fn parse_keys<K, V, E>(raw: BTreeMap<String, V>) -> Result<BTreeMap<K, V>, E>
where
    K: FromStr + Ord,
    K::Err: Display,
    E: Error,
{
    raw.into_iter()
        .map(|(key, value)| {
            key.parse::<K>()
                .map(|k| (k, value))
                .map_err(|e| E::custom(format!("invalid page key '{}': {}", key, e)))
        })
        .collect()
}

pub(crate) fn deserialize<'de, D, K, V>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: FromStr + Ord,
    K::Err: Display,
    V: Deserialize<'de>,
{
    parse_keys(BTreeMap::<String, V>::deserialize(deserializer)?)
}

pub(crate) fn deserialize_option<'de, D, K, V>(
    deserializer: D,
) -> Result<Option<BTreeMap<K, V>>, D::Error>
where
    D: Deserializer<'de>,
    K: FromStr + Ord,
    K::Err: Display,
    V: Deserialize<'de>,
{
    Option::<BTreeMap<String, V>>::deserialize(deserializer)?
        .map(parse_keys)
        .transpose()
}
