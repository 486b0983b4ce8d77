//! `0x`-prefixed hex for byte payloads in JSON.

use serde::{de::Error, Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("0x{}", hex::encode(value)))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    let digits = encoded.strip_prefix("0x").unwrap_or(&encoded);
    hex::decode(digits).map_err(D::Error::custom)
}
