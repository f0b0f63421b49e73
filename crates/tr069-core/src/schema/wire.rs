// ── Wire encoding helpers ──
//
// Serde adapters for the TR-069 text encodings (comma-separated lists,
// empty-string-as-unset scalars) and the flat parameter-map form used by
// GetParameterValues-style listings.

use indexmap::IndexMap;

use super::validate::{Origin, stage};
use super::ManagedEntity;
use crate::error::SetFault;

/// List parameters travel as one comma-separated text value.
pub mod csv_list {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::schema::value::split_list;

    pub fn serialize<S: Serializer>(items: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&items.join(","))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(split_list(&text))
    }
}

/// Optional scalars (addresses) travel as text, with the empty string for unset.
pub mod optional_text {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[allow(clippy::ref_option)]
    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        if text.is_empty() {
            return Ok(None);
        }
        text.parse().map(Some).map_err(D::Error::custom)
    }
}

/// Flatten an entity into wire name → text, in descriptor order. Secret
/// parameters read back empty.
pub fn to_parameter_map<E: ManagedEntity>(entity: &E) -> IndexMap<&'static str, String> {
    E::descriptors()
        .iter()
        .filter_map(|d| d.read(entity).map(|value| (d.name, value.to_string())))
        .collect()
}

/// Rebuild an entity from wire name → text pairs, starting from defaults.
///
/// Values are checked against their descriptors; access mode is not, since
/// this reconstructs device state rather than applying a controller write.
pub fn from_parameter_map<E, K, V>(map: &IndexMap<K, V>) -> Result<E, SetFault>
where
    E: ManagedEntity,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let updates: Vec<(&str, &str)> = map.iter().map(|(k, v)| (k.as_ref(), v.as_ref())).collect();
    stage(&E::default(), &updates, Origin::Device)
}
