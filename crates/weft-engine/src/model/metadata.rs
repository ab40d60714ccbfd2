//! JSON metadata stored under one reserved dataset key.
//!
//! Schema checks are the caller's business: a validator predicate decides
//! whether a decoded payload is acceptable. Anything that fails to decode or
//! validate reads as "no metadata".

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ModelError;

/// Dataset key holding the serialized payload
pub const METADATA_KEY: &str = "editingInfo";

pub fn get_metadata<T: DeserializeOwned>(
    dataset: &BTreeMap<String, String>,
    validator: Option<&dyn Fn(&T) -> bool>,
) -> Option<T> {
    let raw = dataset.get(METADATA_KEY)?;
    let value: T = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("ignoring unparseable metadata: {err}");
            return None;
        }
    };
    if validator.is_some_and(|validate| !validate(&value)) {
        log::warn!("ignoring metadata that failed validation");
        return None;
    }
    Some(value)
}

/// Read, transform and write back the metadata payload.
///
/// The callback receives the current payload (or `None`) and returns the new
/// one; returning `None` removes the key. Returns what was stored.
pub fn update_metadata<T, F>(
    dataset: &mut BTreeMap<String, String>,
    callback: F,
    validator: Option<&dyn Fn(&T) -> bool>,
) -> Result<Option<T>, ModelError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(Option<T>) -> Option<T>,
{
    let current = get_metadata(dataset, validator);
    let updated = callback(current);
    match &updated {
        Some(value) => {
            dataset.insert(METADATA_KEY.to_string(), serde_json::to_string(value)?);
        }
        None => {
            dataset.remove(METADATA_KEY);
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TableInfo {
        border_color: String,
        columns: u32,
    }

    fn dataset(raw: &str) -> BTreeMap<String, String> {
        BTreeMap::from([(METADATA_KEY.to_string(), raw.to_string())])
    }

    #[test]
    fn reads_valid_payload() {
        let info: Option<TableInfo> =
            get_metadata(&dataset(r#"{"border_color":"red","columns":2}"#), None);
        assert_eq!(
            info,
            Some(TableInfo {
                border_color: "red".into(),
                columns: 2
            })
        );
    }

    #[test]
    fn unparseable_or_invalid_payload_is_absent() {
        let garbage: Option<TableInfo> = get_metadata(&dataset("{not json"), None);
        assert_eq!(garbage, None);

        let too_many_columns = |info: &TableInfo| info.columns < 10;
        let rejected: Option<TableInfo> = get_metadata(
            &dataset(r#"{"border_color":"red","columns":20}"#),
            Some(&too_many_columns),
        );
        assert_eq!(rejected, None);
    }

    #[test]
    fn update_writes_and_removes() {
        let mut data = BTreeMap::new();

        let stored = update_metadata(
            &mut data,
            |current: Option<TableInfo>| {
                assert!(current.is_none());
                Some(TableInfo {
                    border_color: "blue".into(),
                    columns: 3,
                })
            },
            None,
        )
        .unwrap();
        assert_eq!(stored.map(|info| info.columns), Some(3));
        assert!(data.contains_key(METADATA_KEY));

        update_metadata(&mut data, |_: Option<TableInfo>| None, None).unwrap();
        assert!(data.is_empty());
    }
}
