//! Keyed-record access and membership filters.
//!
//! COCO lists are filtered by looking a single key up on each record and
//! testing it against a set of values. [`Record`] gives typed records and
//! raw JSON objects the same key lookup so the two filters below work on
//! either.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::model::{Annotation, Category, Image};
use crate::error::FlexCocoError;

/// A record whose fields can be looked up by JSON key.
pub trait Record {
    /// Returns the value stored under `key`, or `None` if the record has no
    /// such key.
    fn field(&self, key: &str) -> Option<Value>;
}

impl Record for Map<String, Value> {
    fn field(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl Record for Image {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(self.id.into()),
            "file_name" => Some(Value::from(self.file_name.as_str())),
            "height" => Some(Value::from(self.height)),
            "width" => Some(Value::from(self.width)),
            _ => self.extra.get(key).cloned(),
        }
    }
}

impl Record for Category {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(self.id.into()),
            "name" => Some(Value::from(self.name.as_str())),
            "supercategory" => self.supercategory.clone(),
            _ => self.extra.get(key).cloned(),
        }
    }
}

impl Record for Annotation {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(self.id.into()),
            "image_id" => Some(self.image_id.into()),
            "category_id" => Some(self.category_id.into()),
            "segmentation" => self.segmentation.clone(),
            "bbox" => self.bbox.clone(),
            "area" => self.area.clone(),
            "iscrowd" => self.iscrowd.clone(),
            _ => self.extra.get(key).cloned(),
        }
    }
}

/// Keeps the records whose `key` value is one of `values`.
///
/// Input order is preserved and the input is left untouched. Numbers match
/// by value (`1` matches `1.0`); every other value matches only an equal
/// JSON value of the same type.
///
/// # Errors
/// Returns [`FlexCocoError::KeyMissing`] if any record lacks `key`.
///
/// # Example
/// ```
/// use flexcoco::coco::{filter_by_inclusion, Category};
///
/// let categories = vec![Category::new(1u64, "cat"), Category::new(2u64, "dog")];
/// let kept = filter_by_inclusion(&categories, "name", ["dog"])?;
/// assert_eq!(kept, vec![Category::new(2u64, "dog")]);
/// # Ok::<(), flexcoco::FlexCocoError>(())
/// ```
pub fn filter_by_inclusion<R, I, V>(
    records: &[R],
    key: &str,
    values: I,
) -> Result<Vec<R>, FlexCocoError>
where
    R: Record + Clone,
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    filter_by_membership(records, key, values, true)
}

/// Keeps the records whose `key` value is not one of `values`.
///
/// Input order is preserved and the input is left untouched.
///
/// # Errors
/// Returns [`FlexCocoError::KeyMissing`] if any record lacks `key`.
pub fn filter_by_exclusion<R, I, V>(
    records: &[R],
    key: &str,
    values: I,
) -> Result<Vec<R>, FlexCocoError>
where
    R: Record + Clone,
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    filter_by_membership(records, key, values, false)
}

fn filter_by_membership<R, I, V>(
    records: &[R],
    key: &str,
    values: I,
    keep_members: bool,
) -> Result<Vec<R>, FlexCocoError>
where
    R: Record + Clone,
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let members: HashSet<String> = values
        .into_iter()
        .map(|value| membership_key(&value.into()))
        .collect();

    let mut kept = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let value = record.field(key).ok_or_else(|| FlexCocoError::KeyMissing {
            key: key.to_string(),
            index,
        })?;
        if members.contains(&membership_key(&value)) == keep_members {
            kept.push(record.clone());
        }
    }
    Ok(kept)
}

/// Hashable stand-in for `Value` equality. Integral numbers render as
/// integers whatever their JSON spelling.
fn membership_key(value: &Value) -> String {
    match value {
        Value::Number(number) if number.is_f64() => match number.as_f64() {
            Some(float) if float.fract() == 0.0 && float.abs() < 9.0e15 => {
                format!("{}", float as i64)
            }
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fruits() -> Vec<Map<String, Value>> {
        [
            json!({"name": "apple", "color": "red"}),
            json!({"name": "banana", "color": "yellow"}),
            json!({"name": "grape", "color": "purple"}),
        ]
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
    }

    #[test]
    fn inclusion_keeps_listed_values_in_order() {
        let origins = fruits();
        let result = filter_by_inclusion(&origins, "name", ["banana", "apple"]).unwrap();
        assert_eq!(result, origins[..2].to_vec());
    }

    #[test]
    fn exclusion_drops_listed_values() {
        let origins = fruits();
        let result = filter_by_exclusion(&origins, "name", ["apple", "banana"]).unwrap();
        assert_eq!(result, origins[2..].to_vec());
    }

    #[test]
    fn empty_inputs() {
        let empty: Vec<Map<String, Value>> = Vec::new();
        assert!(filter_by_inclusion(&empty, "name", ["apple"]).unwrap().is_empty());
        assert!(filter_by_exclusion(&empty, "name", ["apple"]).unwrap().is_empty());

        let origins = fruits();
        let none: [&str; 0] = [];
        assert!(filter_by_inclusion(&origins, "name", none).unwrap().is_empty());
        assert_eq!(filter_by_exclusion(&origins, "name", none).unwrap(), origins);
    }

    #[test]
    fn missing_key_is_an_error() {
        let origins = fruits();
        let err = filter_by_inclusion(&origins, "fruit", ["apple"]).unwrap_err();
        assert!(matches!(err, FlexCocoError::KeyMissing { ref key, index: 0 } if key == "fruit"));

        let err = filter_by_exclusion(&origins, "fruit", ["apple"]).unwrap_err();
        assert!(matches!(err, FlexCocoError::KeyMissing { .. }));
    }

    #[test]
    fn typed_records_expose_their_fields() {
        let images = vec![
            Image::new(1u64, "a.jpg", 10, 10),
            Image::new(2u64, "b.jpg", 10, 10).with_field("split", "val"),
        ];
        let by_id = filter_by_inclusion(&images, "id", [2u64]).unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].file_name, "b.jpg");

        // Only the second image carries "split".
        assert!(filter_by_inclusion(&images, "split", ["val"]).is_err());

        let anns = vec![Annotation::new(1u64, 1u64, 3u64), Annotation::new(2u64, 2u64, 4u64)];
        let kept = filter_by_exclusion(&anns, "category_id", [crate::coco::CategoryId(3)]).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.as_u64(), 2);
    }

    #[test]
    fn numbers_match_by_value() {
        let records: Vec<Map<String, Value>> = [
            json!({"n": 1}),
            json!({"n": 2.0}),
            json!({"n": 2.5}),
            json!({"n": "1"}),
        ]
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();

        let kept = filter_by_inclusion(&records, "n", [json!(1.0), json!(2)]).unwrap();
        assert_eq!(kept, records[..2].to_vec());

        let kept = filter_by_exclusion(&records, "n", [json!(2.5)]).unwrap();
        assert_eq!(kept.len(), 3);

        // Strings never match numbers.
        let kept = filter_by_inclusion(&records, "n", [json!("1")]).unwrap();
        assert_eq!(kept, records[3..].to_vec());
    }
}
