//! Helpers for the opaque data values flowing through a chain.

use serde_json::{json, Value};

/// Merge a pre-stage result into a node's outgoing data.
///
/// If the data already carries an `additionalData` list the result is
/// appended to it; otherwise the original value is moved under `origin`
/// and a fresh single-element `additionalData` list is created. This
/// ordering is what downstream services rely on.
pub fn merge_pre_data(data: Value, pre_data: Value) -> Value {
  match data {
    Value::Object(mut map) if map.contains_key("additionalData") => {
      match map.get_mut("additionalData") {
        Some(Value::Array(list)) => list.push(pre_data),
        Some(other) => *other = Value::Array(vec![pre_data]),
        None => unreachable!("checked by contains_key"),
      }
      Value::Object(map)
    }
    original => json!({
      "origin": original,
      "additionalData": [pre_data],
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_merge_moves_original_under_origin() {
    let merged = merge_pre_data(json!({"x": 1}), json!({"y": 2}));
    assert_eq!(
      merged,
      json!({"origin": {"x": 1}, "additionalData": [{"y": 2}]})
    );
  }

  #[test]
  fn subsequent_merges_append() {
    let first = merge_pre_data(json!({"x": 1}), json!({"y": 2}));
    let second = merge_pre_data(first, json!({"z": 3}));
    assert_eq!(
      second,
      json!({"origin": {"x": 1}, "additionalData": [{"y": 2}, {"z": 3}]})
    );
  }

  #[test]
  fn non_object_data_is_preserved_as_origin() {
    let merged = merge_pre_data(json!([1, 2]), json!("pre"));
    assert_eq!(merged, json!({"origin": [1, 2], "additionalData": ["pre"]}));
  }
}
