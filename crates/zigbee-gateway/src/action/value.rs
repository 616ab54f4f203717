// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Loose JSON value coercion shared by the action encoders.
//!
//! Requests arrive from MQTT / HTTP front ends, so numbers may be strings
//! and booleans may be spelled "on" / "off".

use serde_json::Value;

pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" => Some(true),
            "false" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Integer view, fractional input is rounded.
pub fn to_i64(value: &Value) -> Option<i64> {
    if let Some(v) = value.as_i64() {
        return Some(v);
    }
    to_f64(value).map(|v| v.round() as i64)
}

/// Integer constrained to `min..=max`. Out-of-range input is rejected,
/// not clamped.
pub fn to_ranged(value: &Value, min: i64, max: i64) -> Option<i64> {
    to_i64(value).filter(|v| (min..=max).contains(v))
}

/// Index of a label, or a numeric index below `labels.len()`.
pub fn enum_index(value: &Value, labels: &[&str]) -> Option<usize> {
    match value {
        Value::String(s) => labels.iter().position(|label| *label == s.as_str()),
        Value::Number(_) => to_i64(value)
            .filter(|v| *v >= 0 && (*v as usize) < labels.len())
            .map(|v| v as usize),
        _ => None,
    }
}

/// `[r, g, b]` with 0..=255 components.
pub fn to_rgb(value: &Value) -> Option<[u8; 3]> {
    let list = value.as_array()?;
    if list.len() != 3 {
        return None;
    }
    let mut out = [0u8; 3];
    for (slot, item) in out.iter_mut().zip(list) {
        *slot = to_ranged(item, 0, 255)? as u8;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_spellings() {
        assert_eq!(to_bool(&json!(true)), Some(true));
        assert_eq!(to_bool(&json!("off")), Some(false));
        assert_eq!(to_bool(&json!("ON")), Some(true));
        assert_eq!(to_bool(&json!(0)), Some(false));
        assert_eq!(to_bool(&json!("maybe")), None);
        assert_eq!(to_bool(&json!(null)), None);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(to_i64(&json!(12)), Some(12));
        assert_eq!(to_i64(&json!(12.6)), Some(13));
        assert_eq!(to_i64(&json!("-4")), Some(-4));
        assert_eq!(to_ranged(&json!(300), 0, 255), None);
        assert_eq!(to_f64(&json!("abc")), None);
    }

    #[test]
    fn test_enum_index() {
        let labels = ["off", "on", "previous"];
        assert_eq!(enum_index(&json!("previous"), &labels), Some(2));
        assert_eq!(enum_index(&json!(1), &labels), Some(1));
        assert_eq!(enum_index(&json!(3), &labels), None);
        assert_eq!(enum_index(&json!("toggle"), &labels), None);
    }

    #[test]
    fn test_rgb() {
        assert_eq!(to_rgb(&json!([255, 0, 10])), Some([255, 0, 10]));
        assert_eq!(to_rgb(&json!([255, 0])), None);
        assert_eq!(to_rgb(&json!([256, 0, 0])), None);
    }
}
