mod boundaries;

use crate::{ParserOptions, Snapshot, StepOutcome, StreamingParser, Value};

/// Feeds the whole input in one call and finalizes.
pub(crate) fn parse_one(input: &str) -> Snapshot {
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.append(input);
    parser.finish()
}

/// Feeds the input chunk by chunk, draining between chunks, and finalizes.
pub(crate) fn parse_chunks<'a>(chunks: impl IntoIterator<Item = &'a str>) -> Snapshot {
    let mut parser = StreamingParser::new(ParserOptions::default());
    for chunk in chunks {
        parser.append(chunk);
        while parser.run() == StepOutcome::Pending {}
    }
    parser.finish()
}

/// Bridges a `serde_json` value into this crate's value type, so expected
/// values can be written with the `json!` macro.
pub(crate) fn from_serde(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap()),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(from_serde).collect()),
        serde_json::Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), from_serde(v)))
                .collect(),
        ),
    }
}

/// Structural equality that treats two NaN sentinels as equal, for comparing
/// parser output against parser output.
pub(crate) fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| value_eq(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .zip(ym)
                    .all(|((ka, va), (kb, vb))| ka == kb && value_eq(va, vb))
        }
        _ => a == b,
    }
}

pub(crate) fn snapshot_eq(a: &Snapshot, b: &Snapshot) -> bool {
    a.complete == b.complete
        && a.entities.len() == b.entities.len()
        && a.entities.iter().zip(&b.entities).all(|(x, y)| {
            x.finished == y.finished
                && x.id == y.id
                && match (&x.value, &y.value) {
                    (crate::EntityValue::Text(s), crate::EntityValue::Text(t)) => s == t,
                    (crate::EntityValue::Json(v), crate::EntityValue::Json(w)) => value_eq(v, w),
                    _ => false,
                }
        })
}
