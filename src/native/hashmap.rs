// ABOUTME: Native `hashmaps` module — key deletion

use crate::error::{catalog, UmbraError};
use crate::value::{HashKey, Value};

/// Returns a copy of the hashmap with `key` removed. Because `Value::Hashmap`
/// is an owned container rather than a reference type, callers must rebind
/// the result (`h = native.delete(h, "k")`) for the deletion to be visible.
fn delete(args: &[Value]) -> Result<Value, UmbraError> {
    let map = match args.first() {
        Some(Value::Hashmap(m)) => m.clone(),
        _ => {
            return Err(UmbraError::runtime(
                "RT033",
                catalog::RT033_NATIVE_ARGUMENT_TYPE,
                &["hashmaps", "hashmap", "0"],
                None,
            ))
        }
    };
    let key_val = match args.get(1) {
        Some(v) => v,
        None => {
            return Err(UmbraError::runtime(
                "RT033",
                catalog::RT033_NATIVE_ARGUMENT_TYPE,
                &["hashmaps", "key", "1"],
                None,
            ))
        }
    };
    let key = HashKey::from_value(key_val).ok_or_else(|| {
        UmbraError::runtime(
            "RT033",
            catalog::RT033_NATIVE_ARGUMENT_TYPE,
            &["hashmaps", "key", "1"],
            None,
        )
    })?;
    let mut map = map;
    map.remove(&key);
    Ok(Value::Hashmap(map))
}

pub const SYMBOLS: &[(&str, fn(&[Value]) -> Result<Value, UmbraError>)] = &[("delete", delete)];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_delete_removes_key() {
        let mut map = HashMap::new();
        map.insert(HashKey::Str("a".into()), Value::Number(1.0));
        map.insert(HashKey::Str("b".into()), Value::Number(2.0));
        let result = delete(&[Value::Hashmap(map), Value::Str("a".into())]).unwrap();
        match result {
            Value::Hashmap(m) => {
                assert!(!m.contains_key(&HashKey::Str("a".into())));
                assert!(m.contains_key(&HashKey::Str("b".into())));
            }
            _ => panic!("expected hashmap"),
        }
    }
}
