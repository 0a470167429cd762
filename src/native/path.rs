// ABOUTME: Native `path` module — filesystem path join/dirname helpers

use crate::error::{catalog, UmbraError};
use crate::value::Value;
use std::path::Path;

fn expect_str(args: &[Value], index: usize) -> Result<&str, UmbraError> {
    match args.get(index) {
        Some(Value::Str(s)) => Ok(s),
        _ => Err(UmbraError::runtime(
            "RT033",
            catalog::RT033_NATIVE_ARGUMENT_TYPE,
            &["path", "str", &index.to_string()],
            None,
        )),
    }
}

fn resolve(args: &[Value]) -> Result<Value, UmbraError> {
    let mut joined = std::path::PathBuf::new();
    for i in 0..args.len() {
        joined.push(expect_str(args, i)?);
    }
    Ok(Value::Str(joined.to_string_lossy().into_owned()))
}

fn dirname(args: &[Value]) -> Result<Value, UmbraError> {
    let path = expect_str(args, 0)?;
    let dir = Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string());
    Ok(Value::Str(dir))
}

pub const SYMBOLS: &[(&str, fn(&[Value]) -> Result<Value, UmbraError>)] =
    &[("resolve", resolve), ("dirname", dirname)];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_joins_segments() {
        let result = resolve(&[Value::Str("a".into()), Value::Str("b".into())]).unwrap();
        assert!(matches!(result, Value::Str(ref s) if s == "a/b"));
    }

    #[test]
    fn test_dirname() {
        let result = dirname(&[Value::Str("a/b/c.u".into())]).unwrap();
        assert!(matches!(result, Value::Str(ref s) if s == "a/b"));
    }
}
