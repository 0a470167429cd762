// ABOUTME: Native `os` module — unsandboxed file read/write/delete

use crate::error::{catalog, UmbraError};
use crate::value::Value;

fn expect_str(args: &[Value], index: usize) -> Result<&str, UmbraError> {
    match args.get(index) {
        Some(Value::Str(s)) => Ok(s),
        _ => Err(UmbraError::runtime(
            "RT033",
            catalog::RT033_NATIVE_ARGUMENT_TYPE,
            &["os", "str", &index.to_string()],
            None,
        )),
    }
}

fn read_file(args: &[Value]) -> Result<Value, UmbraError> {
    let path = expect_str(args, 0)?;
    std::fs::read_to_string(path)
        .map(Value::Str)
        .map_err(|e| {
            UmbraError::runtime(
                "RT032",
                catalog::RT032_NATIVE_IO_FAILED,
                &["read", path, &e.to_string()],
                None,
            )
        })
}

fn write_file(args: &[Value]) -> Result<Value, UmbraError> {
    let path = expect_str(args, 0)?;
    let data = expect_str(args, 1)?;
    std::fs::write(path, data).map(|_| Value::Null).map_err(|e| {
        UmbraError::runtime(
            "RT032",
            catalog::RT032_NATIVE_IO_FAILED,
            &["write", path, &e.to_string()],
            None,
        )
    })
}

fn delete_file(args: &[Value]) -> Result<Value, UmbraError> {
    let path = expect_str(args, 0)?;
    std::fs::remove_file(path).map(|_| Value::Null).map_err(|e| {
        UmbraError::runtime(
            "RT032",
            catalog::RT032_NATIVE_IO_FAILED,
            &["delete", path, &e.to_string()],
            None,
        )
    })
}

pub const SYMBOLS: &[(&str, fn(&[Value]) -> Result<Value, UmbraError>)] = &[
    ("readFile", read_file),
    ("writeFile", write_file),
    ("deleteFile", delete_file),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_delete_round_trip() {
        let path = std::env::temp_dir().join("umbra_native_os_test.txt");
        let path_str = path.to_str().unwrap().to_string();
        write_file(&[Value::Str(path_str.clone()), Value::Str("hello".into())]).unwrap();
        let read = read_file(&[Value::Str(path_str.clone())]).unwrap();
        assert!(matches!(read, Value::Str(ref s) if s == "hello"));
        delete_file(&[Value::Str(path_str)]).unwrap();
    }

    #[test]
    fn test_read_missing_file_is_native_io_error() {
        let err = read_file(&[Value::Str("/nonexistent/umbra/path.u".into())]).unwrap_err();
        assert_eq!(err.code(), "RT032");
    }
}
