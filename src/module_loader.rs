// ABOUTME: Import resolution: native module dispatch and $UMBRA_PATH/lib/*.u loading

use crate::env::Environment;
use crate::error::{catalog, UmbraError};
use crate::eval::eval_module;
use crate::native;
use crate::parser::parse_source;
use std::rc::Rc;

/// Resolves an `import` path to a namespace environment. Paths prefixed
/// with `native/` dispatch to the built-in native module registry;
/// everything else is read from `$UMBRA_PATH/lib/<path>.u`.
pub fn load_module(path: &str) -> Result<Rc<Environment>, UmbraError> {
    if let Some(name) = path.strip_prefix("native/") {
        return native::load_native(name);
    }

    let source = resolve_source_module(path)?;
    let module = parse_source(&source)?;
    let namespace = Environment::new();
    eval_module(&module, &namespace).map_err(|outcome| match outcome {
        crate::error::EvalOutcome::Error(e) => e,
        crate::error::EvalOutcome::Control(_) => UmbraError::generic(
            "GN001",
            catalog::GN001_MODULE_NOT_FOUND,
            &[path],
        ),
    })?;
    Ok(namespace)
}

fn resolve_source_module(path: &str) -> Result<String, UmbraError> {
    let base = crate::config::umbra_path();
    let full_path = format!("{}/lib/{}.u", base, path);
    std::fs::read_to_string(&full_path).map_err(|e| {
        UmbraError::generic(
            "GN002",
            catalog::GN002_FILE_READ_FAILED,
            &[&full_path, &e.to_string()],
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    /// Importing the same source module twice must yield two distinct
    /// namespace environments whose public contents are nonetheless equal.
    #[test]
    #[serial]
    fn importing_same_module_twice_yields_distinct_equal_namespaces() {
        let dir = tempfile::tempdir().unwrap();
        let lib_dir = dir.path().join("lib");
        std::fs::create_dir_all(&lib_dir).unwrap();
        let mut file = std::fs::File::create(lib_dir.join("greet.u")).unwrap();
        write!(file, "const name str = \"world\"\npub name").unwrap();

        let previous = std::env::var("UMBRA_PATH").ok();
        std::env::set_var("UMBRA_PATH", dir.path());

        let first = load_module("greet").unwrap();
        let second = load_module("greet").unwrap();

        match previous {
            Some(v) => std::env::set_var("UMBRA_PATH", v),
            None => std::env::remove_var("UMBRA_PATH"),
        }

        assert!(!Rc::ptr_eq(&first, &second));
        let a = first.get("name", false).unwrap().get_value();
        let b = second.get("name", false).unwrap().get_value();
        assert!(a.structural_eq(&b));
    }
}
