// ABOUTME: Native module registry — dispatch table for `import "native/*"` paths

mod hashmap;
mod os;
mod path;

use crate::env::Environment;
use crate::error::{catalog, UmbraError};
use crate::value::{NativeFunction, Value};
use std::rc::Rc;

/// Loads a native module by name into a fresh namespace environment, with
/// every symbol created public (native bindings have no private stage).
pub fn load_native(name: &str) -> Result<Rc<Environment>, UmbraError> {
    let symbols: &[(&str, fn(&[Value]) -> Result<Value, UmbraError>)] = match name {
        "os" => os::SYMBOLS,
        "path" => path::SYMBOLS,
        "hashmaps" => hashmap::SYMBOLS,
        _ => {
            return Err(UmbraError::generic(
                "GN001",
                catalog::GN001_MODULE_NOT_FOUND,
                &[name],
            ))
        }
    };

    let namespace = Environment::new();
    for (symbol_name, func) in symbols {
        let native = Value::Native(Rc::new(NativeFunction {
            name: symbol_name.to_string(),
            func: *func,
        }));
        namespace.create(symbol_name, native, crate::types::TypeTag::Fun, false, true, false)?;
        namespace.make_public(symbol_name)?;
    }
    Ok(namespace)
}
