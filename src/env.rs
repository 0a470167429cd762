// ABOUTME: Lexically scoped environment: bindings, visibility, and namespaces

use crate::error::{catalog, UmbraError};
use crate::types::TypeTag;
use crate::value::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// A single named slot: value plus the declared-type/visibility/mutability
/// metadata from spec section 3's Binding model.
#[derive(Debug)]
pub struct Binding {
    value: RefCell<Value>,
    pub declared_type: TypeTag,
    pub nullable: bool,
    pub mutable: bool,
    pub native: bool,
    private: Cell<bool>,
}

impl Binding {
    pub fn get_value(&self) -> Value {
        self.value.borrow().clone()
    }

    pub fn is_private(&self) -> bool {
        self.private.get()
    }
}

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Rc<Binding>>>,
    namespaces: RefCell<HashMap<String, Rc<Environment>>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            namespaces: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            namespaces: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    fn exists_in_chain(&self, name: &str) -> bool {
        if self.bindings.borrow().contains_key(name) {
            return true;
        }
        match &self.parent {
            Some(p) => p.exists_in_chain(name),
            None => false,
        }
    }

    /// Creates a binding in this frame. Fails if the name is already bound
    /// anywhere in the visible ancestor chain, even privately (spec 4.4).
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &self,
        name: &str,
        value: Value,
        declared_type: TypeTag,
        nullable: bool,
        native: bool,
        mutable: bool,
    ) -> Result<(), UmbraError> {
        if self.exists_in_chain(name) {
            return Err(UmbraError::runtime(
                "RT003",
                catalog::RT003_DUPLICATE_DECLARATION,
                &[name],
                None,
            ));
        }
        let binding = Binding {
            value: RefCell::new(value),
            declared_type,
            nullable,
            mutable,
            native,
            private: Cell::new(!native),
        };
        self.bindings
            .borrow_mut()
            .insert(name.to_string(), Rc::new(binding));
        Ok(())
    }

    /// Walks the parent chain looking up `name`. `allow_private` lets
    /// intra-frame callers (ordinary variable lookups) see private bindings;
    /// namespace-member access passes `false`.
    pub fn get(self: &Rc<Self>, name: &str, allow_private: bool) -> Option<Rc<Binding>> {
        if let Some(b) = self.bindings.borrow().get(name) {
            if allow_private || !b.is_private() {
                return Some(b.clone());
            }
            return None;
        }
        self.parent.as_ref().and_then(|p| p.get(name, allow_private))
    }

    /// Assigns a new value to an existing, mutable binding, walking the
    /// parent chain. Type-checks the new value against the declared type.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), UmbraError> {
        if let Some(b) = self.bindings.borrow().get(name) {
            if !b.mutable {
                return Err(UmbraError::runtime(
                    "RT040",
                    catalog::RT040_IMMUTABLE_ASSIGNMENT,
                    &[name],
                    None,
                ));
            }
            if !crate::types::type_check(b.declared_type, value.type_tag(), b.nullable) {
                return Err(UmbraError::ty(
                    "TY001",
                    catalog::TY001_DECLARED_TYPE_MISMATCH,
                    &[value.truthy_name(), &b.declared_type.to_string()],
                    None,
                ));
            }
            *b.value.borrow_mut() = value;
            return Ok(());
        }
        match &self.parent {
            Some(p) => p.assign(name, value),
            None => Err(UmbraError::runtime(
                "RT002",
                catalog::RT002_UNDEFINED_VARIABLE,
                &[name],
                None,
            )),
        }
    }

    /// Toggles a locally owned binding from private to public. `RT025` if
    /// the name isn't bound in this exact frame.
    pub fn make_public(&self, name: &str) -> Result<(), UmbraError> {
        match self.bindings.borrow().get(name) {
            Some(b) => {
                b.private.set(false);
                Ok(())
            }
            None => Err(UmbraError::runtime(
                "RT025",
                catalog::RT025_PUBLIC_UNKNOWN_NAME,
                &[name],
                None,
            )),
        }
    }

    pub fn get_namespace(self: &Rc<Self>, name: &str) -> Option<Rc<Environment>> {
        if let Some(ns) = self.namespaces.borrow().get(name) {
            return Some(ns.clone());
        }
        self.parent.as_ref().and_then(|p| p.get_namespace(name))
    }

    pub fn create_namespace(&self, name: &str, env: Rc<Environment>) -> Result<(), UmbraError> {
        if self.namespaces.borrow().contains_key(name) {
            return Err(UmbraError::runtime(
                "RT003",
                catalog::RT003_DUPLICATE_DECLARATION,
                &[name],
                None,
            ));
        }
        self.namespaces.borrow_mut().insert(name.to_string(), env);
        Ok(())
    }

    pub fn list_values(&self, include_private: bool) -> HashMap<String, Value> {
        self.bindings
            .borrow()
            .iter()
            .filter(|(_, b)| include_private || !b.is_private())
            .map(|(k, b)| (k.clone(), b.get_value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let env = Environment::new();
        env.create("x", Value::Number(42.0), TypeTag::Num, false, false, true)
            .unwrap();
        let b = env.get("x", true).unwrap();
        assert!(matches!(b.get_value(), Value::Number(n) if n == 42.0));
    }

    #[test]
    fn test_undefined_lookup() {
        let env = Environment::new();
        assert!(env.get("missing", true).is_none());
    }

    #[test]
    fn test_duplicate_creation_fails_even_across_scopes() {
        let parent = Environment::new();
        parent
            .create("x", Value::Number(1.0), TypeTag::Num, false, false, true)
            .unwrap();
        let child = Environment::with_parent(parent);
        let err = child
            .create("x", Value::Number(2.0), TypeTag::Num, false, false, true)
            .unwrap_err();
        assert_eq!(err.code(), "RT003");
    }

    #[test]
    fn test_parent_lookup() {
        let parent = Environment::new();
        parent
            .create("x", Value::Number(1.0), TypeTag::Num, false, false, true)
            .unwrap();
        let child = Environment::with_parent(parent);
        assert!(child.get("x", true).is_some());
    }

    #[test]
    fn test_immutable_assignment_fails() {
        let env = Environment::new();
        env.create("x", Value::Number(1.0), TypeTag::Num, false, false, false)
            .unwrap();
        let err = env.assign("x", Value::Number(2.0)).unwrap_err();
        assert_eq!(err.code(), "RT040");
    }

    #[test]
    fn test_mutable_assignment_type_checked() {
        let env = Environment::new();
        env.create("x", Value::Number(1.0), TypeTag::Num, false, false, true)
            .unwrap();
        let err = env.assign("x", Value::Bool(true)).unwrap_err();
        assert_eq!(err.code(), "TY001");
        env.assign("x", Value::Number(2.0)).unwrap();
        assert!(matches!(env.get("x", true).unwrap().get_value(), Value::Number(n) if n == 2.0));
    }

    #[test]
    fn test_private_binding_invisible_without_allow_private() {
        let env = Environment::new();
        env.create("secret", Value::Null, TypeTag::Any, true, false, false)
            .unwrap();
        assert!(env.get("secret", false).is_none());
        assert!(env.get("secret", true).is_some());
        env.make_public("secret").unwrap();
        assert!(env.get("secret", false).is_some());
    }

    #[test]
    fn test_namespace_round_trip() {
        let env = Environment::new();
        let ns = Environment::new();
        ns.create("y", Value::Number(9.0), TypeTag::Num, false, true, false)
            .unwrap();
        env.create_namespace("ns", ns).unwrap();
        let found = env.get_namespace("ns").unwrap();
        assert!(found.get("y", false).is_some());
    }
}
