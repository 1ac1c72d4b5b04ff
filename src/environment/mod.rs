use crate::object::Object;
use compact_str::CompactString;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// A lexical scope shared by handle.
///
/// Cloning an `Environment` yields another handle onto the same bindings, which
/// is how closures observe later `let`s in the scope that defined them.
#[derive(Clone, Default)]
pub struct Environment {
    inner: Rc<RefCell<EnvironmentImpl>>,
}

#[derive(Default)]
struct EnvironmentImpl {
    values: HashMap<CompactString, Object>,
    parent: Option<Environment>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a child scope whose lookups fall back to `self`.
    pub fn new_scope(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EnvironmentImpl {
                values: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    pub fn access(&self, name: &str) -> Option<Object> {
        let inner = self.inner.borrow();
        match inner.values.get(name) {
            Some(value) => Some(value.clone()),
            None => inner.parent.as_ref().and_then(|parent| parent.access(name)),
        }
    }

    /// Binds `name` in this scope only, shadowing any outer binding.
    pub fn declare(&self, name: &str, value: Object) {
        self.inner
            .borrow_mut()
            .values
            .insert(CompactString::from(name), value);
    }

    pub fn is_same(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

// Closures hold their defining scope, which may hold the closure in turn, so
// only names are printed.
impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        let mut names: Vec<_> = inner.values.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_parent", &inner.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_falls_back_to_parent() {
        let globals = Environment::new();
        globals.declare("x", Object::Integer(1));
        let local = globals.new_scope();

        assert_eq!(local.access("x"), Some(Object::Integer(1)));
        assert_eq!(local.access("y"), None);
    }

    #[test]
    fn declare_shadows_without_touching_parent() {
        let globals = Environment::new();
        globals.declare("x", Object::Integer(1));
        let local = globals.new_scope();
        local.declare("x", Object::Integer(2));

        assert_eq!(local.access("x"), Some(Object::Integer(2)));
        assert_eq!(globals.access("x"), Some(Object::Integer(1)));
    }

    #[test]
    fn handles_share_bindings() {
        let globals = Environment::new();
        let alias = globals.clone();
        let child = globals.new_scope();
        alias.declare("late", Object::Boolean(true));

        assert!(alias.is_same(&globals));
        assert!(!child.is_same(&globals));
        assert_eq!(child.access("late"), Some(Object::Boolean(true)));
    }

    #[test]
    fn debug_lists_names_only() {
        let globals = Environment::new();
        globals.declare("b", Object::Null);
        globals.declare("a", Object::Null);

        assert_eq!(
            format!("{globals:?}"),
            r#"Environment { names: ["a", "b"], has_parent: false }"#
        );
    }
}
