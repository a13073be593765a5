//! Symbol table and scope management

use crate::ast::Type;
use std::collections::HashMap;

/// A symbol in the symbol table
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Variable or parameter type, or the return type for functions
    pub ty: Type,
}

/// Kind of symbol
#[derive(Debug, Clone)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function { params: Vec<Type> },
}

/// A scope containing symbols
///
/// Scopes form a chain through the parent link; `lookup` walks outward
/// until the global scope.
#[derive(Debug)]
pub struct Scope {
    symbols: HashMap<String, Symbol>,
    parent: Option<Box<Scope>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            parent: None,
        }
    }

    pub fn define(&mut self, symbol: Symbol) -> Result<(), String> {
        if self.symbols.contains_key(&symbol.name) {
            return Err(format!(
                "'{}' already declared in this scope",
                symbol.name
            ));
        }
        self.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        if let Some(sym) = self.symbols.get(name) {
            Some(sym)
        } else if let Some(parent) = &self.parent {
            parent.lookup(name)
        } else {
            None
        }
    }

    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Push a new child scope
    pub fn push_child(&mut self) {
        let old_scope = std::mem::replace(self, Scope::new());
        self.parent = Some(Box::new(old_scope));
    }

    /// Take the parent scope, replacing self with the parent
    pub fn pop_to_parent(&mut self) -> bool {
        if let Some(parent) = self.parent.take() {
            *self = *parent;
            true
        } else {
            false
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, ty: Type) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind: SymbolKind::Variable,
            ty,
        }
    }

    #[test]
    fn test_define_and_lookup() {
        let mut scope = Scope::new();
        scope.define(var("x", Type::Int)).unwrap();

        assert_eq!(scope.lookup("x").unwrap().ty, Type::Int);
        assert!(scope.lookup("y").is_none());
    }

    #[test]
    fn test_duplicate_in_same_scope_rejected() {
        let mut scope = Scope::new();
        scope.define(var("x", Type::Int)).unwrap();

        assert!(scope.define(var("x", Type::Float)).is_err());
    }

    #[test]
    fn test_child_scope_sees_parent_and_shadows() {
        let mut scope = Scope::new();
        scope.define(var("x", Type::Int)).unwrap();
        scope.define(var("y", Type::Float)).unwrap();

        scope.push_child();
        scope.define(var("x", Type::Char)).unwrap();

        assert_eq!(scope.lookup("x").unwrap().ty, Type::Char);
        assert_eq!(scope.lookup("y").unwrap().ty, Type::Float);
        assert!(scope.lookup_local("y").is_none());

        assert!(scope.pop_to_parent());
        assert_eq!(scope.lookup("x").unwrap().ty, Type::Int);
    }

    #[test]
    fn test_pop_at_root_fails() {
        let mut scope = Scope::new();
        assert!(!scope.pop_to_parent());
    }
}
