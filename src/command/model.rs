use std::collections::BTreeMap;

use crate::expression::ast::Expr;
use crate::expression::value::Value;

/// One entry of a command body: a primitive, a transform, or a reference to a command.
#[derive(Clone, Debug, PartialEq)]
pub struct SubInvocation {
    /// Name as written in the document.
    pub name: String,
    /// Positional arguments, document order.
    pub args: Vec<Expr>,
    /// Keyword arguments.
    pub kwargs: BTreeMap<String, Expr>,
}

impl SubInvocation {
    pub(crate) fn kwarg(&self, key: &str) -> Option<&Expr> {
        self.kwargs.get(key)
    }
}

/// A named command: an ordered body plus the variables it declares.
///
/// Definitions are immutable once loaded. The live override values and recursion
/// counters used while walking live in the interpreter's per-call environment.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandDefinition {
    pub(crate) name: String,
    pub(crate) body: Vec<SubInvocation>,
    pub(crate) base: BTreeMap<String, Value>,
}

impl CommandDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &[SubInvocation] {
        &self.body
    }

    /// Declared variables with their load-time defaults.
    pub fn base_variables(&self) -> &BTreeMap<String, Value> {
        &self.base
    }
}
