use std::collections::{BTreeMap, HashMap};

use crate::command::model::CommandDefinition;
use crate::expression::value::{Scope, Value};

/// Mutable scope state of one top-level walk.
///
/// Live override maps and recursion counters are keyed by definition, so every walk of
/// the same command inside this call shares them, while separate calls never see each
/// other's state.
#[derive(Debug, Default)]
pub(crate) struct Environment<'t> {
    /// Active walks, outermost first. Every frame after the first was entered through a
    /// command reference.
    frames: Vec<&'t CommandDefinition>,
    live: HashMap<&'t str, BTreeMap<String, Value>>,
    depth: HashMap<&'t str, i64>,
}

impl<'t> Environment<'t> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Push a walk of `def`, seeding its live overrides from the declared base values on
    /// its first activation. Returns the new nesting level (top-level walk is 1).
    pub(crate) fn enter(&mut self, def: &'t CommandDefinition) -> usize {
        self.live
            .entry(def.name())
            .or_insert_with(|| def.base_variables().clone());
        self.frames.push(def);
        self.frames.len()
    }

    /// Pop the innermost walk. When the last activation of a definition exits, its
    /// overrides fall back to the base values and its counter to zero.
    pub(crate) fn exit(&mut self) {
        let Some(def) = self.frames.pop() else {
            return;
        };
        if !self.frames.iter().any(|f| f.name() == def.name()) {
            self.live.remove(def.name());
            self.depth.remove(def.name());
        }
    }

    /// Frames entered through a command reference, innermost first.
    pub(crate) fn referenced_frames(&self) -> impl Iterator<Item = &'t CommandDefinition> + '_ {
        self.frames.iter().skip(1).rev().copied()
    }

    pub(crate) fn overrides(&self, command: &str) -> Option<&BTreeMap<String, Value>> {
        self.live.get(command)
    }

    pub(crate) fn override_value(&self, command: &str, var: &str) -> Option<&Value> {
        self.live.get(command)?.get(var)
    }

    /// Install a new live value and return the one it shadows.
    pub(crate) fn set_override(
        &mut self,
        command: &'t str,
        var: &str,
        value: Value,
    ) -> Option<Value> {
        self.live
            .entry(command)
            .or_default()
            .insert(var.to_owned(), value)
    }

    /// Undo a [`Environment::set_override`] with the value it returned.
    pub(crate) fn restore(&mut self, command: &str, var: &str, previous: Option<Value>) {
        let Some(map) = self.live.get_mut(command) else {
            return;
        };
        match previous {
            Some(v) => {
                map.insert(var.to_owned(), v);
            }
            None => {
                map.remove(var);
            }
        }
    }

    pub(crate) fn bump_depth(&mut self, command: &'t str) -> i64 {
        let d = self.depth.entry(command).or_insert(0);
        *d += 1;
        *d
    }

    pub(crate) fn reset_depth(&mut self, command: &'t str) {
        self.depth.insert(command, 0);
    }

    #[cfg(test)]
    pub(crate) fn depth(&self, command: &str) -> i64 {
        self.depth.get(command).copied().unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn nesting(&self) -> usize {
        self.frames.len()
    }

    /// No active walk, no live override, every counter at zero.
    pub(crate) fn is_settled(&self) -> bool {
        self.frames.is_empty() && self.live.is_empty() && self.depth.values().all(|&d| d == 0)
    }
}

impl Scope for Environment<'_> {
    /// Innermost walk first, then outward through the enclosing walks.
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| self.live.get(f.name())?.get(name))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interp/env.rs"]
mod tests;
