//! The recursive effect generator.
//!
//! A walk visits the sub-invocations of one command in document order and appends the
//! resulting effects to a single output sequence:
//!
//! - primitives are evaluated and emitted immediately;
//! - transforms are evaluated once, emitted, and their exact inverse is pushed on the
//!   walk's undo stack;
//! - command references descend into the referenced command, wrapped in the
//!   reference's own transform and variable overrides.
//!
//! When the body is exhausted the undo stack is emitted in reverse, so the net
//! transform of every walk is the identity.

use std::collections::BTreeMap;

use crate::command::model::{CommandDefinition, SubInvocation};
use crate::command::table::CommandTable;
use crate::config::{GrammarMode, InterpreterConfig};
use crate::expression::ast::Expr;
use crate::expression::value::Value;
use crate::foundation::error::{GagError, GagResult};
use crate::foundation::math::Rng64;
use crate::interp::effect::Effect;
use crate::interp::env::Environment;
use crate::interp::ops::{Builtin, Operation, TransformOp, builtin};

/// Keyword holding override rules on a self-reference.
pub const VARS_KEY: &str = "vars";
/// Keyword holding the recursion stop policy on a self-reference.
pub const STOP_RECURSION_KEY: &str = "stop_recursion";
const MAX_DEPTH_KEY: &str = "max_depth";
/// Keywords a command reference turns into its own `transform` effect.
const TRANSFORM_KEYS: [&str; 3] = ["translate_x", "translate_y", "scale"];

pub(crate) struct Walker<'t, 'r> {
    table: &'t CommandTable,
    grammar: GrammarMode,
    max_nesting: usize,
    rng: &'r mut Rng64,
    pub(crate) env: Environment<'t>,
    out: Vec<Effect>,
}

impl<'t, 'r> Walker<'t, 'r> {
    pub(crate) fn new(
        table: &'t CommandTable,
        config: &InterpreterConfig,
        rng: &'r mut Rng64,
    ) -> Self {
        Self {
            table,
            grammar: config.grammar,
            max_nesting: config.max_nesting,
            rng,
            env: Environment::new(),
            out: Vec::new(),
        }
    }

    /// Walk the command `name` from the top.
    pub(crate) fn run(&mut self, name: &str) -> GagResult<()> {
        let def = self
            .table
            .get(name)
            .ok_or_else(|| GagError::unknown_command(name))?;
        self.walk(def)?;
        debug_assert!(self.env.is_settled());
        tracing::debug!(command = name, effects = self.out.len(), "walk complete");
        Ok(())
    }

    pub(crate) fn into_effects(self) -> Vec<Effect> {
        self.out
    }

    fn walk(&mut self, def: &'t CommandDefinition) -> GagResult<()> {
        let level = self.env.enter(def);
        let result = if level > self.max_nesting {
            Err(GagError::RecursionLimit {
                command: def.name().to_owned(),
                depth: level,
            })
        } else {
            self.walk_body(def)
        };
        self.env.exit();
        result
    }

    fn walk_body(&mut self, def: &'t CommandDefinition) -> GagResult<()> {
        let mut undo: Vec<Effect> = Vec::new();

        for sub in def.body() {
            match builtin(&sub.name) {
                Some(Builtin::Primitive(p)) => {
                    let (args, kwargs) = self.evaluate_arguments(sub, &[])?;
                    self.emit(Effect::new(Operation::Draw(p), args, kwargs));
                }
                Some(Builtin::Transform(t)) => {
                    let (args, kwargs) = self.evaluate_arguments(sub, &[])?;
                    let mut effect = Effect::new(Operation::Apply(t), args, kwargs);
                    if let Some(live) = self.env.overrides(def.name()) {
                        effect.substitute(live);
                    }
                    let applied = self.emit(effect);
                    undo.extend(applied.inverse());
                }
                None => {
                    let target = self
                        .table
                        .get(&sub.name)
                        .ok_or_else(|| GagError::unknown_command(&sub.name))?;
                    self.reference(def, sub, target)?;
                }
            }
        }

        for effect in undo.into_iter().rev() {
            self.emit_sealed(effect);
        }
        Ok(())
    }

    fn reference(
        &mut self,
        def: &'t CommandDefinition,
        sub: &'t SubInvocation,
        target: &'t CommandDefinition,
    ) -> GagResult<()> {
        let self_ref = def.name() == target.name();

        let (args, kwargs) = self.evaluate_arguments(sub, &[VARS_KEY])?;
        self.check_reference_keywords(sub, &kwargs)?;

        let depth = self.env.bump_depth(target.name());
        if self_ref {
            if let Some(max_depth) = stop_depth(&kwargs)? {
                if depth as f64 > max_depth - 1.0 {
                    tracing::trace!(command = target.name(), depth, "recursion stops");
                    self.env.reset_depth(target.name());
                    return Ok(());
                }
            }
        } else if kwargs.contains_key(STOP_RECURSION_KEY) {
            tracing::debug!(
                command = target.name(),
                "stop_recursion only applies to self-references"
            );
        }

        let snapshots = match sub.kwarg(VARS_KEY) {
            Some(rules) if self_ref => self.apply_vars(target, rules)?,
            Some(_) if self.grammar.is_strict() => {
                return Err(GagError::grammar(format!(
                    "'{}' -> '{}': vars only apply to self-references",
                    def.name(),
                    target.name()
                )));
            }
            Some(_) => {
                tracing::warn!(
                    command = def.name(),
                    referenced = target.name(),
                    "ignoring vars on a reference to another command"
                );
                Vec::new()
            }
            None => Vec::new(),
        };

        let own_transform = reference_transform(args, &kwargs)
            .and_then(|effect| self.emit(effect).inverse());

        self.walk(target)?;

        if let Some(inverse) = own_transform {
            self.emit_sealed(inverse);
        }
        for (var, previous) in snapshots.into_iter().rev() {
            self.env.restore(target.name(), &var, previous);
        }
        Ok(())
    }

    /// Install the overrides of a `vars` block, returning what they shadow.
    fn apply_vars(
        &mut self,
        target: &'t CommandDefinition,
        rules: &Expr,
    ) -> GagResult<Vec<(String, Option<Value>)>> {
        let Expr::Map(entries) = rules else {
            return Err(GagError::evaluation(format!(
                "vars of '{}' must be a mapping of variable updates",
                target.name()
            )));
        };

        let mut snapshots = Vec::with_capacity(entries.len());
        for (var, rule) in entries {
            let next = match self.env.override_value(target.name(), var).cloned() {
                Some(current) => rule.update(&current, &self.env, self.rng)?,
                None if rule.is_compound() => {
                    return Err(GagError::evaluation(format!(
                        "cannot update undeclared variable '{var}' of '{}'",
                        target.name()
                    )));
                }
                None => rule.evaluate(&self.env, self.rng)?,
            };
            let previous = self.env.set_override(target.name(), var, next);
            snapshots.push((var.clone(), previous));
        }
        Ok(snapshots)
    }

    fn evaluate_arguments(
        &mut self,
        sub: &SubInvocation,
        skip: &[&str],
    ) -> GagResult<(Vec<Value>, BTreeMap<String, Value>)> {
        let args = sub
            .args
            .iter()
            .map(|e| e.evaluate(&self.env, self.rng))
            .collect::<GagResult<Vec<_>>>()?;
        let mut kwargs = BTreeMap::new();
        for (k, e) in &sub.kwargs {
            if skip.contains(&k.as_str()) {
                continue;
            }
            kwargs.insert(k.clone(), e.evaluate(&self.env, self.rng)?);
        }
        Ok((args, kwargs))
    }

    fn check_reference_keywords(
        &self,
        sub: &SubInvocation,
        kwargs: &BTreeMap<String, Value>,
    ) -> GagResult<()> {
        for key in kwargs.keys() {
            if key == STOP_RECURSION_KEY || TRANSFORM_KEYS.contains(&key.as_str()) {
                continue;
            }
            if self.grammar.is_strict() {
                return Err(GagError::grammar(format!(
                    "reference to '{}': unexpected keyword '{key}'",
                    sub.name
                )));
            }
            tracing::debug!(command = sub.name.as_str(), key = key.as_str(), "ignoring keyword");
        }
        Ok(())
    }

    /// Append an effect after substituting the live overrides of every command the
    /// walk descended into through a reference. Outer references apply last.
    fn emit(&mut self, mut effect: Effect) -> &Effect {
        for def in self.env.referenced_frames() {
            if let Some(live) = self.env.overrides(def.name()) {
                effect.substitute(live);
            }
        }
        self.emit_sealed(effect)
    }

    /// Append an effect exactly as given. Used for inverses, which must repeat the
    /// arguments of the effect they cancel.
    fn emit_sealed(&mut self, effect: Effect) -> &Effect {
        tracing::trace!(effect = %effect, "emit");
        self.out.push(effect);
        &self.out[self.out.len() - 1]
    }
}

/// `stop_recursion.max_depth`, when present.
fn stop_depth(kwargs: &BTreeMap<String, Value>) -> GagResult<Option<f64>> {
    let Some(policy) = kwargs.get(STOP_RECURSION_KEY) else {
        return Ok(None);
    };
    policy
        .as_map()
        .and_then(|m| m.get(MAX_DEPTH_KEY))
        .and_then(Value::as_f64)
        .map(Some)
        .ok_or_else(|| {
            GagError::evaluation(format!(
                "{STOP_RECURSION_KEY} must be a mapping with a numeric {MAX_DEPTH_KEY}, got {policy}"
            ))
        })
}

/// The `transform(translate_x, translate_y, scale)` a reference applies around its
/// descent, or `None` when it supplies no transform arguments.
fn reference_transform(args: Vec<Value>, kwargs: &BTreeMap<String, Value>) -> Option<Effect> {
    let transform_kwargs: BTreeMap<String, Value> = kwargs
        .iter()
        .filter(|(k, _)| TRANSFORM_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if args.is_empty() && transform_kwargs.is_empty() {
        return None;
    }
    Some(Effect::new(
        Operation::Apply(TransformOp::Transform),
        args,
        transform_kwargs,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/interp/walk.rs"]
mod tests;
