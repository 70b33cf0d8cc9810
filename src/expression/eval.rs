use std::collections::BTreeMap;

use crate::expression::ast::Expr;
use crate::expression::value::{Scope, Value};
use crate::foundation::core::Color;
use crate::foundation::error::{GagError, GagResult};
use crate::foundation::math::Rng64;

impl Expr {
    /// Evaluate against `scope`, drawing fresh samples from `rng` for every `rand(...)`.
    pub fn evaluate(&self, scope: &dyn Scope, rng: &mut Rng64) -> GagResult<Value> {
        match self {
            Self::Number(v) => Ok(Value::Number(*v)),
            Self::Bool(b) => Ok(Value::Bool(*b)),
            Self::Str(s) => Ok(Value::Str(s.clone())),
            Self::Random { low, high } => Ok(Value::Number(rng.uniform(*low, *high))),
            Self::Color { r, g, b, a } => Ok(Value::Color(Color::rgba(
                component(r, "r", scope, rng)?,
                component(g, "g", scope, rng)?,
                component(b, "b", scope, rng)?,
                component(a, "a", scope, rng)?,
            ))),
            Self::Var(name) => scope
                .lookup(name)
                .cloned()
                .ok_or_else(|| GagError::evaluation(format!("unknown variable '{name}'"))),
            Self::Define { value, .. } => value.evaluate(scope, rng),
            Self::Compound { op, .. } => Err(GagError::evaluation(format!(
                "update rule '{}' has no current value outside a vars block",
                op.symbol()
            ))),
            Self::List(items) => items
                .iter()
                .map(|e| e.evaluate(scope, rng))
                .collect::<GagResult<Vec<_>>>()
                .map(Value::List),
            Self::Map(entries) => entries
                .iter()
                .map(|(k, e)| Ok((k.clone(), e.evaluate(scope, rng)?)))
                .collect::<GagResult<BTreeMap<_, _>>>()
                .map(Value::Map),
            Self::Passthrough(raw) => Ok(from_json(raw)),
        }
    }

    /// Compute the next value of a variable whose live value is `current`.
    ///
    /// Update rules (`*=v` and friends) apply to `current`; any other expression is
    /// evaluated on its own and replaces it.
    pub fn update(&self, current: &Value, scope: &dyn Scope, rng: &mut Rng64) -> GagResult<Value> {
        let Self::Compound { op, operand } = self else {
            return self.evaluate(scope, rng);
        };
        let Some(cur) = current.as_f64() else {
            return Err(GagError::evaluation(format!(
                "update rule '{}' needs a number, variable holds a {}",
                op.symbol(),
                current.kind()
            )));
        };
        let rhs = operand.evaluate(scope, rng)?;
        let Some(rhs) = rhs.as_f64() else {
            return Err(GagError::evaluation(format!(
                "update rule '{}' operand must be a number, got {}",
                op.symbol(),
                rhs.kind()
            )));
        };
        Ok(Value::Number(op.apply(cur, rhs)))
    }
}

fn component(e: &Expr, name: &str, scope: &dyn Scope, rng: &mut Rng64) -> GagResult<f64> {
    let v = e.evaluate(scope, rng)?;
    v.as_f64().ok_or_else(|| {
        GagError::evaluation(format!(
            "color component '{name}' must be a number, got {}",
            v.kind()
        ))
    })
}

/// Convert a raw document value without applying any grammar.
pub(crate) fn from_json(raw: &serde_json::Value) -> Value {
    match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/eval.rs"]
mod tests;
