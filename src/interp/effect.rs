use std::collections::BTreeMap;

use crate::expression::value::Value;
use crate::interp::ops::Operation;

/// A fully evaluated operation, ready for a canvas.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Effect {
    pub op: Operation,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub kwargs: BTreeMap<String, Value>,
}

impl Effect {
    pub fn new(op: Operation, args: Vec<Value>, kwargs: BTreeMap<String, Value>) -> Self {
        Self { op, args, kwargs }
    }

    /// The effect that cancels this one, with identical arguments.
    pub fn inverse(&self) -> Option<Self> {
        Some(Self {
            op: self.op.inverse()?,
            args: self.args.clone(),
            kwargs: self.kwargs.clone(),
        })
    }

    /// Replace every keyword argument named like a variable in `live` with its live value.
    pub(crate) fn substitute(&mut self, live: &BTreeMap<String, Value>) {
        for (k, v) in &mut self.kwargs {
            if let Some(cur) = live.get(k) {
                v.clone_from(cur);
            }
        }
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.op)?;
        let mut first = true;
        for a in &self.args {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{a}")?;
        }
        for (k, v) in &self.kwargs {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        f.write_str(")")
    }
}
