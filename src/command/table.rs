use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::command::model::{CommandDefinition, SubInvocation};
use crate::config::{GrammarMode, InterpreterConfig};
use crate::expression::ast::Expr;
use crate::expression::parser::parse_value;
use crate::expression::value::Value;
use crate::foundation::error::{GagError, GagResult};
use crate::foundation::math::Rng64;
use crate::interp::ops::builtin;

/// All command definitions of a loaded document, by name.
#[derive(Clone, Debug, Default)]
pub struct CommandTable {
    commands: HashMap<String, CommandDefinition>,
}

impl CommandTable {
    /// Load a document with the default configuration.
    pub fn load(document: &serde_json::Value) -> GagResult<Self> {
        Self::load_with(document, &InterpreterConfig::default())
    }

    /// Load a document.
    ///
    /// The root must be a sequence of single-key mappings `name: [sub-invocations]`, and
    /// each sub-invocation a single-key mapping whose value is a positional-argument
    /// sequence, `null`, or `{args: [...], kwargs: {...}}`.
    #[tracing::instrument(skip(document, config), fields(grammar = ?config.grammar))]
    pub fn load_with(document: &serde_json::Value, config: &InterpreterConfig) -> GagResult<Self> {
        let serde_json::Value::Array(entries) = document else {
            return Err(GagError::structure(format!(
                "root of the document must be a sequence, not {}",
                json_kind(document)
            )));
        };

        let mut rng = Rng64::new(config.seed);
        let mut commands = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            let (name, body) = single_entry(entry, || format!("command #{index}"))?;
            let def = load_definition(name, body, config.grammar, &mut rng)?;
            if commands.insert(name.to_owned(), def).is_some() {
                tracing::debug!(command = name, "redefinition replaces earlier command");
            }
        }

        tracing::debug!(commands = commands.len(), "loaded command table");
        Ok(Self { commands })
    }

    /// Parse and load a JSON document from a string.
    pub fn from_json_str(s: &str, config: &InterpreterConfig) -> GagResult<Self> {
        let doc: serde_json::Value = serde_json::from_str(s)
            .map_err(|e| GagError::serde(format!("parse document JSON: {e}")))?;
        Self::load_with(&doc, config)
    }

    /// Parse and load a JSON document from a reader.
    pub fn from_reader<R: std::io::Read>(r: R, config: &InterpreterConfig) -> GagResult<Self> {
        let doc: serde_json::Value = serde_json::from_reader(r)
            .map_err(|e| GagError::serde(format!("parse document JSON: {e}")))?;
        Self::load_with(&doc, config)
    }

    /// Parse and load a JSON document from a file on disk.
    pub fn from_path(path: impl AsRef<Path>, config: &InterpreterConfig) -> GagResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GagError::serde(format!("open document JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f), config)
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Check that every sub-invocation resolves to a primitive, a transform, or a
    /// command of this table.
    pub fn validate(&self) -> GagResult<()> {
        for name in self.names() {
            let def = &self.commands[name];
            for sub in &def.body {
                if builtin(&sub.name).is_none() && !self.contains(&sub.name) {
                    return Err(GagError::unknown_command(&sub.name));
                }
            }
        }
        Ok(())
    }
}

fn load_definition(
    name: &str,
    body: &serde_json::Value,
    mode: GrammarMode,
    rng: &mut Rng64,
) -> GagResult<CommandDefinition> {
    let serde_json::Value::Array(items) = body else {
        return Err(GagError::structure(format!(
            "body of command '{name}' must be a sequence, not {}",
            json_kind(body)
        )));
    };

    let mut binder = Binder {
        base: BTreeMap::new(),
        rng,
    };
    let mut subs = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let (sub_name, raw) = single_entry(item, || format!("'{name}' entry #{index}"))?;
        let (args, kwargs) = split_arguments(name, sub_name, raw, mode)?;

        let args = args
            .iter()
            .map(|a| binder.bind(parse_value(a, mode)?))
            .collect::<GagResult<Vec<_>>>()?;
        let kwargs = kwargs
            .into_iter()
            .map(|(k, v)| Ok((k.clone(), binder.bind(parse_value(v, mode)?)?)))
            .collect::<GagResult<BTreeMap<_, _>>>()?;

        if mode.is_strict() {
            let stray = args
                .iter()
                .chain(kwargs.iter().filter(|(k, _)| *k != "vars").map(|(_, e)| e))
                .any(has_update_rule);
            if stray {
                return Err(GagError::grammar(format!(
                    "'{name}' -> '{sub_name}': update rules are only valid inside a vars block"
                )));
            }
        }

        subs.push(SubInvocation {
            name: sub_name.to_owned(),
            args,
            kwargs,
        });
    }

    Ok(CommandDefinition {
        name: name.to_owned(),
        body: subs,
        base: binder.base,
    })
}

type RawArguments<'a> = (
    &'a [serde_json::Value],
    Vec<(&'a String, &'a serde_json::Value)>,
);

fn split_arguments<'a>(
    command: &str,
    sub: &str,
    raw: &'a serde_json::Value,
    mode: GrammarMode,
) -> GagResult<RawArguments<'a>> {
    match raw {
        serde_json::Value::Array(args) => Ok((args, Vec::new())),
        serde_json::Value::Null => Ok((&[], Vec::new())),
        serde_json::Value::Object(map) => {
            let args: &[serde_json::Value] = match map.get("args") {
                None => &[],
                Some(serde_json::Value::Array(a)) => a,
                Some(other) => {
                    return Err(GagError::structure(format!(
                        "'{command}' -> '{sub}': args must be a sequence, not {}",
                        json_kind(other)
                    )));
                }
            };
            let kwargs = match map.get("kwargs") {
                None => Vec::new(),
                Some(serde_json::Value::Object(k)) => k.iter().collect(),
                Some(other) => {
                    return Err(GagError::structure(format!(
                        "'{command}' -> '{sub}': kwargs must be a mapping, not {}",
                        json_kind(other)
                    )));
                }
            };
            for key in map.keys().filter(|k| *k != "args" && *k != "kwargs") {
                if mode.is_strict() {
                    return Err(GagError::grammar(format!(
                        "'{command}' -> '{sub}': unexpected key '{key}' (expected args/kwargs)"
                    )));
                }
                tracing::warn!(command, sub, key = key.as_str(), "ignoring unexpected key");
            }
            Ok((args, kwargs))
        }
        other => Err(GagError::structure(format!(
            "'{command}' -> '{sub}': arguments must be a sequence or mapping, not {}",
            json_kind(other)
        ))),
    }
}

/// Hoists `name = value` definitions into a command's base variables.
struct Binder<'r> {
    base: BTreeMap<String, Value>,
    rng: &'r mut Rng64,
}

impl Binder<'_> {
    fn bind(&mut self, expr: Expr) -> GagResult<Expr> {
        Ok(match expr {
            Expr::Define { name, value } => {
                let value = self.bind(*value)?;
                let default = value.evaluate(&self.base, self.rng)?;
                if self.base.insert(name.clone(), default).is_some() {
                    tracing::debug!(variable = name.as_str(), "variable redeclared");
                }
                Expr::Var(name)
            }
            Expr::Color { r, g, b, a } => Expr::Color {
                r: Box::new(self.bind(*r)?),
                g: Box::new(self.bind(*g)?),
                b: Box::new(self.bind(*b)?),
                a: Box::new(self.bind(*a)?),
            },
            Expr::Compound { op, operand } => Expr::Compound {
                op,
                operand: Box::new(self.bind(*operand)?),
            },
            Expr::List(items) => Expr::List(
                items
                    .into_iter()
                    .map(|e| self.bind(e))
                    .collect::<GagResult<_>>()?,
            ),
            Expr::Map(entries) => Expr::Map(
                entries
                    .into_iter()
                    .map(|(k, e)| Ok((k, self.bind(e)?)))
                    .collect::<GagResult<_>>()?,
            ),
            leaf @ (Expr::Number(_)
            | Expr::Bool(_)
            | Expr::Str(_)
            | Expr::Random { .. }
            | Expr::Var(_)
            | Expr::Passthrough(_)) => leaf,
        })
    }
}

fn has_update_rule(expr: &Expr) -> bool {
    match expr {
        Expr::Compound { .. } => true,
        Expr::List(items) => items.iter().any(has_update_rule),
        Expr::Map(entries) => entries.iter().any(|(_, e)| has_update_rule(e)),
        _ => false,
    }
}

fn single_entry<'a>(
    v: &'a serde_json::Value,
    what: impl FnOnce() -> String,
) -> GagResult<(&'a str, &'a serde_json::Value)> {
    match v {
        serde_json::Value::Object(map) if map.len() == 1 => {
            let (k, v) = map.iter().next().ok_or_else(|| {
                GagError::structure(format!("{}: empty mapping", what()))
            })?;
            Ok((k.as_str(), v))
        }
        serde_json::Value::Object(map) => Err(GagError::structure(format!(
            "{}: single-key mapping expected, found {} keys",
            what(),
            map.len()
        ))),
        other => Err(GagError::structure(format!(
            "{}: single-key mapping expected, found {}",
            what(),
            json_kind(other)
        ))),
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a sequence",
        serde_json::Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/command/table.rs"]
mod tests;
