use std::{fs::File, io::BufReader, path::Path};

use crate::foundation::error::{GagError, GagResult};
use crate::foundation::math::Rng64;

/// How the expression parser treats inline syntax that looks like `rand(...)` or `c(...)`
/// but does not match its pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrammarMode {
    /// Fall through to the next rule; the value ends up as a plain string.
    #[default]
    Lenient,
    /// Reject with [`GagError::ArgumentGrammar`].
    Strict,
}

impl GrammarMode {
    pub fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// What `execute` does when the canvas rejects one effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Log the failure, record it in the report and keep dispatching.
    #[default]
    Lenient,
    /// Abort with [`GagError::Canvas`] at the first failure.
    Strict,
}

/// Default walk nesting ceiling.
///
/// A debug build spends roughly 6 KiB of stack per nesting level, so 128 levels stay
/// well inside the 2 MiB stack of a spawned or test thread.
pub const DEFAULT_MAX_NESTING: usize = 128;

/// Interpreter settings.
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Inline grammar handling, applied while loading documents.
    pub grammar: GrammarMode,
    /// Canvas failure handling.
    pub dispatch: DispatchPolicy,
    /// Seed for `rand(...)` sampling.
    pub seed: u64,
    /// Deepest allowed walk nesting (top-level walk is level 1).
    pub max_nesting: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            grammar: GrammarMode::Lenient,
            dispatch: DispatchPolicy::Lenient,
            seed: Rng64::DEFAULT_SEED,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl InterpreterConfig {
    /// Strict grammar and strict dispatch.
    pub fn strict() -> Self {
        Self {
            grammar: GrammarMode::Strict,
            dispatch: DispatchPolicy::Strict,
            ..Self::default()
        }
    }

    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> GagResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| GagError::serde(format!("parse interpreter config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GagResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GagError::serde(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}
