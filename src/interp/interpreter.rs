use crate::canvas::backend::Canvas;
use crate::canvas::bind::dispatch;
use crate::command::table::CommandTable;
use crate::config::{DispatchPolicy, InterpreterConfig};
use crate::foundation::error::{GagError, GagResult};
use crate::foundation::math::Rng64;
use crate::interp::effect::Effect;
use crate::interp::walk::Walker;

/// Executes commands of a loaded [`CommandTable`] against a [`Canvas`].
///
/// The interpreter owns the random generator, so `rand(...)` draws continue across
/// calls; every call gets a fresh scope environment.
#[derive(Debug)]
pub struct Interpreter {
    table: CommandTable,
    config: InterpreterConfig,
    rng: Rng64,
}

/// A canvas call that failed and was skipped under [`DispatchPolicy::Lenient`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DispatchFailure {
    /// Position of the effect in the generated sequence.
    pub index: usize,
    /// Canvas operation name.
    pub op: String,
    pub message: String,
}

/// Summary of one [`Interpreter::execute`] call.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ExecutionReport {
    /// Effects handed to the canvas, failed ones included.
    pub dispatched: usize,
    pub failures: Vec<DispatchFailure>,
}

impl ExecutionReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Interpreter {
    pub fn new(table: CommandTable) -> Self {
        Self::with_config(table, InterpreterConfig::default())
    }

    pub fn with_config(table: CommandTable, config: InterpreterConfig) -> Self {
        let rng = Rng64::new(config.seed);
        Self { table, config, rng }
    }

    /// Load a JSON document and build an interpreter for it.
    pub fn from_json_str(s: &str, config: InterpreterConfig) -> GagResult<Self> {
        let table = CommandTable::from_json_str(s, &config)?;
        Ok(Self::with_config(table, config))
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Generate the effect sequence of `name` without dispatching it.
    pub fn effects(&mut self, name: &str) -> GagResult<Vec<Effect>> {
        let mut walker = Walker::new(&self.table, &self.config, &mut self.rng);
        walker.run(name)?;
        Ok(walker.into_effects())
    }

    /// Run command `name`, dispatching each generated effect to `canvas` in order.
    ///
    /// Generation errors abort before anything is drawn. Canvas failures follow
    /// [`InterpreterConfig::dispatch`].
    #[tracing::instrument(skip(self, canvas), fields(policy = ?self.config.dispatch))]
    pub fn execute(&mut self, name: &str, canvas: &mut dyn Canvas) -> GagResult<ExecutionReport> {
        let effects = self.effects(name)?;
        let mut report = ExecutionReport::default();

        for (index, effect) in effects.iter().enumerate() {
            report.dispatched += 1;
            let Err(err) = dispatch(canvas, effect) else {
                continue;
            };
            match self.config.dispatch {
                DispatchPolicy::Strict => {
                    return Err(GagError::canvas(index, effect.op.name(), err.to_string()));
                }
                DispatchPolicy::Lenient => {
                    tracing::warn!(index, op = effect.op.name(), error = %err, "canvas call failed");
                    report.failures.push(DispatchFailure {
                        index,
                        op: effect.op.name().to_owned(),
                        message: err.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            dispatched = report.dispatched,
            failed = report.failures.len(),
            "execute finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interp/interpreter.rs"]
mod tests;
