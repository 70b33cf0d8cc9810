/// Convenience result type used across gag.
pub type GagResult<T> = Result<T, GagError>;

/// Top-level error taxonomy used by loader, interpreter and canvas APIs.
#[derive(thiserror::Error, Debug)]
pub enum GagError {
    /// The document does not have the required nesting of sequences and single-key mappings.
    #[error("structure error: {0}")]
    Structure(String),

    /// A sub-invocation (or `execute` target) names no primitive, transform or command.
    #[error("unknown command: '{name}'")]
    UnknownCommand {
        /// The name that failed to resolve.
        name: String,
    },

    /// Inline argument syntax rejected in strict grammar mode.
    #[error("argument grammar error: {0}")]
    ArgumentGrammar(String),

    /// Errors while evaluating an expression against the active environment.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// A walk nested deeper than the configured ceiling.
    #[error("recursion limit: command '{command}' nested {depth} levels deep")]
    RecursionLimit {
        /// Command whose walk crossed the ceiling.
        command: String,
        /// Nesting level that was rejected.
        depth: usize,
    },

    /// A canvas rejected an effect (or its arguments could not be bound).
    #[error("canvas error at effect #{index} ({op}): {message}")]
    Canvas {
        /// Position of the effect in the dispatched sequence.
        index: usize,
        /// Canvas operation name.
        op: String,
        /// Failure description.
        message: String,
    },

    /// Errors when reading or writing serialized documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GagError {
    /// Build a [`GagError::Structure`] value.
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure(msg.into())
    }

    /// Build a [`GagError::UnknownCommand`] value.
    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self::UnknownCommand { name: name.into() }
    }

    /// Build a [`GagError::ArgumentGrammar`] value.
    pub fn grammar(msg: impl Into<String>) -> Self {
        Self::ArgumentGrammar(msg.into())
    }

    /// Build a [`GagError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`GagError::Canvas`] value.
    pub fn canvas(index: usize, op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Canvas {
            index,
            op: op.into(),
            message: message.into(),
        }
    }

    /// Build a [`GagError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
