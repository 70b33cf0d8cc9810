//! gag turns a document of named drawing commands into calls on a 2D canvas.
//!
//! A document is a sequence of commands, each a list of sub-invocations: drawing
//! primitives, transforms, or references to other commands (including itself). Arguments
//! carry a small inline grammar: `name=value` variables, `rand(a,b)`, `c(r,g,b[,a])`
//! colors and `*=`/`/=`/`-=`/`+=` update rules for recursive variable overrides.
//!
//! - Load a [`CommandTable`]
//! - Wrap it in an [`Interpreter`]
//! - [`Interpreter::execute`] a command against any [`Canvas`], e.g. a [`RecordingCanvas`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod canvas;
pub(crate) mod command;
pub(crate) mod config;
pub(crate) mod expression;
pub(crate) mod interp;

pub use crate::foundation::core::{Affine, Color, Point, Vec2};
pub use crate::foundation::error::{GagError, GagResult};
pub use crate::foundation::math::Rng64;

pub use crate::canvas::backend::{Canvas, PixelSpec, Style};
pub use crate::canvas::bind::dispatch;
pub use crate::canvas::recording::{CanvasCall, RecordedCall, RecordingCanvas};
pub use crate::command::model::{CommandDefinition, SubInvocation};
pub use crate::command::table::CommandTable;
pub use crate::config::{DEFAULT_MAX_NESTING, DispatchPolicy, GrammarMode, InterpreterConfig};
pub use crate::expression::ast::{CompoundOp, Expr};
pub use crate::expression::parser::{parse_str, parse_value};
pub use crate::expression::value::{EmptyScope, Scope, Value};
pub use crate::interp::effect::Effect;
pub use crate::interp::interpreter::{DispatchFailure, ExecutionReport, Interpreter};
pub use crate::interp::ops::{Operation, Primitive, TransformOp};
