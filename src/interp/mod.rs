pub(crate) mod effect;
pub(crate) mod env;
pub(crate) mod interpreter;
pub(crate) mod ops;
pub(crate) mod walk;
