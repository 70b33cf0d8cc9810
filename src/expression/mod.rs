pub(crate) mod ast;
pub(crate) mod eval;
pub(crate) mod parser;
pub(crate) mod value;
