/// A parsed, not yet evaluated, argument.
///
/// Expressions stay lazy until the interpreter evaluates them for a concrete effect, so
/// `rand(...)` is resampled on every evaluation and variable references see the live
/// override of the command being walked.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Numeral, from a native number or a numeric string.
    Number(f64),
    /// Native boolean.
    Bool(bool),
    /// String that matched no grammar rule.
    Str(String),
    /// `c(r,g,b[,a])`; alpha is `Number(1.0)` when omitted.
    Color {
        r: Box<Expr>,
        g: Box<Expr>,
        b: Box<Expr>,
        a: Box<Expr>,
    },
    /// `rand(low,high)`, uniform in `[low, high)`.
    Random { low: f64, high: f64 },
    /// Reference to a variable of the enclosing command.
    Var(String),
    /// `name = value`. The loader hoists these into the command's base variables and
    /// leaves a [`Expr::Var`] in their place.
    Define { name: String, value: Box<Expr> },
    /// `*=v`, `/=v`, `-=v`, `+=v`: an update rule applied to a variable's current value.
    Compound { op: CompoundOp, operand: Box<Expr> },
    /// Sequence, element order preserved.
    List(Vec<Expr>),
    /// Mapping, key order preserved.
    Map(Vec<(String, Expr)>),
    /// Raw document value carried through untouched.
    Passthrough(serde_json::Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOp {
    Mul,
    Div,
    Sub,
    Add,
}

impl CompoundOp {
    pub(crate) fn from_prefix(s: &str) -> Option<(Self, &str)> {
        let op = match s.get(..2)? {
            "*=" => Self::Mul,
            "/=" => Self::Div,
            "-=" => Self::Sub,
            "+=" => Self::Add,
            _ => return None,
        };
        Some((op, &s[2..]))
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Mul => "*=",
            Self::Div => "/=",
            Self::Sub => "-=",
            Self::Add => "+=",
        }
    }

    pub fn apply(self, current: f64, operand: f64) -> f64 {
        match self {
            Self::Mul => current * operand,
            Self::Div => current / operand,
            Self::Sub => current - operand,
            Self::Add => current + operand,
        }
    }
}

impl Expr {
    /// `true` for update rules, which only make sense inside a `vars` block.
    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Compound { .. })
    }
}
