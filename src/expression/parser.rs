use crate::config::GrammarMode;
use crate::expression::ast::{CompoundOp, Expr};
use crate::foundation::error::{GagError, GagResult};

/// Parse one raw document value into an [`Expr`].
///
/// Numbers and booleans are literals, sequences and mappings are parsed element-wise,
/// strings go through the inline grammar of [`parse_str`], and `null` passes through.
pub fn parse_value(raw: &serde_json::Value, mode: GrammarMode) -> GagResult<Expr> {
    match raw {
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(Expr::Number)
            .ok_or_else(|| GagError::evaluation(format!("number {n} is not representable"))),
        serde_json::Value::Bool(b) => Ok(Expr::Bool(*b)),
        serde_json::Value::String(s) => parse_str(s, mode),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|v| parse_value(v, mode))
            .collect::<GagResult<Vec<_>>>()
            .map(Expr::List),
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| Ok((k.clone(), parse_value(v, mode)?)))
            .collect::<GagResult<Vec<_>>>()
            .map(Expr::Map),
        serde_json::Value::Null => Ok(Expr::Passthrough(serde_json::Value::Null)),
    }
}

/// Classify an inline string. The first matching rule wins:
///
/// 1. `name = value`
/// 2. a plain numeral
/// 3. `*=v`, `/=v`, `-=v`, `+=v`
/// 4. `rand(a,b)` / `rand(b)`
/// 5. `c(r,g,b[,a])`
/// 6. anything else is a string literal
pub fn parse_str(src: &str, mode: GrammarMode) -> GagResult<Expr> {
    let s = src.trim();

    if let Some((name, value)) = split_definition(s) {
        return Ok(Expr::Define {
            name: name.to_owned(),
            value: Box::new(parse_str(value, mode)?),
        });
    }

    if let Some(v) = parse_numeral(s) {
        return Ok(Expr::Number(v));
    }

    if let Some((op, rest)) = CompoundOp::from_prefix(s) {
        let rest = rest.trim();
        if !rest.is_empty() {
            return Ok(Expr::Compound {
                op,
                operand: Box::new(parse_str(rest, mode)?),
            });
        }
    }

    if let Some(body) = call_body(s, "rand") {
        match parse_rand(body) {
            Some(e) => return Ok(e),
            None if mode.is_strict() => {
                return Err(GagError::grammar(format!(
                    "malformed random '{s}' (expected rand(low,high) or rand(high))"
                )));
            }
            None => {}
        }
    }

    if let Some(body) = call_body(s, "c") {
        match parse_color(body, mode)? {
            Some(e) => return Ok(e),
            None if mode.is_strict() => {
                return Err(GagError::grammar(format!(
                    "malformed color '{s}' (expected c(r,g,b) or c(r,g,b,a))"
                )));
            }
            None => {}
        }
    }

    Ok(Expr::Str(src.to_owned()))
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// `name = value` with a non-empty value. `name == x` is not a definition.
fn split_definition(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    if !bytes.first().copied().is_some_and(is_ident_start) {
        return None;
    }
    let mut i = 1;
    while i < bytes.len() && is_ident_continue(bytes[i]) {
        i += 1;
    }
    let name = &s[..i];
    let rest = s[i..].trim_start();
    let value = rest.strip_prefix('=')?;
    if value.starts_with('=') {
        return None;
    }
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((name, value))
}

/// Signed decimal numeral with optional fraction and exponent; the whole input must match.
pub(crate) fn parse_numeral(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut i = 0usize;

    if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }

    if digits == 0 {
        return None;
    }

    // exponent
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if exp_start == i {
            return None;
        }
    }

    if i != bytes.len() {
        return None;
    }
    s.parse().ok()
}

/// Body between `name(` and the final `)`, if `s` has that shape.
fn call_body<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')
}

fn parse_rand(body: &str) -> Option<Expr> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let (low, high) = match parts.as_slice() {
        [high] => (0.0, parse_numeral(high)?),
        [low, high] => (parse_numeral(low)?, parse_numeral(high)?),
        _ => return None,
    };
    Some(Expr::Random { low, high })
}

fn parse_color(body: &str, mode: GrammarMode) -> GagResult<Option<Expr>> {
    let Some(parts) = split_top_level(body) else {
        return Ok(None);
    };
    if !(3..=4).contains(&parts.len()) {
        return Ok(None);
    }

    let mut comps = Vec::with_capacity(4);
    for part in parts {
        let e = parse_str(part, mode)?;
        if !matches!(
            e,
            Expr::Number(_) | Expr::Random { .. } | Expr::Define { .. }
        ) {
            return Ok(None);
        }
        comps.push(Box::new(e));
    }
    if comps.len() == 3 {
        comps.push(Box::new(Expr::Number(1.0)));
    }
    let mut it = comps.into_iter();
    match (it.next(), it.next(), it.next(), it.next()) {
        (Some(r), Some(g), Some(b), Some(a)) => Ok(Some(Expr::Color { r, g, b, a })),
        _ => Ok(None),
    }
}

/// Split on commas that are not nested inside parentheses.
/// Returns `None` for unbalanced input.
fn split_top_level(body: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(body[start..].trim());
    Some(parts)
}

#[cfg(test)]
#[path = "../../tests/unit/expression/parser.rs"]
mod tests;
