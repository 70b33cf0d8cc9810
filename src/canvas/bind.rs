//! Binding of evaluated effects onto canvas calls.
//!
//! Every canvas operation has a fixed parameter list. Positional values fill it from the
//! left, keyword values by name, and omitted parameters take their default.

use anyhow::{anyhow, bail};

use crate::canvas::backend::{Canvas, PixelSpec, Style};
use crate::expression::value::Value;
use crate::foundation::core::{Color, Point};
use crate::foundation::error::GagResult;
use crate::interp::effect::Effect;
use crate::interp::ops::{Operation, Primitive, TransformOp};

#[derive(Clone, Copy, Debug)]
enum Fallback {
    Required,
    Null,
    Number(f64),
}

type Params = &'static [(&'static str, Fallback)];

const RECT: Params = &[
    ("x", Fallback::Required),
    ("y", Fallback::Required),
    ("width", Fallback::Required),
    ("height", Fallback::Required),
    ("fill_color", Fallback::Null),
    ("stroke_color", Fallback::Null),
];
const CIRCLE: Params = &[
    ("center", Fallback::Required),
    ("radius", Fallback::Required),
    ("fill_color", Fallback::Null),
    ("stroke_color", Fallback::Null),
];
const POLYGON: Params = &[
    ("coordinates", Fallback::Required),
    ("fill_color", Fallback::Null),
    ("stroke_color", Fallback::Null),
];
const PIXEL: Params = &[
    ("x", Fallback::Required),
    ("y", Fallback::Required),
    ("color", Fallback::Null),
];
const PIXELS: Params = &[("pixels", Fallback::Required)];
const TEXT: Params = &[
    ("x", Fallback::Required),
    ("y", Fallback::Required),
    ("text", Fallback::Required),
    ("fill_color", Fallback::Null),
    ("stroke_color", Fallback::Null),
];
const TRANSLATE: Params = &[("x", Fallback::Required), ("y", Fallback::Required)];
const SCALE: Params = &[("amount", Fallback::Number(1.0))];
const ROTATE: Params = &[("angle", Fallback::Required)];
const TRANSFORM: Params = &[
    ("translate_x", Fallback::Number(0.0)),
    ("translate_y", Fallback::Number(0.0)),
    ("scale", Fallback::Number(1.0)),
];

fn params(op: Operation) -> Params {
    match op {
        Operation::Draw(p) => match p {
            Primitive::Rect => RECT,
            Primitive::Circle => CIRCLE,
            Primitive::Polygon => POLYGON,
            Primitive::Pixel => PIXEL,
            Primitive::Pixels => PIXELS,
            Primitive::Text => TEXT,
        },
        Operation::Apply(t) | Operation::Undo(t) => match t {
            TransformOp::Translate => TRANSLATE,
            TransformOp::Scale => SCALE,
            TransformOp::Rotate => ROTATE,
            TransformOp::Transform => TRANSFORM,
        },
    }
}

/// Parameter values of one call, in declaration order.
struct Bound<'e> {
    params: Params,
    values: Vec<Option<&'e Value>>,
}

fn bind(effect: &Effect) -> anyhow::Result<Bound<'_>> {
    let params = params(effect.op);
    if effect.args.len() > params.len() {
        bail!(
            "takes at most {} positional arguments, got {}",
            params.len(),
            effect.args.len()
        );
    }

    let mut values: Vec<Option<&Value>> = vec![None; params.len()];
    for (slot, v) in values.iter_mut().zip(&effect.args) {
        *slot = Some(v);
    }
    for (key, v) in &effect.kwargs {
        let i = params
            .iter()
            .position(|(name, _)| name == key)
            .ok_or_else(|| anyhow!("unexpected keyword argument '{key}'"))?;
        if values[i].is_some() {
            bail!("got multiple values for argument '{key}'");
        }
        values[i] = Some(v);
    }
    for ((name, fallback), v) in params.iter().zip(&values) {
        if v.is_none() && matches!(fallback, Fallback::Required) {
            bail!("missing required argument '{name}'");
        }
    }
    Ok(Bound { params, values })
}

impl Bound<'_> {
    fn name(&self, i: usize) -> &'static str {
        self.params[i].0
    }

    fn number(&self, i: usize) -> anyhow::Result<f64> {
        match (self.values[i], self.params[i].1) {
            (Some(v), _) => v
                .as_f64()
                .ok_or_else(|| anyhow!("'{}' must be a number, got {}", self.name(i), v.kind())),
            (None, Fallback::Number(d)) => Ok(d),
            (None, _) => bail!("'{}' has no value", self.name(i)),
        }
    }

    fn color(&self, i: usize) -> anyhow::Result<Option<Color>> {
        match self.values[i] {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_color()
                .map(Some)
                .ok_or_else(|| anyhow!("'{}' must be a color, got {}", self.name(i), v.kind())),
        }
    }

    fn style(&self, fill: usize) -> anyhow::Result<Style> {
        Ok(Style {
            fill: self.color(fill)?,
            stroke: self.color(fill + 1)?,
        })
    }

    fn point(&self, i: usize) -> anyhow::Result<Point> {
        let v = self.required(i)?;
        as_point(v).ok_or_else(|| anyhow!("'{}' must be an [x, y] pair, got {v}", self.name(i)))
    }

    fn points(&self, i: usize) -> anyhow::Result<Vec<Point>> {
        let v = self.required(i)?;
        v.as_list()
            .and_then(|items| items.iter().map(as_point).collect::<Option<Vec<_>>>())
            .ok_or_else(|| anyhow!("'{}' must be a list of [x, y] pairs", self.name(i)))
    }

    fn text(&self, i: usize) -> anyhow::Result<String> {
        match self.required(i)? {
            Value::Str(s) => Ok(s.clone()),
            v @ (Value::Number(_) | Value::Bool(_)) => Ok(v.to_string()),
            v => bail!("'{}' must be text, got {}", self.name(i), v.kind()),
        }
    }

    fn pixels(&self, i: usize) -> anyhow::Result<Vec<PixelSpec>> {
        let v = self.required(i)?;
        let items = v
            .as_list()
            .ok_or_else(|| anyhow!("'{}' must be a list, got {}", self.name(i), v.kind()))?;
        items
            .iter()
            .enumerate()
            .map(|(n, item)| {
                as_pixel(item)
                    .ok_or_else(|| anyhow!("pixel #{n} must be [x, y] or [x, y, color], got {item}"))
            })
            .collect()
    }

    fn required(&self, i: usize) -> anyhow::Result<&Value> {
        self.values[i].ok_or_else(|| anyhow!("'{}' has no value", self.name(i)))
    }
}

fn as_point(v: &Value) -> Option<Point> {
    match v.as_list()? {
        [x, y] => Some(Point::new(x.as_f64()?, y.as_f64()?)),
        _ => None,
    }
}

fn as_pixel(v: &Value) -> Option<PixelSpec> {
    let (x, y, color) = match v.as_list()? {
        [x, y] => (x, y, None),
        [x, y, Value::Null] => (x, y, None),
        [x, y, c] => (x, y, Some(c.as_color()?)),
        _ => return None,
    };
    Some(PixelSpec {
        x: x.as_f64()?,
        y: y.as_f64()?,
        color,
    })
}

/// Bind `effect` onto its canvas operation and call it.
pub fn dispatch(canvas: &mut dyn Canvas, effect: &Effect) -> GagResult<()> {
    let b = bind(effect)?;
    match effect.op {
        Operation::Draw(p) => match p {
            Primitive::Rect => canvas.draw_rect(
                b.number(0)?,
                b.number(1)?,
                b.number(2)?,
                b.number(3)?,
                b.style(4)?,
            ),
            Primitive::Circle => canvas.draw_circle(b.point(0)?, b.number(1)?, b.style(2)?),
            Primitive::Polygon => canvas.draw_polygon(&b.points(0)?, b.style(1)?),
            Primitive::Pixel => canvas.draw_pixel(b.number(0)?, b.number(1)?, b.color(2)?),
            Primitive::Pixels => canvas.draw_pixels(&b.pixels(0)?),
            Primitive::Text => {
                canvas.draw_text(b.number(0)?, b.number(1)?, &b.text(2)?, b.style(3)?)
            }
        },
        Operation::Apply(t) => match t {
            TransformOp::Translate => canvas.translate(b.number(0)?, b.number(1)?),
            TransformOp::Scale => canvas.scale(b.number(0)?),
            TransformOp::Rotate => canvas.rotate(b.number(0)?),
            TransformOp::Transform => canvas.transform(b.number(0)?, b.number(1)?, b.number(2)?),
        },
        Operation::Undo(t) => match t {
            TransformOp::Translate => canvas.reverse_translate(b.number(0)?, b.number(1)?),
            TransformOp::Scale => canvas.reverse_scale(b.number(0)?),
            TransformOp::Rotate => canvas.reverse_rotate(b.number(0)?),
            TransformOp::Transform => {
                canvas.reverse_transform(b.number(0)?, b.number(1)?, b.number(2)?)
            }
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/bind.rs"]
mod tests;
