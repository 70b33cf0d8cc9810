use crate::foundation::core::{Color, Point};
use crate::foundation::error::{GagError, GagResult};

/// Optional fill and stroke colors of a drawn shape.
///
/// A shape with neither only contributes its path, which most canvases discard.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
}

impl Style {
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
        }
    }
}

/// One entry of a `draw_pixels` call.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PixelSpec {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// Check that a scale factor can be undone: finite and non-zero.
pub fn invertible_scale(amount: f64) -> GagResult<f64> {
    if amount == 0.0 || !amount.is_finite() {
        return Err(GagError::evaluation(format!(
            "scale by {amount} cannot be undone"
        )));
    }
    Ok(amount)
}

/// A 2D drawing surface with a current transform.
///
/// Transforms compose onto the current transform the way a cairo context does: each
/// call post-multiplies, so it applies to everything drawn afterwards in the
/// coordinate system established so far. The `reverse_*` methods undo their forward
/// counterpart when called with the same arguments; implementors only need to
/// override them when a cheaper exact inverse exists.
pub trait Canvas {
    /// Paint the whole surface with one color.
    fn fill(&mut self, color: Color) -> GagResult<()>;

    fn draw_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: Style,
    ) -> GagResult<()>;

    fn draw_circle(&mut self, center: Point, radius: f64, style: Style) -> GagResult<()>;

    /// Closed polygon through `points`; at least three are required.
    fn draw_polygon(&mut self, points: &[Point], style: Style) -> GagResult<()>;

    /// A single virtual pixel. `None` keeps the canvas' current color.
    fn draw_pixel(&mut self, x: f64, y: f64, color: Option<Color>) -> GagResult<()>;

    fn draw_pixels(&mut self, pixels: &[PixelSpec]) -> GagResult<()> {
        for p in pixels {
            self.draw_pixel(p.x, p.y, p.color)?;
        }
        Ok(())
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, style: Style) -> GagResult<()>;

    fn translate(&mut self, x: f64, y: f64) -> GagResult<()>;

    fn reverse_translate(&mut self, x: f64, y: f64) -> GagResult<()> {
        self.translate(-x, -y)
    }

    /// Uniform scale by `amount`.
    fn scale(&mut self, amount: f64) -> GagResult<()>;

    fn reverse_scale(&mut self, amount: f64) -> GagResult<()> {
        self.scale(1.0 / invertible_scale(amount)?)
    }

    /// Rotate by `angle` degrees.
    fn rotate(&mut self, angle: f64) -> GagResult<()>;

    fn reverse_rotate(&mut self, angle: f64) -> GagResult<()> {
        self.rotate(-angle)
    }

    /// Translate, then scale.
    fn transform(&mut self, translate_x: f64, translate_y: f64, scale: f64) -> GagResult<()> {
        self.translate(translate_x, translate_y)?;
        self.scale(scale)
    }

    fn reverse_transform(
        &mut self,
        translate_x: f64,
        translate_y: f64,
        scale: f64,
    ) -> GagResult<()> {
        self.reverse_scale(scale)?;
        self.reverse_translate(translate_x, translate_y)
    }
}
