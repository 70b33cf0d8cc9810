use crate::canvas::backend::{Canvas, Style, invertible_scale};
use crate::foundation::core::{Affine, Color, Point, Vec2};
use crate::foundation::error::{GagError, GagResult};

/// One canvas call as received.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum CanvasCall {
    Fill {
        color: Color,
    },
    DrawRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(flatten)]
        style: Style,
    },
    DrawCircle {
        center: Point,
        radius: f64,
        #[serde(flatten)]
        style: Style,
    },
    DrawPolygon {
        points: Vec<Point>,
        #[serde(flatten)]
        style: Style,
    },
    DrawPixel {
        x: f64,
        y: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
    },
    DrawText {
        x: f64,
        y: f64,
        text: String,
        #[serde(flatten)]
        style: Style,
    },
    Translate {
        x: f64,
        y: f64,
    },
    ReverseTranslate {
        x: f64,
        y: f64,
    },
    Scale {
        amount: f64,
    },
    ReverseScale {
        amount: f64,
    },
    Rotate {
        angle: f64,
    },
    ReverseRotate {
        angle: f64,
    },
    Transform {
        translate_x: f64,
        translate_y: f64,
        scale: f64,
    },
    ReverseTransform {
        translate_x: f64,
        translate_y: f64,
        scale: f64,
    },
}

impl CanvasCall {
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::Fill { .. }
                | Self::DrawRect { .. }
                | Self::DrawCircle { .. }
                | Self::DrawPolygon { .. }
                | Self::DrawPixel { .. }
                | Self::DrawText { .. }
        )
    }
}

/// A call together with the current transform right after it ran.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RecordedCall {
    #[serde(flatten)]
    pub call: CanvasCall,
    /// `kurbo` affine coefficients `[a, b, c, d, e, f]`.
    pub ctm: [f64; 6],
}

/// A [`Canvas`] that draws nothing and records every call.
///
/// The current transform is tracked exactly like a cairo context: every transform
/// post-multiplies the current matrix.
#[derive(Clone, Debug)]
pub struct RecordingCanvas {
    ctm: Affine,
    calls: Vec<RecordedCall>,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self {
            ctm: Affine::IDENTITY,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<RecordedCall> {
        self.calls
    }

    /// Draw calls only, in order.
    pub fn draws(&self) -> impl Iterator<Item = &CanvasCall> {
        self.calls.iter().map(|c| &c.call).filter(|c| c.is_draw())
    }

    pub fn current_transform(&self) -> Affine {
        self.ctm
    }

    /// Whether the current transform is the identity within `eps` per coefficient.
    pub fn is_identity(&self, eps: f64) -> bool {
        self.ctm
            .as_coeffs()
            .iter()
            .zip(Affine::IDENTITY.as_coeffs())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    fn record(&mut self, call: CanvasCall) {
        self.calls.push(RecordedCall {
            call,
            ctm: self.ctm.as_coeffs(),
        });
    }

    fn concat(&mut self, m: Affine) {
        self.ctm *= m;
    }
}

impl Canvas for RecordingCanvas {
    fn fill(&mut self, color: Color) -> GagResult<()> {
        self.record(CanvasCall::Fill { color });
        Ok(())
    }

    fn draw_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: Style,
    ) -> GagResult<()> {
        self.record(CanvasCall::DrawRect {
            x,
            y,
            width,
            height,
            style,
        });
        Ok(())
    }

    fn draw_circle(&mut self, center: Point, radius: f64, style: Style) -> GagResult<()> {
        self.record(CanvasCall::DrawCircle {
            center,
            radius,
            style,
        });
        Ok(())
    }

    fn draw_polygon(&mut self, points: &[Point], style: Style) -> GagResult<()> {
        if points.len() < 3 {
            return Err(GagError::evaluation(format!(
                "polygons need at least three points, got {}",
                points.len()
            )));
        }
        self.record(CanvasCall::DrawPolygon {
            points: points.to_vec(),
            style,
        });
        Ok(())
    }

    fn draw_pixel(&mut self, x: f64, y: f64, color: Option<Color>) -> GagResult<()> {
        self.record(CanvasCall::DrawPixel { x, y, color });
        Ok(())
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, style: Style) -> GagResult<()> {
        self.record(CanvasCall::DrawText {
            x,
            y,
            text: text.to_owned(),
            style,
        });
        Ok(())
    }

    fn translate(&mut self, x: f64, y: f64) -> GagResult<()> {
        self.concat(Affine::translate(Vec2::new(x, y)));
        self.record(CanvasCall::Translate { x, y });
        Ok(())
    }

    fn reverse_translate(&mut self, x: f64, y: f64) -> GagResult<()> {
        self.concat(Affine::translate(Vec2::new(-x, -y)));
        self.record(CanvasCall::ReverseTranslate { x, y });
        Ok(())
    }

    fn scale(&mut self, amount: f64) -> GagResult<()> {
        self.concat(Affine::scale(invertible_scale(amount)?));
        self.record(CanvasCall::Scale { amount });
        Ok(())
    }

    fn reverse_scale(&mut self, amount: f64) -> GagResult<()> {
        self.concat(Affine::scale(1.0 / invertible_scale(amount)?));
        self.record(CanvasCall::ReverseScale { amount });
        Ok(())
    }

    fn rotate(&mut self, angle: f64) -> GagResult<()> {
        self.concat(Affine::rotate(angle.to_radians()));
        self.record(CanvasCall::Rotate { angle });
        Ok(())
    }

    fn reverse_rotate(&mut self, angle: f64) -> GagResult<()> {
        self.concat(Affine::rotate(-angle.to_radians()));
        self.record(CanvasCall::ReverseRotate { angle });
        Ok(())
    }

    fn transform(&mut self, translate_x: f64, translate_y: f64, scale: f64) -> GagResult<()> {
        let scale_by = invertible_scale(scale)?;
        self.concat(Affine::translate(Vec2::new(translate_x, translate_y)));
        self.concat(Affine::scale(scale_by));
        self.record(CanvasCall::Transform {
            translate_x,
            translate_y,
            scale,
        });
        Ok(())
    }

    fn reverse_transform(
        &mut self,
        translate_x: f64,
        translate_y: f64,
        scale: f64,
    ) -> GagResult<()> {
        self.concat(Affine::scale(1.0 / invertible_scale(scale)?));
        self.concat(Affine::translate(Vec2::new(-translate_x, -translate_y)));
        self.record(CanvasCall::ReverseTransform {
            translate_x,
            translate_y,
            scale,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/recording.rs"]
mod tests;
