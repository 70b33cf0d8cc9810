//! Static name tables for the built-in operations.
//!
//! Sub-invocation names resolve in priority order: primitives, then transforms, then
//! the command table.

/// Drawing primitives a document can invoke by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Rect,
    Circle,
    Polygon,
    Pixel,
    Pixels,
    Text,
}

impl Primitive {
    pub const ALL: [Self; 6] = [
        Self::Rect,
        Self::Circle,
        Self::Polygon,
        Self::Pixel,
        Self::Pixels,
        Self::Text,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Name used in documents.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Polygon => "polygon",
            Self::Pixel => "pixel",
            Self::Pixels => "pixels",
            Self::Text => "text",
        }
    }

    /// Name of the canvas operation it dispatches to.
    pub fn canvas_op(self) -> &'static str {
        match self {
            Self::Rect => "draw_rect",
            Self::Circle => "draw_circle",
            Self::Polygon => "draw_polygon",
            Self::Pixel => "draw_pixel",
            Self::Pixels => "draw_pixels",
            Self::Text => "draw_text",
        }
    }
}

/// Geometric transforms, each with an exact inverse.
///
/// `Transform` is the combined translate+scale a command reference applies around its
/// descent; documents cannot invoke it by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformOp {
    Scale,
    Translate,
    Rotate,
    Transform,
}

impl TransformOp {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "scale" => Some(Self::Scale),
            "translate" => Some(Self::Translate),
            "rotate" => Some(Self::Rotate),
            _ => None,
        }
    }

    pub fn canvas_op(self) -> &'static str {
        match self {
            Self::Scale => "scale",
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Transform => "transform",
        }
    }

    pub fn reverse_canvas_op(self) -> &'static str {
        match self {
            Self::Scale => "reverse_scale",
            Self::Translate => "reverse_translate",
            Self::Rotate => "reverse_rotate",
            Self::Transform => "reverse_transform",
        }
    }
}

/// A concrete canvas operation carried by an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Draw(Primitive),
    Apply(TransformOp),
    Undo(TransformOp),
}

impl Operation {
    /// Canvas method name, e.g. `draw_rect` or `reverse_scale`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Draw(p) => p.canvas_op(),
            Self::Apply(t) => t.canvas_op(),
            Self::Undo(t) => t.reverse_canvas_op(),
        }
    }

    /// The operation that cancels this one. Draws have none.
    pub fn inverse(self) -> Option<Self> {
        match self {
            Self::Draw(_) => None,
            Self::Apply(t) => Some(Self::Undo(t)),
            Self::Undo(t) => Some(Self::Apply(t)),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl serde::Serialize for Operation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// What a built-in sub-invocation name stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Primitive(Primitive),
    Transform(TransformOp),
}

/// Resolve a sub-invocation name against the built-in tables.
pub fn builtin(name: &str) -> Option<Builtin> {
    if let Some(p) = Primitive::from_name(name) {
        return Some(Builtin::Primitive(p));
    }
    TransformOp::from_name(name).map(Builtin::Transform)
}
