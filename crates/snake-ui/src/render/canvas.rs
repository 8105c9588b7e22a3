use egui::{Color32, Painter, Pos2, Rect, Stroke};

/// Minimal 2D drawing surface, in pixels from the top-left corner.
pub trait Canvas {
    fn size(&self) -> (f32, f32);
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Color32);
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), colour: Color32);
}

/// Canvas backed by an egui painter clipped to `rect`.
pub struct PainterCanvas<'a> {
    painter: &'a Painter,
    rect: Rect,
    background: Color32,
}

impl<'a> PainterCanvas<'a> {
    pub fn new(painter: &'a Painter, rect: Rect, background: Color32) -> Self {
        Self {
            painter,
            rect,
            background,
        }
    }

    fn at(&self, (x, y): (f32, f32)) -> Pos2 {
        self.rect.min + egui::vec2(x, y)
    }
}

impl Canvas for PainterCanvas<'_> {
    fn size(&self) -> (f32, f32) {
        (self.rect.width(), self.rect.height())
    }

    fn clear(&mut self) {
        self.painter.rect_filled(self.rect, 0.0, self.background);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Color32) {
        let rect = Rect::from_min_size(self.at((x, y)), egui::vec2(w, h));
        self.painter.rect_filled(rect, 0.0, colour);
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), colour: Color32) {
        self.painter
            .line_segment([self.at(from), self.at(to)], Stroke::new(1.0, colour));
    }
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Clear,
    Fill { x: f32, y: f32, w: f32, h: f32, colour: Color32 },
    Line { from: (f32, f32), to: (f32, f32), colour: Color32 },
}

/// Records draw calls instead of painting them.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    pub width: f32,
    pub height: f32,
    pub ops: Vec<CanvasOp>,
}

#[cfg(test)]
impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn fills(&self) -> impl Iterator<Item = &CanvasOp> {
        self.ops.iter().filter(|op| matches!(op, CanvasOp::Fill { .. }))
    }

    pub fn lines(&self) -> impl Iterator<Item = &CanvasOp> {
        self.ops.iter().filter(|op| matches!(op, CanvasOp::Line { .. }))
    }
}

#[cfg(test)]
impl Canvas for RecordingCanvas {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.ops.push(CanvasOp::Clear);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Color32) {
        self.ops.push(CanvasOp::Fill { x, y, w, h, colour });
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), colour: Color32) {
        self.ops.push(CanvasOp::Line { from, to, colour });
    }
}
