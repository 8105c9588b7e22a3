pub mod canvas;
pub mod colour;
pub mod layers;

use egui::Color32;

pub use canvas::{Canvas, PainterCanvas};
#[cfg(test)]
pub use canvas::{CanvasOp, RecordingCanvas};
pub use colour::parse_colour;
pub use layers::{build_layers, Layers};

/// Maps board cells onto a canvas of any pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rasterizer {
    pub board_w: usize,
    pub board_h: usize,
}

impl Rasterizer {
    pub fn new(board_w: usize, board_h: usize) -> Self {
        Self {
            board_w: board_w.max(1),
            board_h: board_h.max(1),
        }
    }

    pub fn cell_size(&self, canvas: &dyn Canvas) -> (f32, f32) {
        let (w, h) = canvas.size();
        (w / self.board_w as f32, h / self.board_h as f32)
    }

    /// Fill one `[row, col]` cell.
    pub fn draw(&self, canvas: &mut dyn Canvas, cell: [i64; 2], colour: Color32) {
        let [row, col] = cell;
        let (cw, ch) = self.cell_size(canvas);
        canvas.fill_rect(col as f32 * cw, row as f32 * ch, cw, ch, colour);
    }

    /// Interior grid lines only; the canvas edge is left unstroked.
    pub fn draw_grid(&self, canvas: &mut dyn Canvas, colour: Color32) {
        let (w, h) = canvas.size();
        let (cw, ch) = self.cell_size(canvas);
        for i in 1..self.board_w {
            let x = cw * i as f32;
            canvas.stroke_line((x, 0.0), (x, h), colour);
        }
        for j in 1..self.board_h {
            let y = ch * j as f32;
            canvas.stroke_line((0.0, y), (w, y), colour);
        }
    }

    /// Clear, paint layers from lowest to highest priority, then the grid.
    pub fn render_frame(&self, canvas: &mut dyn Canvas, layers: &Layers, grid: Option<Color32>) {
        canvas.clear();
        for (_, item) in layers.iter() {
            for cell in &item.body {
                self.draw(canvas, *cell, item.colour);
            }
        }
        if let Some(colour) = grid {
            self.draw_grid(canvas, colour);
        }
    }
}
