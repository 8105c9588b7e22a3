use egui::RichText;
use egui_plot::{Line, Plot, PlotPoints};

const WINDOW: usize = 300;

/// Snake length per poll tick for the current game.
pub struct ScorePanel {
    length: Vec<[f64; 2]>,
    x: f64,
}

impl ScorePanel {
    pub fn new() -> Self {
        Self {
            length: Vec::new(),
            x: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.length.clear();
        self.x = 0.0;
    }

    pub fn push(&mut self, length: usize) {
        self.x += 1.0;
        self.length.push([self.x, length as f64]);
        if self.length.len() > WINDOW {
            let drop_count = self.length.len() - WINDOW;
            self.length.drain(0..drop_count);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.length.len()
    }

    pub fn ui(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Length").heading());
        Plot::new("snake_length")
            .width(ui.available_width().max(200.0))
            .height(110.0)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                let points = PlotPoints::new(self.length.clone());
                plot_ui.line(Line::new(points).name("length"));
            });
    }
}
