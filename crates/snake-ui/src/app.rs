use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};
use tracing::{info, warn};

use snake_core::Direction;

use crate::bridge::SnakeBridge;
use crate::config::{
    board_height, parse_json, AttributeConfig, CanvasConfig, UiSettings, ATTRIBUTES_FILE,
    CANVAS_FILE,
};
use crate::error::{BridgeError, ClientError};
use crate::input::InputHandler;
use crate::panels::score::ScorePanel;
use crate::poll::PollTimer;
use crate::render::{build_layers, parse_colour, Canvas, Layers, PainterCanvas, Rasterizer};

const CANVAS_BG: Color32 = Color32::from_rgb(11, 25, 48);

/// Strip whitespace and lowercase.
pub fn sanitize_username(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Updated,
    GameOver,
}

/// Everything the window shows, driven through the bridge. Holds no game
/// rules of its own.
pub struct GameClient {
    bridge: Box<dyn SnakeBridge>,
    canvas_px: [f32; 2],
    raster: Option<Rasterizer>,
    attributes: AttributeConfig,
    grid_colour: Option<Color32>,
    layers: Layers,
    timer: PollTimer,
    username: String,
    current_score: Option<usize>,
    high_score: Option<u32>,
    game_over: bool,
    history: ScorePanel,
}

impl GameClient {
    pub fn new(bridge: Box<dyn SnakeBridge>, settings: &UiSettings) -> Self {
        Self {
            bridge,
            canvas_px: settings.canvas_px,
            raster: None,
            attributes: AttributeConfig::default(),
            grid_colour: None,
            layers: Layers::default(),
            timer: PollTimer::new(settings.poll_interval),
            username: String::new(),
            current_score: None,
            high_score: None,
            game_over: false,
            history: ScorePanel::new(),
        }
    }

    /// Start (or restart) a game: size the board from `canvas.json`, open
    /// the backend game, load drawing attributes, draw once and start polling.
    pub fn begin(&mut self, now: Instant) -> Result<(), ClientError> {
        self.timer.stop();
        self.layers = Layers::default();

        let canvas: CanvasConfig = parse_json(self.bridge.as_mut(), &CANVAS_FILE)?;
        let width = canvas.board_width()?;
        let height = board_height(width, self.canvas_px[0], self.canvas_px[1]);
        self.bridge.snake_begin(width, height)?;
        self.raster = Some(Rasterizer::new(width, height));
        self.game_over = false;
        self.history.reset();
        info!(width, height, "board ready");

        self.attributes = parse_json(self.bridge.as_mut(), &ATTRIBUTES_FILE)?;
        self.grid_colour = self.attributes.grid_colour().and_then(parse_colour);
        self.render()?;
        self.timer.start(now);
        Ok(())
    }

    /// Run one poll tick if the timer is due. A closed bridge stops polling.
    pub fn tick(&mut self, now: Instant) -> Result<TickOutcome, ClientError> {
        if !self.timer.due(now) {
            return Ok(TickOutcome::Idle);
        }
        let outcome = self.poll_backend();
        if let Err(ClientError::Bridge(BridgeError::Closed)) = &outcome {
            warn!("backend gone, polling stopped");
            self.timer.stop();
        }
        outcome
    }

    fn poll_backend(&mut self) -> Result<TickOutcome, ClientError> {
        self.bridge.snake_update(&self.username)?;
        if self.bridge.snake_is_game_over()? {
            self.timer.stop();
            self.game_over = true;
            info!(score = ?self.current_score, "game over");
            return Ok(TickOutcome::GameOver);
        }
        self.refresh_current_score()?;
        self.refresh_high_score()?;
        self.render()?;
        Ok(TickOutcome::Updated)
    }

    /// Fetch objects and group attributes and rebuild the draw layers.
    pub fn render(&mut self) -> Result<(), ClientError> {
        let objects = self.bridge.get_objects()?;
        let remote = self.bridge.get_attributes()?;
        self.layers = build_layers(&objects, &self.attributes, &remote);
        Ok(())
    }

    /// Paint the cached layers.
    pub fn paint(&self, canvas: &mut dyn Canvas) {
        match self.raster {
            Some(raster) => raster.render_frame(canvas, &self.layers, self.grid_colour),
            None => canvas.clear(),
        }
    }

    /// The arrow buttons and the board keys both end up here.
    pub fn press(&mut self, direction: Direction) -> Result<(), ClientError> {
        self.bridge.snake_turn(direction)?;
        Ok(())
    }

    /// Store a sanitized username and return it for the text field.
    pub fn submit_username(&mut self, raw: &str) -> Result<String, ClientError> {
        self.username = sanitize_username(raw);
        self.refresh_high_score()?;
        Ok(self.username.clone())
    }

    #[cfg(test)]
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn current_score(&self) -> Option<usize> {
        self.current_score
    }

    pub fn high_score(&self) -> Option<u32> {
        self.high_score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_polling(&self) -> bool {
        self.timer.is_running()
    }

    #[cfg(test)]
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub fn history(&self) -> &ScorePanel {
        &self.history
    }

    pub fn next_poll_in(&self, now: Instant) -> Option<Duration> {
        self.timer.time_until_due(now)
    }

    fn refresh_current_score(&mut self) -> Result<(), ClientError> {
        let length = self.bridge.snake_length()?;
        self.current_score = Some(length);
        self.history.push(length);
        Ok(())
    }

    fn refresh_high_score(&mut self) -> Result<(), ClientError> {
        self.high_score = Some(self.bridge.get_user_high_score(&self.username)?);
        Ok(())
    }
}

/// eframe shell around [`GameClient`].
pub struct SnakeApp {
    client: GameClient,
    username_input: String,
    username_focused: bool,
    last_error: Option<String>,
}

impl SnakeApp {
    pub fn new(client: GameClient) -> Self {
        let mut app = Self {
            client,
            username_input: String::new(),
            username_focused: false,
            last_error: None,
        };
        app.begin();
        app
    }

    fn begin(&mut self) {
        let result = self.client.begin(Instant::now());
        self.report(result);
    }

    fn report<T>(&mut self, result: Result<T, ClientError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%err, "bridge call failed");
                self.last_error = Some(err.to_string());
                None
            }
        }
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        for direction in InputHandler::poll(ctx, self.username_focused) {
            let result = self.client.press(direction);
            self.report(result);
        }
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Username");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.username_input).desired_width(160.0),
            );
            self.username_focused = response.has_focus();
            let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Submit").clicked() || entered {
                let result = self.client.submit_username(&self.username_input);
                if let Some(clean) = self.report(result) {
                    self.username_input = clean;
                }
            }
            ui.separator();
            if ui.button("Restart").clicked() {
                self.begin();
            }
            ui.separator();
            ui.label(format!("Score: {}", score_text(self.client.current_score())));
            ui.label(format!("High score: {}", score_text(self.client.high_score())));
        });
    }

    fn arrow_buttons(&mut self, ui: &mut egui::Ui) {
        let mut pressed = None;
        ui.vertical_centered(|ui| {
            if ui.button("⬆").clicked() {
                pressed = Some(Direction::Up);
            }
            ui.horizontal(|ui| {
                if ui.button("⬅").clicked() {
                    pressed = Some(Direction::Left);
                }
                if ui.button("⬇").clicked() {
                    pressed = Some(Direction::Down);
                }
                if ui.button("➡").clicked() {
                    pressed = Some(Direction::Right);
                }
            });
        });
        if let Some(direction) = pressed {
            let result = self.client.press(direction);
            self.report(result);
        }
    }
}

fn score_text<T: std::fmt::Display>(score: Option<T>) -> String {
    score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
}

impl eframe::App for SnakeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);

        let now = Instant::now();
        let result = self.client.tick(now);
        if self.report(result).is_some_and(|outcome| outcome == TickOutcome::Updated) {
            self.last_error = None;
        }

        egui::TopBottomPanel::top("top_controls").show(ctx, |ui| self.top_bar(ui));

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.client.is_game_over() {
                    ui.label(RichText::new("Game over").color(Color32::from_rgb(235, 88, 88)));
                } else if self.client.is_polling() {
                    ui.label(RichText::new("Running").color(Color32::GREEN));
                }
                if let Some(err) = &self.last_error {
                    ui.separator();
                    ui.label(RichText::new(err).color(Color32::from_rgb(255, 120, 120)));
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                let size = egui::vec2(self.client.canvas_px[0], self.client.canvas_px[1]);
                let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
                let mut canvas = PainterCanvas::new(&painter, response.rect, CANVAS_BG);
                self.client.paint(&mut canvas);
            });
            ui.add_space(8.0);
            self.arrow_buttons(ui);
            ui.add_space(8.0);
            self.client.history().ui(ui);
        });

        if let Some(wait) = self.client.next_poll_in(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}
