use egui::{Key, Modifiers};
use snake_core::Direction;

/// Keys the board listens to; pressing one presses the matching arrow button.
const BOARD_KEYS: [Key; 8] = [
    Key::ArrowUp,
    Key::ArrowDown,
    Key::ArrowLeft,
    Key::ArrowRight,
    Key::W,
    Key::A,
    Key::S,
    Key::D,
];

/// Translate a key name (`"ArrowUp"`, `"w"`, ...) into a direction.
pub fn translate_key(name: &str) -> Option<Direction> {
    let key = name.to_lowercase();
    if let Some(rest) = key.strip_prefix("arrow") {
        return Direction::from_name(rest);
    }
    match key.as_str() {
        "w" => Some(Direction::Up),
        "a" => Some(Direction::Left),
        "s" => Some(Direction::Down),
        "d" => Some(Direction::Right),
        _ => None,
    }
}

pub fn key_name(key: Key) -> &'static str {
    match key {
        Key::ArrowUp => "ArrowUp",
        Key::ArrowDown => "ArrowDown",
        Key::ArrowLeft => "ArrowLeft",
        Key::ArrowRight => "ArrowRight",
        other => other.name(),
    }
}

pub struct InputHandler;

impl InputHandler {
    /// Directions pressed this frame. Nothing is read while a text field
    /// has focus. Matched keys are consumed so egui does not also use the
    /// arrows for focus navigation.
    pub fn poll(ctx: &egui::Context, text_focused: bool) -> Vec<Direction> {
        if text_focused {
            return Vec::new();
        }
        ctx.input_mut(|input| {
            BOARD_KEYS
                .iter()
                .filter(|key| input.consume_key(Modifiers::NONE, **key))
                .filter_map(|key| translate_key(key_name(*key)))
                .collect()
        })
    }
}
