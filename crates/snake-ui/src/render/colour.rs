use egui::Color32;

/// Parse a CSS-style colour: `#rgb`, `#rrggbb`, `#rrggbbaa` or a basic name.
pub fn parse_colour(raw: &str) -> Option<Color32> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix('#') {
        return parse_hex(hex);
    }
    let colour = match raw.to_lowercase().as_str() {
        "black" => Color32::BLACK,
        "white" => Color32::WHITE,
        "red" => Color32::from_rgb(255, 0, 0),
        "green" => Color32::from_rgb(0, 128, 0),
        "lime" => Color32::from_rgb(0, 255, 0),
        "blue" => Color32::from_rgb(0, 0, 255),
        "yellow" => Color32::from_rgb(255, 255, 0),
        "orange" => Color32::from_rgb(255, 165, 0),
        "purple" => Color32::from_rgb(128, 0, 128),
        "gray" | "grey" => Color32::from_rgb(128, 128, 128),
        "transparent" => Color32::TRANSPARENT,
        _ => return None,
    };
    Some(colour)
}

fn parse_hex(hex: &str) -> Option<Color32> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                let v = c.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some(Color32::from_rgb(rgb[0], rgb[1], rgb[2]))
        }
        6 => Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        assert_eq!(parse_colour("#ff8800"), Some(Color32::from_rgb(255, 136, 0)));
        assert_eq!(parse_colour("#f80"), Some(Color32::from_rgb(255, 136, 0)));
        assert_eq!(parse_colour(" #00FF00 "), Some(Color32::from_rgb(0, 255, 0)));
        assert_eq!(
            parse_colour("#000000ff"),
            Some(Color32::from_rgba_unmultiplied(0, 0, 0, 255))
        );
    }

    #[test]
    fn names_and_garbage() {
        assert_eq!(parse_colour("Red"), Some(Color32::from_rgb(255, 0, 0)));
        assert_eq!(parse_colour("#12"), None);
        assert_eq!(parse_colour("#gggggg"), None);
        assert_eq!(parse_colour("chartreuse-ish"), None);
    }
}
