use std::collections::BTreeMap;

use egui::Color32;
use serde_json::Value;
use tracing::debug;

use snake_core::scene::HIGHEST_PRIORITY_LEVEL;
use snake_core::{Attributes, PRIORITY_LEVEL};

use super::colour::parse_colour;
use crate::bridge::{GroupAttributes, Objects};
use crate::config::AttributeConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub name: String,
    pub colour: Color32,
    pub body: Vec<[i64; 2]>,
}

/// Drawable objects bucketed by priority level, lowest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layers {
    levels: BTreeMap<i64, Vec<DrawItem>>,
}

impl Layers {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &DrawItem)> {
        self.levels
            .iter()
            .flat_map(|(level, items)| items.iter().map(move |item| (*level, item)))
    }

    #[cfg(test)]
    pub fn levels(&self) -> impl Iterator<Item = i64> + '_ {
        self.levels.keys().copied()
    }
}

/// Split a trailing `-<number>` instance suffix: `snake-2` → (`snake`, 2).
pub fn split_name(name: &str) -> (&str, u32) {
    if let Some(idx) = name.rfind('-') {
        if let Ok(number) = name[idx + 1..].parse::<u32>() {
            return (&name[..idx], number);
        }
    }
    (name, 0)
}

/// Local attributes for the base name, overlaid by each of the object's
/// group attributes in order.
fn merged_attributes(
    name: &str,
    gids: &[String],
    local: &AttributeConfig,
    remote: &GroupAttributes,
) -> Attributes {
    let mut merged = local.entry(name).cloned().unwrap_or_default();
    for gid in gids {
        if let Some(group) = remote.get(gid) {
            merged.extend(group.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
    merged
}

pub fn build_layers(objects: &Objects, local: &AttributeConfig, remote: &GroupAttributes) -> Layers {
    let mut layers = Layers::default();
    for (uid, object) in objects {
        let (name, _number) = split_name(&object.name);
        let attributes = merged_attributes(name, &object.gid, local, remote);

        if attributes.get("name").and_then(Value::as_str) != Some(name) {
            continue;
        }
        let Some(colour) = attributes
            .get("colour")
            .and_then(Value::as_str)
            .and_then(parse_colour)
        else {
            debug!(uid = %uid, name, "object has no usable colour");
            continue;
        };
        let level = attributes
            .get(PRIORITY_LEVEL)
            .and_then(Value::as_i64)
            .unwrap_or(HIGHEST_PRIORITY_LEVEL);

        layers.levels.entry(level).or_default().push(DrawItem {
            name: name.to_string(),
            colour,
            body: object.body.clone(),
        });
    }
    layers
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use snake_core::SceneObject;

    use super::*;

    fn local() -> AttributeConfig {
        serde_json::from_value(json!({
            "name": {
                "snake": {"name": "snake", "colour": "#00ff00"},
                "food": {"name": "food", "colour": "#ff0000"},
                "wall": {"name": "not-wall", "colour": "#888888"},
                "grid": {"colour": "#222222"}
            }
        }))
        .unwrap()
    }

    fn object(name: &str, gid: &str, body: Vec<[i64; 2]>) -> SceneObject {
        SceneObject {
            gid: vec![gid.to_string()],
            name: name.to_string(),
            body,
            velocity: [0, 0],
        }
    }

    fn remote() -> GroupAttributes {
        serde_json::from_value(json!({
            "g-snake": {"priority-level": 10},
            "g-food": {"priority-level": 2},
            "g-wall": {"priority-level": 0}
        }))
        .unwrap()
    }

    #[test]
    fn instance_suffix_is_stripped() {
        assert_eq!(split_name("snake-2"), ("snake", 2));
        assert_eq!(split_name("snake"), ("snake", 0));
        assert_eq!(split_name("snake-game"), ("snake-game", 0));
        assert_eq!(split_name("big-snake-12"), ("big-snake", 12));
    }

    #[test]
    fn layers_sorted_numerically() {
        let objects: Objects = [
            ("u-1".to_string(), object("snake-1", "g-snake", vec![[1, 1]])),
            ("u-2".to_string(), object("food", "g-food", vec![[3, 3]])),
        ]
        .into();
        let layers = build_layers(&objects, &local(), &remote());

        // 2 before 10, not string order
        assert_eq!(layers.levels().collect::<Vec<_>>(), vec![2, 10]);
        let names: Vec<&str> = layers.iter().map(|(_, item)| item.name.as_str()).collect();
        assert_eq!(names, vec!["food", "snake"]);
    }

    #[test]
    fn mismatched_or_unknown_names_are_skipped() {
        let objects: Objects = [
            ("u-1".to_string(), object("wall", "g-wall", vec![[0, 0]])),
            ("u-2".to_string(), object("ghost", "g-wall", vec![[0, 1]])),
        ]
        .into();
        assert!(build_layers(&objects, &local(), &remote()).is_empty());
    }

    #[test]
    fn group_attributes_override_local() {
        let remote: GroupAttributes = serde_json::from_value(json!({
            "g-snake": {"priority-level": 1, "colour": "#0000ff"}
        }))
        .unwrap();
        let objects: Objects =
            [("u-1".to_string(), object("snake", "g-snake", vec![[0, 0]]))].into();
        let layers = build_layers(&objects, &local(), &remote);
        let (level, item) = layers.iter().next().unwrap();
        assert_eq!(level, 1);
        assert_eq!(item.colour, Color32::from_rgb(0, 0, 255));
    }

    #[test]
    fn missing_priority_draws_last() {
        let objects: Objects = [
            ("u-1".to_string(), object("snake", "g-none", vec![[0, 0]])),
            ("u-2".to_string(), object("food", "g-food", vec![[1, 1]])),
        ]
        .into();
        let layers = build_layers(&objects, &local(), &remote());
        assert_eq!(
            layers.levels().collect::<Vec<_>>(),
            vec![2, HIGHEST_PRIORITY_LEVEL]
        );
    }
}
