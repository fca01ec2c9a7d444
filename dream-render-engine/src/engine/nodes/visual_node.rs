use bevy::color::Srgba;
use bevy::math::Vec3;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// How the external data layer asks a node to be shown. The engine still
/// walks the fallback chain when the preferred source is missing; an absent
/// or unrecognised kind walks it from the image URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationKind {
    Icon,
    #[serde(alias = "sphere-fallback")]
    Sphere,
    #[default]
    #[serde(other)]
    Image,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl NodePosition {
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.to_vec3().is_finite()
    }
}

/// Node descriptor owned by the external data layer (camelCase JSON).
///
/// Only `id` and `position` are required. A malformed optional field reads
/// as its default instead of rejecting the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualNode {
    pub id: String,
    pub position: NodePosition,
    /// Hex colour, `#rrggbb` or `#rgb`.
    #[serde(default = "default_color", deserialize_with = "lenient_color")]
    pub color: String,
    /// Percent, clamped to `[0, 100]` when written into the store.
    #[serde(default, deserialize_with = "lenient")]
    pub progress: f32,
    #[serde(default, deserialize_with = "lenient")]
    pub visualization_kind: VisualizationKind,
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub glyph: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient")]
    pub is_main_goal: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub selected: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub hovered: bool,
}

fn default_color() -> String {
    "#9fb4ff".to_string()
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_color<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(color) => color,
        _ => default_color(),
    })
}

impl VisualNode {
    pub fn new(id: impl Into<String>, position: Vec3) -> Self {
        Self {
            id: id.into(),
            position: NodePosition {
                x: position.x,
                y: position.y,
                z: position.z,
            },
            color: default_color(),
            progress: 0.0,
            visualization_kind: VisualizationKind::default(),
            image_url: None,
            glyph: None,
            category: String::new(),
            is_main_goal: false,
            selected: false,
            hovered: false,
        }
    }

    pub fn translation(&self) -> Vec3 {
        self.position.to_vec3()
    }

    /// Linear RGB of `color`; malformed hex falls back to white.
    pub fn linear_rgb(&self) -> Vec3 {
        match Srgba::hex(self.color.trim()) {
            Ok(srgba) => {
                let linear = bevy::color::LinearRgba::from(srgba);
                Vec3::new(linear.red, linear.green, linear.blue)
            }
            Err(_) => Vec3::ONE,
        }
    }

    pub fn is_focused(&self) -> bool {
        self.hovered || self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_contract_round_trips() {
        let json = r##"{
            "id": "goal-1",
            "position": { "x": 1.0, "y": 0.0, "z": -2.0 },
            "color": "#ff8800",
            "progress": 42,
            "visualizationKind": "icon",
            "glyph": "🌙",
            "category": "health",
            "isMainGoal": true,
            "selected": false,
            "hovered": true
        }"##;
        let node: VisualNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.visualization_kind, VisualizationKind::Icon);
        assert_eq!(node.translation(), Vec3::new(1.0, 0.0, -2.0));
        assert!(node.is_main_goal && node.is_focused());

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["isMainGoal"], true);
        assert_eq!(value["visualizationKind"], "icon");
    }

    #[test]
    fn optional_fields_default() {
        let node: VisualNode =
            serde_json::from_str(r#"{ "id": "a", "position": { "x": 0, "y": 0, "z": 0 } }"#)
                .unwrap();
        assert_eq!(node.visualization_kind, VisualizationKind::Image);
        assert_eq!(node.image_url, None);
        assert_eq!(node.progress, 0.0);

        let kind: VisualizationKind = serde_json::from_str(r#""sphere-fallback""#).unwrap();
        assert_eq!(kind, VisualizationKind::Sphere);
    }

    #[test]
    fn malformed_optional_fields_read_as_defaults() {
        let json = r#"{
            "id": "b",
            "position": { "x": 1, "y": 2, "z": 3 },
            "color": 7,
            "progress": "50",
            "visualizationKind": "video",
            "glyph": ["not", "a", "string"],
            "isMainGoal": "yes"
        }"#;
        let node: VisualNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.id, "b");
        assert_eq!(node.translation(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(node.color, default_color());
        assert_eq!(node.progress, 0.0);
        assert_eq!(node.visualization_kind, VisualizationKind::Image);
        assert_eq!(node.glyph, None);
        assert!(!node.is_main_goal);
    }

    #[test]
    fn id_and_position_stay_required() {
        assert!(serde_json::from_str::<VisualNode>(r#"{ "id": "a" }"#).is_err());
        assert!(
            serde_json::from_str::<VisualNode>(r#"{ "id": "a", "position": "here" }"#).is_err()
        );
    }

    #[test]
    fn bad_colour_falls_back_to_white() {
        let mut node = VisualNode::new("a", Vec3::ZERO);
        node.color = "not a colour".into();
        assert_eq!(node.linear_rgb(), Vec3::ONE);
        node.color = "#000000".into();
        assert_eq!(node.linear_rgb(), Vec3::ZERO);
    }
}
