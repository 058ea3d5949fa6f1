use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::math::Vector2;
use crate::utils::Color;

/// The initial configuration of a `RayHandler`. Every field could still be changed
/// through the setters of the handler afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    pub culling: bool,
    pub shadows: bool,
    pub blur: bool,
    /// Number of blur iterations. Anything above 3 is rarely worth the fill rate.
    pub blur_num: u32,
    /// The ambient light. Its alpha is the darkness of the shadows.
    pub ambient: Color,
    /// Composites the light map over the scene at the end of `render`. Disable it to
    /// sample the light map texture in a custom shader instead.
    pub light_map_rendering: bool,
    /// Dimensions of the light map. Defaults to a quarter of the screen.
    pub target_size: Option<Vector2<u32>>,
}

impl Default for LightingSettings {
    fn default() -> Self {
        LightingSettings {
            culling: true,
            shadows: true,
            blur: true,
            blur_num: 1,
            ambient: Color::transparent(),
            light_map_rendering: true,
            target_size: None,
        }
    }
}

impl LightingSettings {
    /// Parses settings from JSON, missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings = serde_json::from_str(json).context("Invalid lighting settings.")?;
        Ok(settings)
    }

    /// The light map dimensions used on a screen of `screen`.
    pub fn target_dimensions(&self, screen: Vector2<u32>) -> Vector2<u32> {
        self.target_size
            .unwrap_or_else(|| Vector2::new((screen.x / 4).max(1), (screen.y / 4).max(1)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_json() {
        let settings = LightingSettings::from_json(
            r#"{ "blur_num": 3, "shadows": false, "target_size": { "x": 128, "y": 64 } }"#,
        )
        .unwrap();

        assert_eq!(settings.blur_num, 3);
        assert!(!settings.shadows);
        assert!(settings.blur);
        assert_eq!(
            settings.target_dimensions(Vector2::new(800, 600)),
            Vector2::new(128, 64)
        );

        assert!(LightingSettings::from_json("{ \"blur_num\": -1 }").is_err());
    }

    #[test]
    fn quarter_of_screen() {
        let settings = LightingSettings::default();
        assert_eq!(
            settings.target_dimensions(Vector2::new(800, 600)),
            Vector2::new(200, 150)
        );

        assert_eq!(
            settings.target_dimensions(Vector2::new(2, 2)),
            Vector2::new(1, 1)
        );
    }
}
