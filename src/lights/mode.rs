use serde::{Deserialize, Serialize};

/// The gamma correction exponent applied to light distances and colors.
pub const GAMMA_COR: f32 = 0.625;

/// Selects the compositing algorithm of every handler and light built with it.
///
/// It is constructed once at start-up and shared through `Rc`. Lights cache values
/// derived from it, so a handler and its lights must agree on the same mode.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingMode {
    /// Lights are rendered in gamma space for a more natural falloff.
    pub gamma_correction: bool,
    /// The light map multiplies the scene instead of darkening it by the ambient
    /// alpha. Usually gives more realistic colors.
    pub diffuse: bool,
}

impl LightingMode {
    #[inline]
    pub fn new(gamma_correction: bool, diffuse: bool) -> Self {
        LightingMode {
            gamma_correction,
            diffuse,
        }
    }

    /// Returns `GAMMA_COR` with gamma correction, and 1 otherwise.
    #[inline]
    pub fn gamma_correction_parameter(&self) -> f32 {
        if self.gamma_correction {
            GAMMA_COR
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parameter() {
        assert_eq!(LightingMode::default().gamma_correction_parameter(), 1.0);
        assert_eq!(
            LightingMode::new(true, false).gamma_correction_parameter(),
            GAMMA_COR
        );
    }

    #[test]
    fn deserialize() {
        let mode: LightingMode = serde_json::from_str(r#"{ "diffuse": true }"#).unwrap();
        assert_eq!(mode, LightingMode::new(false, true));
    }
}
