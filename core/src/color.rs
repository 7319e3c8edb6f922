use serde::{Deserialize, Serialize};

const VISIBLE_MIN_NM: f64 = 380.0;
const VISIBLE_MAX_NM: f64 = 780.0;
const DISPLAY_GAMMA: f64 = 0.8;

/// Perceptual RGB colour of monochromatic light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpectralColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl SpectralColor {
    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Maps a wavelength in nanometres to its perceived colour.
    ///
    /// Wavelengths outside the visible band, and NaN, map to black. Intensity
    /// rolls off toward both ends of the band where the eye loses sensitivity.
    #[must_use]
    pub fn from_wavelength(nanometres: f64) -> Self {
        if !(VISIBLE_MIN_NM..=VISIBLE_MAX_NM).contains(&nanometres) {
            return Self::from_rgb(0, 0, 0);
        }

        let nm = nanometres;
        let (red, green, blue) = if nm < 440.0 {
            ((440.0 - nm) / (440.0 - 380.0), 0.0, 1.0)
        } else if nm < 490.0 {
            (0.0, (nm - 440.0) / (490.0 - 440.0), 1.0)
        } else if nm < 510.0 {
            (0.0, 1.0, (510.0 - nm) / (510.0 - 490.0))
        } else if nm < 580.0 {
            ((nm - 510.0) / (580.0 - 510.0), 1.0, 0.0)
        } else if nm < 645.0 {
            (1.0, (645.0 - nm) / (645.0 - 580.0), 0.0)
        } else {
            (1.0, 0.0, 0.0)
        };

        let falloff = if nm < 420.0 {
            0.3 + 0.7 * (nm - 380.0) / (420.0 - 380.0)
        } else if nm <= 700.0 {
            1.0
        } else {
            0.3 + 0.7 * (780.0 - nm) / (780.0 - 700.0)
        };

        Self::from_rgb(
            channel(red, falloff),
            channel(green, falloff),
            channel(blue, falloff),
        )
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

fn channel(level: f64, falloff: f64) -> u8 {
    if level <= 0.0 {
        return 0;
    }
    let scaled = 255.0 * (level * falloff).clamp(0.0, 1.0).powf(DISPLAY_GAMMA);
    scaled.round().clamp(0.0, 255.0) as u8
}
