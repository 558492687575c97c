use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// RGB triple in normalised `[0, 1]` space.
pub type Rgb = [f32; 3];

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML settings: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse JSON settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to serialise settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("unsupported settings format '{0}'; expected .toml or .json")]
    UnsupportedFormat(String),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub title: String,
    pub window: WindowSettings,
    pub palette: Palette,
    pub gradient: GradientSettings,
    pub camera: CameraSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    pub antialias: AntialiasSetting,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Palette {
    pub colors: [Rgb; 6],
    pub dark: Rgb,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GradientSettings {
    pub speed: f32,
    pub intensity: f32,
    pub gradient_size: f32,
    pub grain_intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov: f32,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    /// MSAA sample count, or `None` when the renderer should pick one.
    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

impl fmt::Display for AntialiasSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.samples() {
            None => f.write_str("auto"),
            Some(1) => f.write_str("off"),
            Some(count) => write!(f, "{count}"),
        }
    }
}

impl Serialize for AntialiasSetting {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AntialiasSetting {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Str(String),
            Num(i64),
        }

        match Helper::deserialize(deserializer)? {
            Helper::Str(raw) => parse_antialias(&raw).map_err(de::Error::custom),
            Helper::Num(value) => {
                if value < 0 {
                    return Err(de::Error::custom("antialias value must be non-negative"));
                }
                parse_antialias(&value.to_string()).map_err(de::Error::custom)
            }
        }
    }
}

pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!("invalid antialias setting '{other}'")),
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Will you?".to_string(),
            window: WindowSettings::default(),
            palette: Palette::default(),
            gradient: GradientSettings::default(),
            camera: CameraSettings::default(),
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: None,
            antialias: AntialiasSetting::Auto,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: [
                [0.40, 0.01, 0.10],
                [0.30, 0.05, 0.15],
                [0.20, 0.00, 0.05],
                [0.15, 0.02, 0.05],
                [0.30, 0.05, 0.15],
                [0.40, 0.01, 0.10],
            ],
            dark: [0.99, 0.30, 0.51],
        }
    }
}

impl Default for GradientSettings {
    fn default() -> Self {
        Self {
            speed: 0.6,
            intensity: 0.5,
            gradient_size: 1.2,
            grain_intensity: 0.05,
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 45.0,
            distance: 50.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Where a [`Settings`] value was ultimately read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    File(PathBuf),
    Embedded,
}

impl fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsSource::File(path) => write!(f, "{}", path.display()),
            SettingsSource::Embedded => f.write_str("embedded defaults"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: SettingsSource,
}

impl Settings {
    pub fn from_toml_str(input: &str) -> Result<Self, SettingsError> {
        let raw: Settings = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn from_json_str(input: &str) -> Result<Self, SettingsError> {
        let raw: Settings = serde_json::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads a settings file, picking the format from its extension.
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if extension != "toml" && extension != "json" {
            return Err(SettingsError::UnsupportedFormat(extension));
        }

        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if extension == "json" {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        }
    }

    /// Loads `path` when given, falling back to the embedded defaults when the
    /// file is missing or unusable.
    pub fn load_with_fallback(path: Option<&Path>) -> LoadedSettings {
        let Some(path) = path else {
            tracing::debug!("no settings file supplied; using embedded defaults");
            return LoadedSettings {
                settings: Settings::default(),
                source: SettingsSource::Embedded,
            };
        };

        match Self::from_path(path) {
            Ok(settings) => {
                tracing::debug!(path = %path.display(), "loaded settings file");
                LoadedSettings {
                    settings,
                    source: SettingsSource::File(path.to_path_buf()),
                }
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to load settings; falling back to embedded defaults"
                );
                LoadedSettings {
                    settings: Settings::default(),
                    source: SettingsSource::Embedded,
                }
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(SettingsError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        if let Some(fps) = self.window.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(SettingsError::Invalid(format!(
                    "fps must be a non-negative number, got {fps}"
                )));
            }
        }

        let camera = &self.camera;
        if !(camera.fov > 0.0 && camera.fov < 180.0) {
            return Err(SettingsError::Invalid(format!(
                "camera fov must be between 0 and 180 degrees, got {}",
                camera.fov
            )));
        }
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(SettingsError::Invalid(format!(
                "camera near plane ({}) must be positive and below the far plane ({})",
                camera.near, camera.far
            )));
        }
        if !(camera.distance > camera.near && camera.distance < camera.far) {
            return Err(SettingsError::Invalid(format!(
                "camera distance {} must sit between the near and far planes",
                camera.distance
            )));
        }

        let gradient = &self.gradient;
        let scalars = [
            ("speed", gradient.speed),
            ("intensity", gradient.intensity),
            ("gradient_size", gradient.gradient_size),
            ("grain_intensity", gradient.grain_intensity),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::Invalid(format!(
                    "gradient.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if gradient.gradient_size <= 0.0 {
            return Err(SettingsError::Invalid(
                "gradient.gradient_size must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
