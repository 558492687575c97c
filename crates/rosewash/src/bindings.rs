//! Maps loaded settings and command-line overrides onto renderer types.

use renderer::{Antialiasing, GradientParams, PerspectiveCamera, RendererConfig};
use settings::{AntialiasSetting, Settings};

use crate::cli::RunArgs;

pub fn gradient_params(settings: &Settings) -> GradientParams {
    GradientParams {
        colors: settings.palette.colors,
        dark: settings.palette.dark,
        speed: settings.gradient.speed,
        intensity: settings.gradient.intensity,
        gradient_size: settings.gradient.gradient_size,
        grain_intensity: settings.gradient.grain_intensity,
    }
}

/// The aspect ratio is a placeholder; the scene overwrites it from the viewport.
pub fn camera(settings: &Settings) -> PerspectiveCamera {
    PerspectiveCamera {
        fov_degrees: settings.camera.fov,
        near: settings.camera.near,
        far: settings.camera.far,
        distance: settings.camera.distance,
        ..PerspectiveCamera::default()
    }
}

pub fn antialiasing(setting: AntialiasSetting) -> Antialiasing {
    match setting.samples() {
        None => Antialiasing::Auto,
        Some(0 | 1) => Antialiasing::Off,
        Some(count) => Antialiasing::Samples(count),
    }
}

pub fn renderer_config(settings: &Settings, args: &RunArgs) -> RendererConfig {
    let surface_size = args
        .size
        .unwrap_or((settings.window.width, settings.window.height));
    let fps = args.fps.or(settings.window.fps);
    RendererConfig {
        title: settings.title.clone(),
        surface_size,
        gradient: gradient_params(settings),
        camera: camera(settings),
        target_fps: match fps {
            Some(v) if v > 0.0 => Some(v),
            _ => None,
        },
        antialiasing: antialiasing(args.antialias.unwrap_or(settings.window.antialias)),
        color_space: args.color_space,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["rosewash"];
        full.extend_from_slice(argv);
        Cli::try_parse_from(full).unwrap().run
    }

    #[test]
    fn default_settings_match_renderer_defaults() {
        let settings = Settings::default();
        assert_eq!(gradient_params(&settings), GradientParams::default());

        let camera = camera(&settings);
        let expected = PerspectiveCamera::default();
        assert_eq!(camera.fov_degrees, expected.fov_degrees);
        assert_eq!(camera.distance, expected.distance);
    }

    #[test]
    fn antialias_settings_map_to_renderer_policy() {
        assert_eq!(antialiasing(AntialiasSetting::Auto), Antialiasing::Auto);
        assert_eq!(antialiasing(AntialiasSetting::Off), Antialiasing::Off);
        assert_eq!(
            antialiasing(AntialiasSetting::Samples8),
            Antialiasing::Samples(8)
        );
    }

    #[test]
    fn command_line_overrides_settings() {
        let mut settings = Settings::default();
        settings.window.fps = Some(24.0);
        settings.window.antialias = AntialiasSetting::Samples4;

        let config = renderer_config(
            &settings,
            &run_args(&["--size", "320x200", "--fps", "60", "--antialias", "off"]),
        );
        assert_eq!(config.surface_size, (320, 200));
        assert_eq!(config.target_fps, Some(60.0));
        assert_eq!(config.antialiasing, Antialiasing::Off);
    }

    #[test]
    fn settings_apply_without_overrides() {
        let mut settings = Settings::default();
        settings.title = "Gradient".into();
        settings.window.width = 800;
        settings.window.height = 480;
        settings.window.fps = Some(0.0);

        let config = renderer_config(&settings, &run_args(&[]));
        assert_eq!(config.title, "Gradient");
        assert_eq!(config.surface_size, (800, 480));
        assert_eq!(config.target_fps, None);
    }
}
