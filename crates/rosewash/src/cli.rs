use std::path::PathBuf;

use clap::{Parser, Subcommand};
use renderer::ColorSpaceMode;
use settings::{parse_antialias, AntialiasSetting};

#[derive(Parser, Debug)]
#[command(
    name = "rosewash",
    author,
    version,
    about = "Touch-reactive gradient background",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Settings file (TOML or JSON). Defaults to `settings.toml` in the config directory.
    #[arg(long, env = "ROSEWASH_SETTINGS", value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,

    /// Override the window size in logical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(
        long,
        value_name = "MODE",
        value_parser = parse_color_space,
        default_value = "auto"
    )]
    pub color_space: ColorSpaceMode,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a still frame on the CPU and write it as PNG.
    Preview(PreviewArgs),
    /// Print the resolved settings as TOML along with where they came from.
    Settings,
}

#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Destination PNG path.
    #[arg(long, short, value_name = "PATH")]
    pub output: PathBuf,

    /// Clock value of the frame, in seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub time: f32,

    /// Image size; defaults to the window size from the settings.
    #[arg(long = "size", value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Pointer position in pixels, replayed in order before the frame is shaded.
    #[arg(long = "pointer", value_name = "X,Y", value_parser = parse_pointer)]
    pub pointer: Vec<[f32; 2]>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT, e.g. 1280x720".to_string())?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size".to_string())?;
    if width == 0 || height == 0 {
        return Err("dimensions must be greater than zero".to_string());
    }
    Ok((width, height))
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

pub fn parse_pointer(value: &str) -> Result<[f32; 2], String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| "expected X,Y".to_string())?;
    let parse = |raw: &str, axis: &str| {
        raw.trim()
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid {axis} coordinate '{}'", raw.trim()))
    };
    Ok([parse(x, "x")?, parse(y, "y")?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_surface_sizes() {
        assert_eq!(parse_surface_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_surface_size(" 640 X 480 ").unwrap(), (640, 480));
        assert!(parse_surface_size("0x720").is_err());
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("wide x tall").is_err());
    }

    #[test]
    fn parses_color_spaces() {
        assert_eq!(parse_color_space("auto").unwrap(), ColorSpaceMode::Auto);
        assert_eq!(parse_color_space("Gamma").unwrap(), ColorSpaceMode::Gamma);
        assert_eq!(parse_color_space("srgb").unwrap(), ColorSpaceMode::Linear);
        assert!(parse_color_space("").is_err());
        assert!(parse_color_space("hdr").is_err());
    }

    #[test]
    fn parses_pointer_positions() {
        assert_eq!(parse_pointer("10,20.5").unwrap(), [10.0, 20.5]);
        assert_eq!(parse_pointer(" 3 , 4 ").unwrap(), [3.0, 4.0]);
        assert!(parse_pointer("10").is_err());
        assert!(parse_pointer("a,b").is_err());
        assert!(parse_pointer("inf,1").is_err());
    }

    #[test]
    fn cli_accepts_preview_subcommand() {
        let cli = Cli::try_parse_from([
            "rosewash",
            "preview",
            "--output",
            "frame.png",
            "--time",
            "1.5",
            "--pointer",
            "10,10",
            "--pointer",
            "20,10",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Preview(args)) => {
                assert_eq!(args.output, PathBuf::from("frame.png"));
                assert_eq!(args.time, 1.5);
                assert_eq!(args.pointer, vec![[10.0, 10.0], [20.0, 10.0]]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn run_flags_override_settings() {
        let cli = Cli::try_parse_from([
            "rosewash",
            "--size",
            "800x600",
            "--antialias",
            "4",
            "--fps",
            "30",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.size, Some((800, 600)));
        assert_eq!(cli.run.antialias, Some(AntialiasSetting::Samples4));
        assert_eq!(cli.run.fps, Some(30.0));
        assert_eq!(cli.run.color_space, ColorSpaceMode::Auto);
    }
}
