use std::path::PathBuf;

use anyhow::{Context, Result};
use renderer::{render_still, PreviewOptions, Renderer};
use settings::{LoadedSettings, Settings};
use tracing_subscriber::EnvFilter;

use crate::bindings;
use crate::cli::{PreviewArgs, RunArgs};
use crate::paths::AppPaths;

pub fn run(args: RunArgs) -> Result<()> {
    let loaded = resolve_settings(&args)?;
    let config = bindings::renderer_config(&loaded.settings, &args);
    tracing::info!(source = %loaded.source, "bootstrapping rosewash");
    Renderer::new(config).run()
}

pub fn preview(run_args: &RunArgs, args: PreviewArgs) -> Result<()> {
    let loaded = resolve_settings(run_args)?;
    let settings = &loaded.settings;
    let (width, height) = args
        .size
        .or(run_args.size)
        .unwrap_or((settings.window.width, settings.window.height));

    let options = PreviewOptions {
        width,
        height,
        time: args.time,
        pointer_path: args.pointer,
    };
    let image = render_still(
        bindings::gradient_params(settings),
        bindings::camera(settings),
        &options,
    )
    .context("failed to render preview frame")?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    image
        .save_with_format(&args.output, image::ImageFormat::Png)
        .with_context(|| format!("failed to write preview to {}", args.output.display()))?;
    tracing::info!(
        path = %args.output.display(),
        width,
        height,
        time = options.time,
        "wrote preview frame"
    );
    Ok(())
}

pub fn print_settings(run_args: &RunArgs) -> Result<()> {
    let loaded = resolve_settings(run_args)?;
    let rendered = loaded
        .settings
        .to_toml_string()
        .context("failed to serialise settings")?;
    println!("# source: {}", loaded.source);
    print!("{rendered}");
    Ok(())
}

/// An explicit `--settings` path is always attempted; the config-directory
/// file is only read when it exists.
fn resolve_settings(args: &RunArgs) -> Result<LoadedSettings> {
    let path = match &args.settings {
        Some(path) => Some(path.clone()),
        None => discovered_settings_file()?,
    };
    Ok(Settings::load_with_fallback(path.as_deref()))
}

fn discovered_settings_file() -> Result<Option<PathBuf>> {
    let paths = AppPaths::discover()?;
    let file = paths.settings_file();
    tracing::debug!(
        config = %paths.config_dir().display(),
        exists = file.is_file(),
        "resolved rosewash paths"
    );
    Ok(file.is_file().then_some(file))
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
