use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn rosewash(config_dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_rosewash"));
    command
        .env("ROSEWASH_CONFIG_DIR", config_dir)
        .env_remove("ROSEWASH_SETTINGS")
        .env("RUST_LOG", "warn");
    command
}

#[test]
fn settings_command_prints_embedded_defaults() {
    let root = TempDir::new().unwrap();
    let output = rosewash(root.path())
        .arg("settings")
        .output()
        .expect("failed to run rosewash settings");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("# source: embedded defaults"), "{stdout}");
    assert!(stdout.contains("title = \"Will you?\""), "{stdout}");
    assert!(stdout.contains("[palette]"), "{stdout}");
}

#[test]
fn settings_command_reads_config_directory() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("settings.toml"),
        "title = \"Dusk\"\n\n[window]\nwidth = 640\nheight = 480\n",
    )
    .unwrap();

    let output = rosewash(root.path())
        .arg("settings")
        .output()
        .expect("failed to run rosewash settings");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("settings.toml"), "{stdout}");
    assert!(stdout.contains("title = \"Dusk\""), "{stdout}");
    assert!(stdout.contains("width = 640"), "{stdout}");
}

#[test]
fn broken_settings_file_falls_back_to_defaults() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let output = rosewash(root.path())
        .args(["settings", "--settings"])
        .arg(&path)
        .output()
        .expect("failed to run rosewash settings");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("# source: embedded defaults"), "{stdout}");
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("falling back"), "{stderr}");
}
