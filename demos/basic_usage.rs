// Basic usage example for dotsettings
//
// Run with: cargo run --example basic_usage

use dotsettings::{SetOptions, SettingsStore};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct WindowBounds {
    width: u32,
    height: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config_dir = tempfile::tempdir()?;
    let store = SettingsStore::builder("my-app")
        .config_dir(config_dir.path())
        .build()?;

    println!("Settings file: {}", store.file().display());

    // Watch before writing so the first write is reported
    let observer = store.watch("window", |event| {
        println!(
            "window changed: {:?} -> {:?}",
            event.old_value(),
            event.new_value()
        );
    })?;

    store
        .set("window.bounds", json!({"width": 1280, "height": 720}))?
        .set("app.theme", "dark")?;

    // Same value again: no write, no notification
    store.set("window.bounds.width", 1280)?;

    let bounds: Option<WindowBounds> = store.get_as("window.bounds")?;
    println!("Bounds: {bounds:?}");

    let zoom = store.get("app.zoom", Some(json!(1.0)))?;
    println!("Zoom (defaulted and saved): {zoom:?}");

    // Keys containing dots are escaped
    store.set(r"recent.file\.txt", "/home/me/file.txt")?;
    println!("Has escaped key: {}", store.has(r"recent.file\.txt")?);

    store.delete("app.theme")?;
    observer.dispose();

    store.set_with("window.maximized", true, &SetOptions::new().prettify(true))?;
    println!("{}", std::fs::read_to_string(store.file())?);

    store.delete_all()?;
    println!("After delete_all: {}", store.get_all()?);

    Ok(())
}
