//! Main application entry point (native).

#[cfg(feature = "native")]
use boardsmith_app::{AppResult, DemoBoard, Script, ShortcutRegistry, load_settings, outline};
#[cfg(feature = "native")]
use boardsmith_core::Editor;

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting Boardsmith");

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}

#[cfg(feature = "native")]
fn run() -> AppResult<()> {
    let settings = load_settings()?;
    let mut editor = Editor::new(settings);
    DemoBoard::build(&mut editor)?;
    ShortcutRegistry::log_all();

    if let Some(path) = std::env::args().nth(1) {
        let script = Script::load(&path)?;
        log::info!("Replaying {} steps from {}", script.len(), path);
        script.run(&mut editor)?;
    }

    for line in outline(&editor) {
        log::info!("{}", line);
    }
    let memento = editor.scene.memento();
    log::info!(
        "undo depth {}, redo depth {}, {} selected",
        memento.undo_depth(),
        memento.redo_depth(),
        editor.selection.len()
    );
    Ok(())
}
