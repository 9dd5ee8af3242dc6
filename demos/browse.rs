use std::io;

use ratatui::crossterm::event::{self, Event, KeyCode};
use storage_browser::{Settings, Source, StorageBrowser};

#[tokio::main]
async fn main() -> io::Result<()> {
    let source = match std::env::args().nth(1) {
        Some(path) => {
            let name = std::path::Path::new(&path)
                .file_name()
                .map_or_else(|| path.clone(), |name| name.to_string_lossy().to_string());
            Source::custom(path, name)
        }
        None => Source::Home,
    };

    let settings = match std::env::var("STORAGE_BROWSER_CONFIG") {
        Ok(path) => Settings::load(std::path::Path::new(&path)).map_err(io::Error::other)?,
        Err(_) => Settings::default(),
    };

    let mut browser = StorageBrowser::with_settings(source, settings)
        .await
        .map_err(io::Error::other)?;

    let mut terminal = ratatui::init();

    loop {
        terminal.draw(|f| browser.widget_stateful().render(f.area(), f.buffer_mut()))?;

        let event = event::read()?;
        if let Event::Key(key) = &event {
            match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Char('r') => {
                    browser.reload().await;
                    continue;
                }
                _ => {}
            }
        }
        browser.handle(&event).await;
    }

    ratatui::restore();

    if let Some(url) = browser.share_target() {
        println!("{url}");
    }

    Ok(())
}
