use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::{error, info};

use super::play::{describe, parse_command, PlayCommand, HELP};
use crate::config::GameConfig;
use crate::game::Game;
use crate::persistence::{FileStore, ProgressStore};
use crate::progress::GameProgress;
use crate::quiz::catalog;
use crate::rules::billing::format_rupiah;
use crate::server::{self, ServerState};

/// Run the game behind the WebSocket server until Ctrl-C.
pub async fn serve(config: &GameConfig) -> Result<(), String> {
    let store = FileStore::new(config.save_path.as_str());
    info!(save = %store.path().display(), "Progress file");
    let game = Game::new(config.clone(), Box::new(store));

    let addr: SocketAddr = format!("{}:{}", config.websocket_bind, config.websocket_port)
        .parse()
        .map_err(|e| format!("Invalid bind address: {}", e))?;

    let (state, inputs) = ServerState::new(game.view());
    let state = Arc::new(state);
    tokio::spawn(server::run_game_actor(game, inputs, Arc::clone(&state.feed)));

    let server_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state, addr).await {
            error!("Server error: {}", e);
        }
    });

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {}", e))?;

    let view = state.feed.view.read().await;
    info!(
        state = %view.progress.game_state,
        keys = view.progress.keys_collected,
        "Shutdown signal received"
    );
    Ok(())
}

/// Drive the game from stdin, one command per line.
pub async fn play(config: &GameConfig) -> Result<(), String> {
    let store = FileStore::new(config.save_path.as_str());
    let mut game = Game::new(config.clone(), Box::new(store));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last = Instant::now();

    println!("{}", HELP);
    print_notifications(&mut game);

    loop {
        let wait = game.until_next_timer().unwrap_or(Duration::from_secs(3600));
        tokio::select! {
            line = lines.next_line() => {
                let now = Instant::now();
                game.advance(now - last);
                last = now;
                print_notifications(&mut game);

                let line = line.map_err(|e| format!("Failed to read stdin: {}", e))?;
                let Some(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(PlayCommand::Input(input)) => game.handle(input),
                    Ok(PlayCommand::Status) => print_status(game.progress()),
                    Ok(PlayCommand::Help) => println!("{}", HELP),
                    Ok(PlayCommand::Quit) => break,
                    Err(e) => println!("{}", e),
                }
            }
            _ = tokio::time::sleep(wait) => {
                let now = Instant::now();
                game.advance(now - last);
                last = now;
            }
        }
        print_notifications(&mut game);
    }

    println!("Bye. Progress is saved at {}", config.save_path);
    Ok(())
}

fn print_notifications(game: &mut Game) {
    for note in game.drain_notifications() {
        println!("{}", describe(&note));
    }
}

fn print_status(progress: &GameProgress) {
    println!("State:            {}", progress.game_state);
    println!("Energy keys:      {}/3", progress.keys_collected);
    println!("Cable connected:  {}", progress.level1_cable_solved);
    println!("TV repaired:      {}", progress.level1_tv_solved);
    println!("Kitchen efficiency: {:.1}%", progress.level2_efficiency);
    println!("Lab bill:         Rp {}", format_rupiah(progress.level3_bill));
    println!("Quiz progress:    {}", progress.quiz_progress);
}

/// Print the saved progress record.
pub fn show_progress(config: &GameConfig) -> Result<(), String> {
    let store = FileStore::new(config.save_path.as_str());
    let record = store
        .read()
        .map_err(|e| format!("Failed to read {}: {}", store.path().display(), e))?;
    match record {
        None => println!("No saved progress at {}", store.path().display()),
        Some(record) => {
            let progress = GameProgress::from_json(&record)
                .map_err(|e| format!("Saved progress is unreadable: {}", e))?;
            println!("=== Saved progress ({}) ===", store.path().display());
            print_status(&progress);
        }
    }
    Ok(())
}

/// Erase the saved progress record.
pub fn reset_progress(config: &GameConfig) -> Result<(), String> {
    let mut store = FileStore::new(config.save_path.as_str());
    store
        .clear()
        .map_err(|e| format!("Failed to clear {}: {}", store.path().display(), e))?;
    println!("Progress cleared ({})", store.path().display());
    Ok(())
}

/// Print every quiz question with its correct answer marked.
pub fn list_quiz() {
    let questions = catalog();
    for (i, q) in questions.iter().enumerate() {
        println!("{:>2}. {}", i + 1, q.question);
        for (j, option) in q.options.iter().enumerate() {
            let mark = if j == q.correct_index { '*' } else { ' ' };
            println!("     {} {}", mark, option);
        }
    }
    println!("\n{} question(s) in the pool", questions.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> GameConfig {
        GameConfig {
            save_path: dir.path().join("save.json").to_string_lossy().into_owned(),
            ..GameConfig::default()
        }
    }

    #[test]
    fn show_progress_without_save_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(show_progress(&config_in(&dir)).is_ok());
    }

    #[test]
    fn show_progress_rejects_corrupt_save() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        std::fs::write(&config.save_path, "{not json").unwrap();
        let err = show_progress(&config).unwrap_err();
        assert!(err.contains("unreadable"));
    }

    #[test]
    fn reset_progress_removes_save() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        std::fs::write(&config.save_path, r#"{"gameState":"level2"}"#).unwrap();
        reset_progress(&config).unwrap();
        assert!(!std::path::Path::new(&config.save_path).exists());
        // Clearing twice is fine
        reset_progress(&config).unwrap();
    }
}
