use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};
use spotdiff::app::{self, App, Command};
use spotdiff::config;
use spotdiff::core::{images, settings};
use spotdiff::game::matching::DisplayRect;
use spotdiff::game::puzzle::GameConfig;
use spotdiff::screens::ScreenAction;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "spotdiff", version, about = "Spot the difference, in a terminal")]
struct Cli {
    /// Player settings file.
    #[arg(long, default_value = config::SETTINGS_INI_PATH)]
    settings: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a configured game, reading commands from stdin.
    Play {
        #[arg(default_value = config::DEFAULT_GAME_DATA_PATH)]
        config: PathBuf,
        /// Seed for hint selection.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = config::DEFAULT_DISPLAY_WIDTH)]
        width: f64,
        #[arg(long, default_value_t = config::DEFAULT_DISPLAY_HEIGHT)]
        height: f64,
    },
    /// Build or edit a game configuration, reading commands from stdin.
    Author {
        #[arg(long)]
        load: Option<PathBuf>,
        #[arg(long, default_value = config::DEFAULT_SAVE_PATH)]
        out: PathBuf,
        #[arg(long, default_value_t = config::DEFAULT_DISPLAY_WIDTH)]
        width: f64,
        #[arg(long, default_value_t = config::DEFAULT_DISPLAY_HEIGHT)]
        height: f64,
    },
    /// Validate a configuration and probe its local images.
    Check { config: PathBuf },
}

fn main() -> Result<(), Box<dyn Error>> {
    // --- Logging Setup ---
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .filter_module("spotdiff::screens", LevelFilter::Info)
        .filter_module("spotdiff::core::audio", LevelFilter::Warn)
        .init();

    let cli = Cli::parse();
    let player_settings = settings::load(&cli.settings);
    let now = Instant::now();

    match cli.command {
        Commands::Play { config: path, seed, width, height } => {
            let game_config = load_game_config(&path)?;
            let mut app = App::new(
                &game_config,
                player_settings,
                seed,
                DisplayRect::new(0.0, 0.0, width, height),
                app::asset_root_for(&path),
                PathBuf::from(config::DEFAULT_SAVE_PATH),
            );
            if let Err(e) = app.play(game_config, now) {
                error!("Failed to start the game: {}", e);
                return Err(e.into());
            }
            run_loop(&mut app)?;
        }
        Commands::Author { load, out, width, height } => {
            let initial = match &load {
                Some(path) => load_game_config(path)?,
                None => GameConfig { game_title: config::WINDOW_TITLE.to_string(), ..GameConfig::default() },
            };
            let root = load.as_deref().map_or_else(|| PathBuf::from("."), app::asset_root_for);
            let mut app = App::new(
                &initial,
                player_settings,
                None,
                DisplayRect::new(0.0, 0.0, width, height),
                root,
                out,
            );
            run_loop(&mut app)?;
        }
        Commands::Check { config: path } => check(&path)?,
    }

    info!("Exited gracefully.");
    Ok(())
}

fn load_game_config(path: &Path) -> Result<GameConfig, Box<dyn Error>> {
    match GameConfig::load(path) {
        Ok(game_config) => Ok(game_config),
        Err(e) => {
            error!("Failed to load the game configuration: {}", e);
            Err(e.into())
        }
    }
}

fn run_loop(app: &mut App) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", app::help_for(app.screen()))?;

    for line in stdin.lock().lines() {
        let line = line?;
        let command = match Command::parse(app.screen(), &line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(stdout, "{}", e)?;
                continue;
            }
        };
        match app.execute(command, Instant::now()) {
            Ok((action, lines)) => {
                for l in lines {
                    writeln!(stdout, "{}", l)?;
                }
                match action {
                    ScreenAction::Exit => break,
                    ScreenAction::Navigate(screen) => writeln!(stdout, "{}", app::help_for(screen))?,
                    ScreenAction::None => {}
                }
            }
            Err(e) => writeln!(stdout, "Error: {}", e)?,
        }
        stdout.flush()?;
    }
    Ok(())
}

fn check(path: &Path) -> Result<(), Box<dyn Error>> {
    let game_config = GameConfig::load(path)?;
    game_config.validate_for_play()?;
    let root = app::asset_root_for(path);
    for image_ref in [&game_config.images.image1, &game_config.images.image2] {
        match images::probe_dimensions(image_ref, &root)? {
            Some((w, h)) => println!("{}: {}x{}", image_ref, w, h),
            None => println!("{}: {:?}, not probed", truncate(image_ref), images::classify(image_ref)),
        }
    }
    println!("'{}' is playable with {} differences.", game_config.game_title, game_config.differences.len());
    Ok(())
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(48) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_config_is_reported_with_its_path() {
        let path = std::env::temp_dir().join("spotdiff-missing-config.json");
        let _ = std::fs::remove_file(&path);
        let err = load_game_config(&path).unwrap_err();
        assert!(err.to_string().contains("spotdiff-missing-config.json"));
    }

    #[test]
    fn truncate_keeps_short_refs() {
        assert_eq!(truncate("a.png"), "a.png");
        assert_eq!(truncate(&"x".repeat(60)).len(), 48);
    }
}
