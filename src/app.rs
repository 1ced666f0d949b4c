use crate::core::audio::CuePlayer;
use crate::core::images;
use crate::core::settings::PlayerSettings;
use crate::error::Result;
use crate::game::matching::{DisplayRect, PointerClick};
use crate::game::puzzle::{GameConfig, ImageSide};
use crate::game::region::ImagePoint;
use crate::screens::gameplay::ClickOutcome;
use crate::screens::{authoring, gameplay, Screen, ScreenAction};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One line of input, already tokenized.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Shared
    Help,
    Quit,
    Status,
    // Gameplay
    Click { side: ImageSide, x: f64, y: f64 },
    Hint,
    Restart,
    Sound,
    Resize { width: f64, height: f64 },
    Back,
    // Authoring
    Title(String),
    Image { side: ImageSide, image_ref: String },
    Mark,
    Cancel,
    Set { number: usize, field: String, value: String },
    Remove { number: usize },
    Preview { x: f64, y: f64 },
    Save(Option<PathBuf>),
    Load(PathBuf),
    Start,
}

fn parse_side(token: Option<&str>) -> std::result::Result<ImageSide, String> {
    token
        .and_then(|t| t.parse::<u8>().ok())
        .and_then(ImageSide::from_number)
        .ok_or_else(|| "expected image 1 or 2".to_string())
}

fn parse_coord(token: Option<&str>, what: &str) -> std::result::Result<f64, String> {
    token
        .and_then(|t| t.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("expected a number for {}", what))
}

fn parse_number(token: Option<&str>) -> std::result::Result<usize, String> {
    token
        .and_then(|t| t.parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .ok_or_else(|| "expected a difference number (1-based)".to_string())
}

impl Command {
    /// Commands are read per screen; `click` means different units on each.
    pub fn parse(screen: Screen, line: &str) -> std::result::Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();

        let cmd = match (screen, head) {
            (_, "help") => Command::Help,
            (_, "quit" | "exit") => Command::Quit,
            (_, "status") => Command::Status,
            (_, "click") => {
                let side = parse_side(args.next())?;
                let x = parse_coord(args.next(), "x")?;
                let y = parse_coord(args.next(), "y")?;
                Command::Click { side, x, y }
            }
            (Screen::Gameplay, "hint") => Command::Hint,
            (Screen::Gameplay, "restart" | "again") => Command::Restart,
            (Screen::Gameplay, "sound") => Command::Sound,
            (Screen::Gameplay, "resize") => Command::Resize {
                width: parse_coord(args.next(), "width")?,
                height: parse_coord(args.next(), "height")?,
            },
            (Screen::Gameplay, "back") => Command::Back,
            (Screen::Authoring, "title") => Command::Title(rest.to_string()),
            (Screen::Authoring, "image") => {
                let side = parse_side(args.next())?;
                let image_ref = args.next().ok_or("expected an image reference")?.to_string();
                Command::Image { side, image_ref }
            }
            (Screen::Authoring, "mark") => Command::Mark,
            (Screen::Authoring, "cancel") => Command::Cancel,
            (Screen::Authoring, "set") => {
                let number = parse_number(args.next())?;
                let field = args.next().ok_or("expected a field name")?.to_string();
                let value = args.collect::<Vec<_>>().join(" ");
                Command::Set { number, field, value }
            }
            (Screen::Authoring, "remove") => Command::Remove { number: parse_number(args.next())? },
            (Screen::Authoring, "preview") => Command::Preview {
                x: parse_coord(args.next(), "x")?,
                y: parse_coord(args.next(), "y")?,
            },
            (Screen::Authoring, "save") => Command::Save(args.next().map(PathBuf::from)),
            (Screen::Authoring, "load") => Command::Load(PathBuf::from(args.next().ok_or("expected a file path")?)),
            (Screen::Authoring, "start") => Command::Start,
            (_, other) => return Err(format!("unknown command '{}'", other)),
        };
        Ok(Some(cmd))
    }
}

const GAMEPLAY_HELP: &str = "click <1|2> <px> <py>, hint, restart, sound, resize <w> <h>, status, back, quit";
const AUTHORING_HELP: &str = "title <text>, image <1|2> <ref>, mark, click <1|2> <x%> <y%>, cancel, \
set <n> <x|y|width|height|description> <value>, remove <n>, preview <x%> <y%>, status, save [path], load <path>, start, quit";

/// Owns the active screen and the config shared between them.
pub struct App {
    screen: Screen,
    authoring: authoring::State,
    game: Option<gameplay::State>,
    settings: PlayerSettings,
    seed: Option<u64>,
    container: DisplayRect,
    asset_root: PathBuf,
    save_path: PathBuf,
}

impl App {
    pub fn new(
        config: &GameConfig,
        settings: PlayerSettings,
        seed: Option<u64>,
        container: DisplayRect,
        asset_root: PathBuf,
        save_path: PathBuf,
    ) -> Self {
        Self {
            screen: Screen::Authoring,
            authoring: authoring::State::new(config, settings.click_tolerance),
            game: None,
            settings,
            seed,
            container,
            asset_root,
            save_path,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn authoring(&self) -> &authoring::State {
        &self.authoring
    }

    pub fn game(&self) -> Option<&gameplay::State> {
        self.game.as_ref()
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Lays an image out in the container, or leaves it unmeasured when a
    /// local file cannot be read.
    fn layout_for(&self, image_ref: &str) -> DisplayRect {
        match images::probe_dimensions(image_ref, &self.asset_root) {
            Ok(Some(natural)) => DisplayRect::fit_centered(self.container, natural),
            Ok(None) => self.container,
            Err(e) => {
                warn!("{}; clicks on this image are ignored until 'resize'.", e);
                DisplayRect::new(self.container.left, self.container.top, 0.0, 0.0)
            }
        }
    }

    /// Goes straight to the game with `config`.
    pub fn play(&mut self, config: GameConfig, now: Instant) -> Result<ScreenAction> {
        config.validate_for_play()?;
        let cues = CuePlayer::headless(self.settings.sound_enabled);
        let rect1 = self.layout_for(&config.images.image1);
        let rect2 = self.layout_for(&config.images.image2);
        let mut game = gameplay::State::new(config, &self.settings, cues, self.rng(), now)?;
        game.set_display_rect(ImageSide::Original, rect1);
        game.set_display_rect(ImageSide::Modified, rect2);
        self.game = Some(game);
        self.screen = Screen::Gameplay;
        Ok(ScreenAction::Navigate(Screen::Gameplay))
    }

    pub fn start_from_authoring(&mut self, now: Instant) -> Result<ScreenAction> {
        let config = self.authoring.start_game()?;
        self.play(config, now)
    }

    /// Drops the running game and returns to authoring with its config.
    pub fn back_to_config(&mut self) -> ScreenAction {
        if let Some(game) = self.game.take() {
            let config = game.dispose();
            self.authoring = authoring::State::new(&config, self.settings.click_tolerance);
        }
        self.screen = Screen::Authoring;
        ScreenAction::Navigate(Screen::Authoring)
    }

    pub fn tick(&mut self, now: Instant) {
        self.authoring.tick(now);
        if let Some(game) = self.game.as_mut() {
            game.tick(now);
        }
    }

    /// Runs one command and returns the lines to show plus where to go next.
    pub fn execute(&mut self, command: Command, now: Instant) -> Result<(ScreenAction, Vec<String>)> {
        self.tick(now);
        let mut out = Vec::new();
        let action = match (self.screen, command) {
            (_, Command::Quit) => ScreenAction::Exit,
            (Screen::Gameplay, Command::Help) => {
                out.push(GAMEPLAY_HELP.to_string());
                ScreenAction::None
            }
            (Screen::Authoring, Command::Help) => {
                out.push(AUTHORING_HELP.to_string());
                ScreenAction::None
            }
            (Screen::Gameplay, command) => self.execute_gameplay(command, now, &mut out)?,
            (Screen::Authoring, command) => self.execute_authoring(command, now, &mut out)?,
        };
        Ok((action, out))
    }

    fn execute_gameplay(&mut self, command: Command, now: Instant, out: &mut Vec<String>) -> Result<ScreenAction> {
        if command == Command::Back {
            return Ok(self.back_to_config());
        }
        let Some(game) = self.game.as_mut() else {
            return Ok(self.back_to_config());
        };
        match command {
            Command::Click { side, x, y } => match game.handle_click(side, PointerClick { x, y }, now) {
                ClickOutcome::Ignored => out.push("(click ignored)".to_string()),
                ClickOutcome::Found { index, completed } => {
                    let view = game.view();
                    out.push(format!("Found difference {}! {}", index + 1, view.score));
                    if completed {
                        out.push(format!("All differences found in {}!", view.timer));
                    }
                }
                ClickOutcome::Miss { point } => {
                    out.push(format!("Miss at {:.1}%, {:.1}%.", point.x, point.y));
                }
            },
            Command::Hint => match game.show_hint(now) {
                Some(index) => {
                    let view = game.view();
                    if let Some(m) = view.hint_marker {
                        out.push(format!(
                            "Hint: look near {:.1}%, {:.1}% (difference {}).",
                            m.x + m.width / 2.0,
                            m.y + m.height / 2.0,
                            index + 1
                        ));
                    }
                }
                None => out.push("No hint available.".to_string()),
            },
            Command::Restart => {
                game.restart(now);
                out.push("Restarted.".to_string());
            }
            Command::Sound => {
                let on = game.toggle_sound();
                out.push(format!("Sound {}.", if on { "on" } else { "off" }));
            }
            Command::Resize { width, height } => {
                let rect = DisplayRect::new(0.0, 0.0, width, height);
                game.set_display_rect(ImageSide::Original, rect);
                game.set_display_rect(ImageSide::Modified, rect);
                out.push(format!("Images laid out at {}x{}.", width, height));
            }
            Command::Status => out.extend(render_game(&game.view())),
            other => out.push(format!("'{:?}' is not available while playing.", other)),
        }
        Ok(ScreenAction::None)
    }

    fn execute_authoring(&mut self, command: Command, now: Instant, out: &mut Vec<String>) -> Result<ScreenAction> {
        let a = &mut self.authoring;
        match command {
            Command::Title(title) => a.set_title(title),
            Command::Image { side, image_ref } => a.set_image(side, image_ref),
            Command::Mark => a.start_marking()?,
            Command::Cancel => a.cancel_marking(),
            Command::Click { side, x, y } => {
                a.click(side, ImagePoint::new(x, y), now);
            }
            Command::Set { number, field, value } => a.update_region(number - 1, &field, &value)?,
            Command::Remove { number } => {
                let removed = a.remove_region(number - 1)?;
                out.push(format!("Removed '{}'.", removed.label(number - 1)));
            }
            Command::Preview { x, y } => match a.preview_match(ImagePoint::new(x, y)) {
                Some(i) => out.push(format!("Would find difference {}.", i + 1)),
                None => out.push("Would miss.".to_string()),
            },
            Command::Status => {
                let config = a.to_config();
                out.push(format!("Title: {}", config.game_title));
                out.push(format!("Image 1: {}", config.images.image1));
                out.push(format!("Image 2: {}", config.images.image2));
                for (i, d) in config.differences.iter().enumerate() {
                    out.push(format!(
                        "  {}. {} @ {:.1},{:.1} {:.1}x{:.1}",
                        i + 1,
                        d.label(i),
                        d.x,
                        d.y,
                        d.width,
                        d.height
                    ));
                }
            }
            Command::Save(path) => {
                let path = path.unwrap_or_else(|| self.save_path.clone());
                a.save_to(&path)?;
                out.push(format!("Saved to {}.", path.display()));
            }
            Command::Load(path) => a.load_file(&path)?,
            Command::Start => {
                info!("Starting game from authoring screen.");
                return self.start_from_authoring(now);
            }
            other => out.push(format!("'{:?}' is not available while authoring.", other)),
        }
        if let Some(message) = self.authoring.message() {
            out.push(message.to_string());
        }
        Ok(ScreenAction::None)
    }
}

pub fn help_for(screen: Screen) -> &'static str {
    match screen {
        Screen::Gameplay => GAMEPLAY_HELP,
        Screen::Authoring => AUTHORING_HELP,
    }
}

fn render_game(view: &gameplay::GameView) -> Vec<String> {
    let mut lines = vec![format!("{}  Time {}  Found {}", view.title, view.timer, view.score)];
    for entry in &view.checklist {
        lines.push(format!("  [{}] {}. {}", if entry.found { "x" } else { " " }, entry.number, entry.label));
    }
    if let Some(done) = &view.completion {
        lines.push(format!("Congratulations! You found all the differences in {} ({}).", done.time, done.score));
    }
    lines
}

/// Resolves relative image paths in a config next to the config file.
pub fn asset_root_for(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
