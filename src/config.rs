/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or
/// `~/.local/share/nimborush`. Falls back to defaults if the file is
/// missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    pub log: LogConfig,
    /// The config.toml actually read, if any.
    pub source: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedConfig {
    pub frame_ms: u64,
    pub move_speed: f32,       // tiles per second, player and containers alike
    pub fall_duration_ms: f32, // fall animation; also the loss delay
    pub growth_rate: f32,      // stepping-stone progress per ms
}

impl SpeedConfig {
    /// Duration of one tile of movement.
    pub fn move_duration_ms(&self) -> f32 {
        if self.move_speed <= 0.0 { return 0.0; }
        1000.0 / self.move_speed
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        SpeedConfig {
            frame_ms: default_frame_ms(),
            move_speed: default_move_speed(),
            fall_duration_ms: default_fall_duration(),
            growth_rate: default_growth_rate(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub restart: Vec<String>,
    pub next_level: Vec<String>,
    pub pause: Vec<String>,
    pub mute: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Empty = logging disabled.
    pub file: String,
    pub level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_move_speed")]
    move_speed: f32,
    #[serde(default = "default_fall_duration")]
    fall_duration_ms: f32,
    #[serde(default = "default_growth_rate")]
    growth_rate: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_next_level")]
    next_level: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_mute")]
    mute: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 16 }
fn default_move_speed() -> f32 { 4.0 }         // 250ms per tile
fn default_fall_duration() -> f32 { 1500.0 }
fn default_growth_rate() -> f32 { 0.003 }      // ~333ms to full size

fn default_restart() -> Vec<String> { vec!["Start".into()] }
fn default_next_level() -> Vec<String> { vec!["A".into()] }
fn default_pause() -> Vec<String> { vec!["Select".into()] }
fn default_mute() -> Vec<String> { vec!["Y".into()] }
fn default_levels_dir() -> String { "levels".into() }
fn default_log_file() -> String { "nimborush.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            frame_ms: default_frame_ms(),
            move_speed: default_move_speed(),
            fall_duration_ms: default_fall_duration(),
            growth_rate: default_growth_rate(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            restart: default_restart(),
            next_level: default_next_level(),
            pause: default_pause(),
            mute: default_mute(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { levels_dir: default_levels_dir() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: default_log_file(), level: default_log_level() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, current working directory, XDG data home.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut cfg = match find_config(&search_dirs) {
            Some((path, text)) => match Self::from_toml_str(&text) {
                Ok(mut cfg) => {
                    cfg.source = Some(path);
                    cfg
                }
                Err(e) => {
                    eprintln!("Warning: config.toml parse error: {e}");
                    eprintln!("Using default settings.");
                    Self::default()
                }
            },
            None => Self::default(),
        };
        cfg.levels_dir = locate_dir(&cfg.levels_dir, &search_dirs);
        cfg
    }

    /// Parse a config document without touching the filesystem.
    /// `levels_dir` is left as written.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::resolve(cfg))
    }

    fn resolve(toml_cfg: TomlConfig) -> Self {
        GameConfig {
            speed: SpeedConfig {
                frame_ms: toml_cfg.speed.frame_ms.max(1),
                move_speed: toml_cfg.speed.move_speed,
                fall_duration_ms: toml_cfg.speed.fall_duration_ms,
                growth_rate: toml_cfg.speed.growth_rate,
            },
            gamepad: GamepadConfig {
                restart: toml_cfg.gamepad.restart,
                next_level: toml_cfg.gamepad.next_level,
                pause: toml_cfg.gamepad.pause,
                mute: toml_cfg.gamepad.mute,
            },
            levels_dir: PathBuf::from(toml_cfg.general.levels_dir),
            log: LogConfig {
                file: toml_cfg.log.file,
                level: toml_cfg.log.level,
            },
            source: None,
        }
    }
}

/// Relative directories resolve against the first search dir that has them.
fn locate_dir(dir: &Path, search_dirs: &[PathBuf]) -> PathBuf {
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(dir))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| dir.to_path_buf())
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::resolve(TomlConfig::default())
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its data.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/nimborush)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/nimborush");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First readable config.toml in the candidate directories.
/// Runs before logging is up, so problems go to stderr.
fn find_config(search_dirs: &[PathBuf]) -> Option<(PathBuf, String)> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => return Some((path, text)),
            Err(e) => eprintln!("Warning: could not read {}: {e}", path.display()),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.speed, SpeedConfig::default());
        assert_eq!(cfg.speed.move_duration_ms(), 250.0);
        assert_eq!(cfg.gamepad.restart, vec!["Start".to_string()]);
        assert_eq!(cfg.log.file, "nimborush.log");
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.levels_dir, PathBuf::from("levels"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[speed]\nmove_speed = 8.0\n[gamepad]\nmute = [\"X\", \"L1\"]\n",
        ).unwrap();
        assert_eq!(cfg.speed.move_speed, 8.0);
        assert_eq!(cfg.speed.move_duration_ms(), 125.0);
        assert_eq!(cfg.speed.fall_duration_ms, 1500.0);
        assert_eq!(cfg.gamepad.mute, vec!["X".to_string(), "L1".to_string()]);
        assert_eq!(cfg.gamepad.pause, vec!["Select".to_string()]);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let cfg = GameConfig::from_toml_str(include_str!("../config.toml")).unwrap();
        assert_eq!(cfg.speed, SpeedConfig::default());
        assert_eq!(cfg.gamepad.next_level, vec!["A".to_string()]);
        assert_eq!(cfg.log.file, "nimborush.log");
    }

    #[test]
    fn levels_dir_resolves_against_search_dirs() {
        let root = std::env::temp_dir().join(format!("nimborush-cfg-{}", std::process::id()));
        std::fs::create_dir_all(root.join("levels")).unwrap();
        let dirs = vec![PathBuf::from("/nonexistent-nimborush"), root.clone()];

        assert_eq!(locate_dir(Path::new("levels"), &dirs), root.join("levels"));
        assert_eq!(locate_dir(Path::new("missing"), &dirs), PathBuf::from("missing"));
        assert_eq!(locate_dir(Path::new("/abs/levels"), &dirs), PathBuf::from("/abs/levels"));
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn config_file_is_found_in_search_order() {
        let root = std::env::temp_dir().join(format!("nimborush-find-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("config.toml"), "[speed]\nmove_speed = 2.0\n").unwrap();

        let (path, text) = find_config(&[PathBuf::from("/nonexistent-nimborush"), root.clone()]).unwrap();
        assert_eq!(path, root.join("config.toml"));
        assert_eq!(GameConfig::from_toml_str(&text).unwrap().speed.move_speed, 2.0);
        assert!(find_config(&[PathBuf::from("/nonexistent-nimborush")]).is_none());
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(GameConfig::from_toml_str("[speed]\nmove_speed = \"fast\"").is_err());
    }
}
