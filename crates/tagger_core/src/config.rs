//! Session configuration
//!
//! A configuration file is a list of `DIRECTIVE value` or `DIRECTIVE=value`
//! lines. Blank lines and `#` comments are skipped, and `$NAME` in a value
//! expands to the value of an earlier directive NAME. Values are kept as
//! strings; typed accessors parse them on demand.

use crate::{Result, TaggerError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Recognised configuration directives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Directive {
    SessionDir,
    ImageDir,
    ImageExt,
    TagDir,
    TagFile,
    SubsetFile,
    Mode,
    ThumbDir,
    ThumbSuffix,
    ThumbExt,
    ThumbSize,
    GridRows,
    GridCols,
    WindowWidth,
    WindowHeight,
    AutoAdvanceDelay,
    AutoAdvanceMarker,
    LogDir,
}

impl Directive {
    pub const ALL: &'static [Self] = &[
        Self::SessionDir,
        Self::ImageDir,
        Self::ImageExt,
        Self::TagDir,
        Self::TagFile,
        Self::SubsetFile,
        Self::Mode,
        Self::ThumbDir,
        Self::ThumbSuffix,
        Self::ThumbExt,
        Self::ThumbSize,
        Self::GridRows,
        Self::GridCols,
        Self::WindowWidth,
        Self::WindowHeight,
        Self::AutoAdvanceDelay,
        Self::AutoAdvanceMarker,
        Self::LogDir,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Directive::SessionDir => "SESSION_DIR",
            Directive::ImageDir => "IMAGE_DIR",
            Directive::ImageExt => "IMAGE_EXT",
            Directive::TagDir => "TAG_DIR",
            Directive::TagFile => "TAG_FILE",
            Directive::SubsetFile => "SUBSET_FILE",
            Directive::Mode => "MODE",
            Directive::ThumbDir => "THUMB_DIR",
            Directive::ThumbSuffix => "THUMB_SUFFIX",
            Directive::ThumbExt => "THUMB_EXT",
            Directive::ThumbSize => "THUMB_SIZE",
            Directive::GridRows => "GRID_ROWS",
            Directive::GridCols => "GRID_COLS",
            Directive::WindowWidth => "WINDOW_WIDTH",
            Directive::WindowHeight => "WINDOW_HEIGHT",
            Directive::AutoAdvanceDelay => "AUTO_ADVANCE_DELAY",
            Directive::AutoAdvanceMarker => "AUTO_ADVANCE_MARKER",
            Directive::LogDir => "LOG_DIR",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }
}

/// Single image or thumbnail grid display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DisplayMode {
    #[default]
    #[serde(rename = "single")]
    Single,
    #[serde(rename = "grid")]
    Grid,
}

impl DisplayMode {
    pub fn name(self) -> &'static str {
        match self {
            DisplayMode::Single => "single-image",
            DisplayMode::Grid => "grid",
        }
    }
}

pub const DEFAULT_IMAGE_EXT: &str = "jpg";
pub const DEFAULT_THUMB_SUFFIX: &str = "_thumb";
pub const DEFAULT_THUMB_EXT: &str = "jpg";
pub const DEFAULT_THUMB_SIZE: u32 = 160;
pub const DEFAULT_GRID_ROWS: usize = 3;
pub const DEFAULT_GRID_COLS: usize = 4;
pub const DEFAULT_AUTO_ADVANCE_MS: u64 = 1500;
pub const DEFAULT_MARKER: char = '+';

/// Parsed configuration; immutable once loaded
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    values: BTreeMap<Directive, String>,
    mode: DisplayMode,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TaggerError::ConfigNotFound(path.to_path_buf()),
            _ => TaggerError::Io(e),
        })?;

        let config = Self::parse(&content)?;
        tracing::info!("Configuration loaded from {:?} ({} mode)", path, config.mode.name());
        Ok(config)
    }

    /// Parse configuration text
    pub fn parse(text: &str) -> Result<Self> {
        let mut values: BTreeMap<Directive, String> = BTreeMap::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (name, rest) = split_directive(line);
            let directive = Directive::from_name(name).ok_or_else(|| TaggerError::UnknownDirective {
                line: line_no,
                directive: name.to_string(),
            })?;

            if rest.is_empty() {
                return Err(TaggerError::MissingValue {
                    line: line_no,
                    directive: directive.name().to_string(),
                });
            }

            let value = substitute(rest, &values, line_no)?;
            if let Some(old) = values.insert(directive, value) {
                tracing::debug!("{} redefined on line {} (was {:?})", directive.name(), line_no, old);
            }
        }

        for required in [Directive::SessionDir, Directive::ImageDir] {
            if !values.contains_key(&required) {
                return Err(TaggerError::MissingDirective(required.name()));
            }
        }

        let mode = match values.get(&Directive::Mode) {
            Some(v) if v.eq_ignore_ascii_case("grid") => DisplayMode::Grid,
            _ => DisplayMode::Single,
        };

        Ok(Self { values, mode })
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Raw string value of a directive, if set
    pub fn get(&self, directive: Directive) -> Option<&str> {
        self.values.get(&directive).map(String::as_str)
    }

    /// Parse a directive's value; `Ok(None)` when unset
    pub fn parse_value<T: FromStr>(&self, directive: Directive) -> Result<Option<T>> {
        match self.get(directive) {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|_| TaggerError::InvalidValue {
                directive: directive.name(),
                value: raw.to_string(),
            }),
        }
    }

    fn path_or(&self, directive: Directive, default: impl FnOnce() -> PathBuf) -> PathBuf {
        self.get(directive).map(PathBuf::from).unwrap_or_else(default)
    }

    pub fn session_dir(&self) -> PathBuf {
        self.path_or(Directive::SessionDir, PathBuf::new)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.path_or(Directive::ImageDir, PathBuf::new)
    }

    pub fn image_ext(&self) -> &str {
        self.get(Directive::ImageExt).unwrap_or(DEFAULT_IMAGE_EXT)
    }

    pub fn tag_dir(&self) -> PathBuf {
        self.path_or(Directive::TagDir, || self.session_dir().join("tags"))
    }

    pub fn tag_file(&self) -> PathBuf {
        self.path_or(Directive::TagFile, || self.session_dir().join("tags.txt"))
    }

    pub fn subset_file(&self) -> Option<PathBuf> {
        self.get(Directive::SubsetFile).map(PathBuf::from)
    }

    pub fn thumb_dir(&self) -> PathBuf {
        self.path_or(Directive::ThumbDir, || self.session_dir().join("thumbs"))
    }

    pub fn thumb_suffix(&self) -> &str {
        self.get(Directive::ThumbSuffix).unwrap_or(DEFAULT_THUMB_SUFFIX)
    }

    pub fn thumb_ext(&self) -> &str {
        self.get(Directive::ThumbExt).unwrap_or(DEFAULT_THUMB_EXT)
    }

    pub fn thumb_size(&self) -> Result<u32> {
        let size = self.parse_value::<u32>(Directive::ThumbSize)?.unwrap_or(DEFAULT_THUMB_SIZE);
        if size == 0 {
            return Err(TaggerError::InvalidValue {
                directive: Directive::ThumbSize.name(),
                value: size.to_string(),
            });
        }
        Ok(size)
    }

    /// Grid geometry as (rows, cols)
    pub fn grid_dims(&self) -> Result<(usize, usize)> {
        let rows = self.parse_value::<usize>(Directive::GridRows)?.unwrap_or(DEFAULT_GRID_ROWS);
        let cols = self.parse_value::<usize>(Directive::GridCols)?.unwrap_or(DEFAULT_GRID_COLS);
        if rows == 0 || cols == 0 {
            return Err(TaggerError::InvalidValue {
                directive: if rows == 0 { Directive::GridRows.name() } else { Directive::GridCols.name() },
                value: "0".to_string(),
            });
        }
        Ok((rows, cols))
    }

    /// Images shown per display: 1 in single mode, rows × cols in grid mode
    pub fn page_size(&self) -> Result<usize> {
        match self.mode {
            DisplayMode::Single => Ok(1),
            DisplayMode::Grid => self.grid_dims().map(|(r, c)| r * c),
        }
    }

    /// Window geometry for the interface layer, if configured
    pub fn auto_advance_delay(&self) -> Result<Duration> {
        let ms = self
            .parse_value::<u64>(Directive::AutoAdvanceDelay)?
            .unwrap_or(DEFAULT_AUTO_ADVANCE_MS);
        Ok(Duration::from_millis(ms))
    }

    pub fn marker(&self) -> Result<char> {
        match self.get(Directive::AutoAdvanceMarker) {
            None => Ok(DEFAULT_MARKER),
            Some(raw) => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_ascii_alphanumeric() => Ok(c),
                    _ => Err(TaggerError::InvalidValue {
                        directive: Directive::AutoAdvanceMarker.name(),
                        value: raw.to_string(),
                    }),
                }
            }
        }
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.get(Directive::LogDir).map(PathBuf::from)
    }

    /// Check the directories a session needs, creating the tag directory if absent
    pub fn validate_dirs(&self) -> Result<()> {
        for dir in [self.session_dir(), self.image_dir()] {
            if !dir.is_dir() {
                return Err(TaggerError::MissingDirectory(dir));
            }
        }

        let tag_dir = self.tag_dir();
        if !tag_dir.exists() {
            std::fs::create_dir_all(&tag_dir)?;
            tracing::info!("Created tag directory {:?}", tag_dir);
        } else if !tag_dir.is_dir() {
            return Err(TaggerError::MissingDirectory(tag_dir));
        }

        Ok(())
    }
}

/// Split `NAME value` / `NAME=value` / `NAME = value` into name and trimmed value
fn split_directive(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let (name, rest) = line.split_at(end);
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest);
    (name, rest.trim())
}

fn is_var_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}

/// Expand `$NAME` references against already-parsed directives
fn substitute(raw: &str, values: &BTreeMap<Directive, String>, line: usize) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let name_len = after.find(|c: char| !is_var_char(c)).unwrap_or(after.len());

        if name_len == 0 {
            out.push('$');
            rest = after;
            continue;
        }

        let name = &after[..name_len];
        let value = Directive::from_name(name)
            .and_then(|d| values.get(&d))
            .ok_or_else(|| TaggerError::UndefinedVariable {
                line,
                name: name.to_string(),
            })?;
        out.push_str(value);
        rest = &after[name_len..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BASIC: &str = "\
# session setup
SESSION_DIR /data/session
IMAGE_DIR=/data/images

THUMB_DIR = $SESSION_DIR/thumbs
MODE grid
GRID_ROWS 2
";

    #[test]
    fn test_parse_basic() {
        let cfg = Config::parse(BASIC).unwrap();
        assert_eq!(cfg.session_dir(), PathBuf::from("/data/session"));
        assert_eq!(cfg.image_dir(), PathBuf::from("/data/images"));
        assert_eq!(cfg.thumb_dir(), PathBuf::from("/data/session/thumbs"));
        assert_eq!(cfg.mode(), DisplayMode::Grid);
        assert_eq!(cfg.grid_dims().unwrap(), (2, DEFAULT_GRID_COLS));
        assert_eq!(cfg.page_size().unwrap(), 2 * DEFAULT_GRID_COLS);
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::parse("SESSION_DIR /s\nIMAGE_DIR /i\n").unwrap();
        assert_eq!(cfg.mode(), DisplayMode::Single);
        assert_eq!(cfg.page_size().unwrap(), 1);
        assert_eq!(cfg.tag_dir(), PathBuf::from("/s/tags"));
        assert_eq!(cfg.tag_file(), PathBuf::from("/s/tags.txt"));
        assert_eq!(cfg.image_ext(), "jpg");
        assert_eq!(cfg.marker().unwrap(), '+');
        assert_eq!(cfg.auto_advance_delay().unwrap(), Duration::from_millis(DEFAULT_AUTO_ADVANCE_MS));
        assert!(cfg.subset_file().is_none());
    }

    #[test]
    fn test_non_grid_mode_is_single() {
        let cfg = Config::parse("SESSION_DIR /s\nIMAGE_DIR /i\nMODE single\n").unwrap();
        assert_eq!(cfg.mode(), DisplayMode::Single);
        let cfg = Config::parse("SESSION_DIR /s\nIMAGE_DIR /i\nMODE whatever\n").unwrap();
        assert_eq!(cfg.mode(), DisplayMode::Single);
    }

    #[test]
    fn test_unknown_directive_names_line() {
        let err = Config::parse("SESSION_DIR /s\nCOLOUR red\n").unwrap_err();
        match err {
            TaggerError::UnknownDirective { line, directive } => {
                assert_eq!(line, 2);
                assert_eq!(directive, "COLOUR");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_undefined_variable() {
        let err = Config::parse("IMAGE_DIR $SESSION_DIR/img\nSESSION_DIR /s\n").unwrap_err();
        assert!(matches!(err, TaggerError::UndefinedVariable { line: 1, .. }));
    }

    #[test]
    fn test_literal_dollar_kept() {
        let cfg = Config::parse("SESSION_DIR /s\nIMAGE_DIR /i/$/x\n").unwrap();
        assert_eq!(cfg.image_dir(), PathBuf::from("/i/$/x"));
    }

    #[test]
    fn test_missing_value_and_required() {
        assert!(matches!(
            Config::parse("SESSION_DIR\n").unwrap_err(),
            TaggerError::MissingValue { line: 1, .. }
        ));
        assert!(matches!(
            Config::parse("SESSION_DIR /s\n").unwrap_err(),
            TaggerError::MissingDirective("IMAGE_DIR")
        ));
    }

    #[test]
    fn test_invalid_numbers() {
        let cfg = Config::parse("SESSION_DIR /s\nIMAGE_DIR /i\nTHUMB_SIZE big\n").unwrap();
        assert!(matches!(cfg.thumb_size(), Err(TaggerError::InvalidValue { .. })));

        let cfg = Config::parse("SESSION_DIR /s\nIMAGE_DIR /i\nMODE grid\nGRID_COLS 0\n").unwrap();
        assert!(cfg.page_size().is_err());
    }

    #[test]
    fn test_marker_must_be_single_symbol() {
        let cfg = Config::parse("SESSION_DIR /s\nIMAGE_DIR /i\nAUTO_ADVANCE_MARKER *\n").unwrap();
        assert_eq!(cfg.marker().unwrap(), '*');
        let cfg = Config::parse("SESSION_DIR /s\nIMAGE_DIR /i\nAUTO_ADVANCE_MARKER x\n").unwrap();
        assert!(cfg.marker().is_err());
    }

    #[test]
    fn test_validate_dirs_creates_tag_dir() {
        let root = TempDir::new().unwrap();
        let session = root.path().join("session");
        let images = root.path().join("images");
        std::fs::create_dir(&session).unwrap();
        std::fs::create_dir(&images).unwrap();

        let text = format!("SESSION_DIR {}\nIMAGE_DIR {}\n", session.display(), images.display());
        let cfg = Config::parse(&text).unwrap();
        cfg.validate_dirs().unwrap();
        assert!(session.join("tags").is_dir());

        let text = format!("SESSION_DIR {}\nIMAGE_DIR {}/missing\n", session.display(), images.display());
        let cfg = Config::parse(&text).unwrap();
        assert!(matches!(cfg.validate_dirs(), Err(TaggerError::MissingDirectory(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let root = TempDir::new().unwrap();
        let err = Config::load(root.path().join("none.conf")).unwrap_err();
        assert!(matches!(err, TaggerError::ConfigNotFound(_)));
    }
}
