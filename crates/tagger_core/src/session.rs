//! Interactive tagging session
//!
//! A [`Session`] owns every piece of mutable state: the tag index, the
//! position in the subset, the active grid tag and the auto-advance timer.
//! The interface layer feeds it [`Command`]s one at a time and renders the
//! [`Response`] it gets back.

use crate::auto_advance::AutoAdvance;
use crate::catalog::{self, Catalog};
use crate::command::Command;
use crate::navigation::{self, NavOutcome, Navigator};
use crate::tag_index::{AddOutcome, DeleteOutcome, TagIndex, ToggleOutcome};
use crate::tags::{TagId, TagRegistry};
use crate::{Config, DisplayMode, Result, TaggerError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One thumbnail slot on a grid page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub cell: usize,
    pub image: u32,
    pub thumbnail: PathBuf,
    /// Whether the image carries the active tag
    pub tagged: bool,
}

/// What the interface layer should show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum View {
    Single {
        image: u32,
        path: PathBuf,
        tags: Vec<String>,
        position: String,
        /// Auto-advance indicator, absent while the timer is stopped
        auto_advance: Option<String>,
    },
    Grid {
        cells: Vec<GridCell>,
        active_tag: Option<String>,
        position: String,
        auto_advance: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub status: Vec<String>,
    pub view: View,
    pub quit: bool,
}

pub struct Session {
    config: Config,
    mode: DisplayMode,
    registry: TagRegistry,
    index: TagIndex,
    catalog: Catalog,
    nav: Navigator,
    timer: AutoAdvance,
    active_tag: Option<TagId>,
}

impl Session {
    /// Run the startup sequence; every failure here is fatal
    pub fn open(config: Config) -> Result<Self> {
        config.validate_dirs()?;

        let tag_dir = config.tag_dir();
        TagIndex::ensure_no_stale_backups(&tag_dir)?;

        let registry = TagRegistry::load(config.tag_file(), config.marker()?)?;
        let index = TagIndex::load(&tag_dir, &registry)?;
        let catalog = catalog::build_catalog(&config)?;
        let subset = catalog::build_subset(&config, &catalog)?;

        let mode = config.mode();
        let step = match mode {
            DisplayMode::Single => 1,
            DisplayMode::Grid => config.page_size()?,
        };
        let nav = Navigator::restore(subset, catalog.len(), step, &navigation::position_file(&config))?;
        let timer = AutoAdvance::new(config.auto_advance_delay()?);

        tracing::info!(
            mode = mode.name(),
            images = catalog.len(),
            subset = nav.len(),
            tags = registry.len(),
            "Session opened at image {}",
            nav.current()
        );

        Ok(Self {
            config,
            mode,
            registry,
            index,
            catalog,
            nav,
            timer,
            active_tag: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn index(&self) -> &TagIndex {
        &self.index
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn auto_advance(&self) -> &AutoAdvance {
        &self.timer
    }

    pub fn active_tag(&self) -> Option<TagId> {
        self.active_tag
    }

    /// How long the caller may wait for input before sending [`Command::Tick`]
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.timer.time_until_next(now)
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Response> {
        self.dispatch_at(command, Instant::now())
    }

    /// Apply one command; interactive errors become status text
    pub fn dispatch_at(&mut self, command: Command, now: Instant) -> Result<Response> {
        tracing::debug!(?command, "Dispatch");

        let mut status = Vec::new();
        let mut quit = false;

        match self.apply(command, now, &mut status, &mut quit) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                tracing::debug!("Interactive error: {}", e);
                status.push(e.user_message());
            }
            Err(e) => {
                tracing::error!("Command failed: {}", e);
                return Err(e);
            }
        }

        Ok(Response {
            status,
            view: self.view(),
            quit,
        })
    }

    fn apply(&mut self, command: Command, now: Instant, status: &mut Vec<String>, quit: &mut bool) -> Result<()> {
        match command {
            Command::Next => {
                let outcome = self.nav.next();
                self.after_navigation(outcome, now, status)
            }
            Command::Previous => {
                let outcome = self.nav.previous();
                self.after_navigation(outcome, now, status)
            }
            Command::First => {
                let outcome = self.nav.first();
                self.after_navigation(outcome, now, status)
            }
            Command::Last => {
                let outcome = self.nav.last();
                self.after_navigation(outcome, now, status)
            }
            Command::Goto(id) => {
                let before = self.nav.offset();
                let reached = self.nav.goto_nearest(id)?;
                if reached != id {
                    status.push(format!("Image {} not in subset; showing {}", id, reached));
                }
                if self.nav.offset() == before {
                    return Ok(());
                }
                self.after_navigation(NavOutcome::Moved, now, status)
            }
            Command::Key(key) => self.press_key(key, now, status),
            Command::AddTag { tag, image } => {
                let image = self.target_image(image)?;
                self.add(tag, image, status)
            }
            Command::DeleteTag { tag, image } => {
                let image = self.target_image(image)?;
                self.delete(tag, image, status)
            }
            Command::ToggleCell(cell) => self.toggle_cell(cell, status),
            Command::SetActiveTag(tag) => self.set_active_tag(tag, status),
            Command::ShowTags => {
                self.show_tags(status);
                Ok(())
            }
            Command::ShowCounts => {
                for (tag, count) in self.index.counts() {
                    status.push(format!("{:>4} {:<16} {}", tag, self.label(tag), count));
                }
                Ok(())
            }
            Command::ExportSubset { tag, path } => self.export(tag, &path, status),
            Command::ToggleAutoAdvance => {
                if !self.timer.is_running() && self.nav.is_at_last() {
                    status.push("At last image".to_string());
                    return Ok(());
                }
                let running = self.timer.toggle(now);
                tracing::info!(running, "Auto-advance toggled");
                status.push(match running {
                    true => format!("Auto-advance on ({:.1}s)", self.timer.interval().as_secs_f32()),
                    false => "Auto-advance off".to_string(),
                });
                Ok(())
            }
            Command::AdjustDelay(delta) => {
                let interval = self.timer.adjust_interval(delta, now);
                status.push(format!("Delay {:.2}s", interval.as_secs_f32()));
                Ok(())
            }
            Command::Tick => {
                if self.timer.should_advance(now) {
                    let outcome = self.nav.next();
                    if outcome.moved() {
                        self.nav.persist_position()?;
                    }
                    self.stop_at_last(status);
                }
                Ok(())
            }
            Command::Quit => {
                *quit = true;
                Ok(())
            }
        }
    }

    fn after_navigation(&mut self, outcome: NavOutcome, now: Instant, status: &mut Vec<String>) -> Result<()> {
        match outcome {
            NavOutcome::Moved => {
                self.nav.persist_position()?;
                self.timer.restart(now);
            }
            NavOutcome::AtFirst => status.push("At first image".to_string()),
            NavOutcome::AtLast => status.push("At last image".to_string()),
        }
        self.stop_at_last(status);
        Ok(())
    }

    fn stop_at_last(&mut self, status: &mut Vec<String>) {
        if self.timer.is_running() && self.nav.is_at_last() {
            self.timer.stop();
            tracing::info!("Auto-advance stopped at last image");
            status.push("Auto-advance stopped at last image".to_string());
        }
    }

    fn label(&self, tag: TagId) -> &str {
        self.registry.label(tag).unwrap_or("?")
    }

    fn ensure_tag(&self, tag: TagId) -> Result<()> {
        match self.registry.contains(tag) {
            true => Ok(()),
            false => Err(TaggerError::UnknownTag(tag)),
        }
    }

    fn target_image(&self, image: Option<u32>) -> Result<u32> {
        let max = self.catalog.len() as u32;
        match image {
            None => Ok(self.nav.current()),
            Some(id) if (1..=max).contains(&id) => Ok(id),
            Some(id) => Err(TaggerError::OutOfRange { requested: id, max }),
        }
    }

    fn add(&mut self, tag: TagId, image: u32, status: &mut Vec<String>) -> Result<()> {
        self.ensure_tag(tag)?;
        let message = match self.index.add_tag(tag, image)? {
            AddOutcome::Added => format!("{}: tagged {}", image, self.label(tag)),
            AddOutcome::AlreadyTagged => format!("{}: already tagged {}", image, self.label(tag)),
        };
        status.push(message);
        Ok(())
    }

    fn delete(&mut self, tag: TagId, image: u32, status: &mut Vec<String>) -> Result<()> {
        self.ensure_tag(tag)?;
        let message = match self.index.delete_tag(tag, image)? {
            DeleteOutcome::Removed => format!("{}: removed {}", image, self.label(tag)),
            DeleteOutcome::NotTagged => format!("{}: not tagged {}", image, self.label(tag)),
        };
        status.push(message);
        Ok(())
    }

    fn press_key(&mut self, key: char, now: Instant, status: &mut Vec<String>) -> Result<()> {
        let action = self.registry.resolve_key(key, self.mode)?;

        match self.mode {
            DisplayMode::Grid => match action.tags.first() {
                Some(&tag) => self.set_active_tag(tag, status),
                None => Err(TaggerError::UnboundKey(key)),
            },
            DisplayMode::Single => {
                let image = self.nav.current();
                for tag in action.tags {
                    self.add(tag, image, status)?;
                }
                if action.auto_advance {
                    let outcome = self.nav.next();
                    self.after_navigation(outcome, now, status)?;
                }
                Ok(())
            }
        }
    }

    fn set_active_tag(&mut self, tag: TagId, status: &mut Vec<String>) -> Result<()> {
        if self.mode != DisplayMode::Grid {
            return Err(TaggerError::WrongMode(DisplayMode::Single.name()));
        }
        self.ensure_tag(tag)?;
        self.active_tag = Some(tag);
        status.push(format!("Active tag: {}", self.label(tag)));
        Ok(())
    }

    fn toggle_cell(&mut self, cell: usize, status: &mut Vec<String>) -> Result<()> {
        if self.mode != DisplayMode::Grid {
            return Err(TaggerError::WrongMode(DisplayMode::Single.name()));
        }
        let tag = self.active_tag.ok_or(TaggerError::NoActiveTag)?;
        let image = *self
            .nav
            .current_page()
            .get(cell)
            .ok_or(TaggerError::NoSuchCell(cell))?;

        let message = match self.index.toggle_tag(tag, image)? {
            ToggleOutcome::Added => format!("{}: tagged {}", image, self.label(tag)),
            ToggleOutcome::Removed => format!("{}: removed {}", image, self.label(tag)),
        };
        status.push(message);
        Ok(())
    }

    fn show_tags(&self, status: &mut Vec<String>) {
        for &image in self.nav.current_page() {
            let labels: Vec<&str> = self
                .index
                .tags_for_image(image)
                .into_iter()
                .map(|t| self.label(t))
                .collect();
            status.push(format!("{}: {}", image, labels.join(" ")));
        }
    }

    fn export(&self, tag: TagId, path: &Path, status: &mut Vec<String>) -> Result<()> {
        self.ensure_tag(tag)?;
        let count = self.index.export_subset(tag, path)?;
        status.push(format!("Exported {} images tagged {} to {}", count, self.label(tag), path.display()));
        Ok(())
    }

    /// Current display state
    pub fn view(&self) -> View {
        let position = self.nav.position_label();
        let auto_advance = self.timer.status_label();

        match self.mode {
            DisplayMode::Single => {
                let image = self.nav.current();
                View::Single {
                    image,
                    path: self.catalog.image(image).map(Path::to_path_buf).unwrap_or_default(),
                    tags: self
                        .index
                        .tags_for_image(image)
                        .into_iter()
                        .map(|t| self.label(t).to_string())
                        .collect(),
                    position,
                    auto_advance,
                }
            }
            DisplayMode::Grid => {
                let cells = self
                    .nav
                    .current_page()
                    .iter()
                    .enumerate()
                    .map(|(cell, &image)| GridCell {
                        cell,
                        image,
                        thumbnail: self.catalog.thumbnail(image).map(Path::to_path_buf).unwrap_or_default(),
                        tagged: self
                            .active_tag
                            .and_then(|tag| self.index.is_tagged(tag, image).ok())
                            .unwrap_or(false),
                    })
                    .collect();
                View::Grid {
                    cells,
                    active_tag: self.active_tag.map(|t| self.label(t).to_string()),
                    position,
                    auto_advance,
                }
            }
        }
    }

    /// Persist the position and leave every index file sorted
    pub fn close(self) -> Result<()> {
        self.nav.persist_position()?;
        self.index.flush_all_sorted()?;
        tracing::info!("Session closed at image {}", self.nav.current());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag_index::index_path;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        root: TempDir,
        session: PathBuf,
    }

    impl Fixture {
        fn new(images: usize, tags: &str) -> Self {
            let root = TempDir::new().unwrap();
            let session = root.path().join("session");
            let image_dir = root.path().join("images");
            fs::create_dir(&session).unwrap();
            fs::create_dir(&image_dir).unwrap();
            for i in 1..=images {
                fs::write(image_dir.join(format!("img{}.jpg", i)), b"x").unwrap();
            }
            fs::write(session.join("tags.txt"), tags).unwrap();
            Self { root, session }
        }

        fn config(&self, extra: &str) -> Config {
            let text = format!(
                "SESSION_DIR {}\nIMAGE_DIR {}\n{}",
                self.session.display(),
                self.root.path().join("images").display(),
                extra
            );
            Config::parse(&text).unwrap()
        }

        fn index_file(&self, label: &str) -> String {
            fs::read_to_string(index_path(&self.session.join("tags"), label)).unwrap()
        }

        fn thumbs(&self, count: usize) {
            let dir = self.session.join("thumbs");
            fs::create_dir_all(&dir).unwrap();
            for i in 1..=count {
                fs::write(dir.join(format!("img{}_thumb.jpg", i)), b"t").unwrap();
            }
        }
    }

    const TAGS: &str = "1 cat c\n2+ dog w\n3 bird b+\n";

    fn current(session: &Session) -> u32 {
        session.navigator().current()
    }

    #[test]
    fn test_open_and_navigate() {
        let fx = Fixture::new(3, TAGS);
        let mut session = Session::open(fx.config("")).unwrap();
        assert_eq!(current(&session), 1);

        let resp = session.dispatch(Command::Previous).unwrap();
        assert_eq!(resp.status, vec!["At first image"]);

        session.dispatch(Command::Next).unwrap();
        let resp = session.dispatch(Command::Next).unwrap();
        assert!(resp.status.is_empty());
        match resp.view {
            View::Single { image, ref path, ref position, .. } => {
                assert_eq!(image, 3);
                assert!(path.ends_with("img3.jpg"));
                assert_eq!(position, "3/3");
            }
            other => panic!("unexpected view: {other:?}"),
        }

        let resp = session.dispatch(Command::Next).unwrap();
        assert_eq!(resp.status, vec!["At last image"]);
        assert_eq!(fs::read_to_string(fx.session.join("position.txt")).unwrap(), "3\n");
    }

    #[test]
    fn test_position_survives_reopen() {
        let fx = Fixture::new(5, TAGS);
        let mut session = Session::open(fx.config("")).unwrap();
        session.dispatch(Command::Goto(4)).unwrap();
        session.close().unwrap();

        let session = Session::open(fx.config("")).unwrap();
        assert_eq!(current(&session), 4);
    }

    #[test]
    fn test_key_tags_and_advances() {
        let fx = Fixture::new(3, TAGS);
        let mut session = Session::open(fx.config("")).unwrap();

        let resp = session.dispatch(Command::Key('c')).unwrap();
        assert_eq!(resp.status, vec!["1: tagged cat"]);
        assert_eq!(current(&session), 1);

        let resp = session.dispatch(Command::Key('c')).unwrap();
        assert_eq!(resp.status, vec!["1: already tagged cat"]);

        // Digit 2 carries the marker: tag then advance
        session.dispatch(Command::Key('2')).unwrap();
        assert_eq!(current(&session), 2);
        assert!(session.index().is_tagged(2, 1).unwrap());

        // Key-level marker
        session.dispatch(Command::Key('b')).unwrap();
        assert_eq!(current(&session), 3);
        assert!(session.index().is_tagged(3, 2).unwrap());

        let resp = session.dispatch(Command::Key('z')).unwrap();
        assert_eq!(resp.status, vec!["Unrecognized key: z"]);
        assert_eq!(current(&session), 3);
    }

    #[test]
    fn test_add_delete_commands() {
        let fx = Fixture::new(5, TAGS);
        let mut session = Session::open(fx.config("")).unwrap();

        session.dispatch(Command::AddTag { tag: 1, image: Some(5) }).unwrap();
        session.dispatch(Command::AddTag { tag: 1, image: Some(2) }).unwrap();
        session.dispatch(Command::AddTag { tag: 1, image: None }).unwrap();
        assert_eq!(fx.index_file("cat"), "5\n2\n1\n");

        let resp = session.dispatch(Command::DeleteTag { tag: 1, image: Some(2) }).unwrap();
        assert_eq!(resp.status, vec!["2: removed cat"]);
        assert_eq!(fx.index_file("cat"), "1\n5\n");

        let resp = session.dispatch(Command::DeleteTag { tag: 1, image: Some(2) }).unwrap();
        assert_eq!(resp.status, vec!["2: not tagged cat"]);

        let resp = session.dispatch(Command::AddTag { tag: 9, image: None }).unwrap();
        assert_eq!(resp.status, vec!["No such tag: 9"]);

        let resp = session.dispatch(Command::AddTag { tag: 1, image: Some(6) }).unwrap();
        assert_eq!(resp.status, vec!["No image 6 (valid: 1-5)"]);
        assert_eq!(session.index().images_for_tag(1).unwrap(), vec![1, 5]);

        session.dispatch(Command::AddTag { tag: 1, image: Some(3) }).unwrap();
        session.close().unwrap();
        assert_eq!(fx.index_file("cat"), "1\n3\n5\n");
    }

    #[test]
    fn test_goto_nearest_in_subset() {
        let fx = Fixture::new(20, TAGS);
        let subset = fx.session.join("few.txt");
        fs::write(&subset, "3\n7\n9\n15\n20\n").unwrap();
        let mut session = Session::open(fx.config(&format!("SUBSET_FILE {}\n", subset.display()))).unwrap();
        assert_eq!(current(&session), 3);

        let resp = session.dispatch(Command::Goto(10)).unwrap();
        assert_eq!(resp.status, vec!["Image 10 not in subset; showing 9"]);
        assert_eq!(current(&session), 9);
        assert_eq!(fs::read_to_string(fx.session.join("position_few.txt")).unwrap(), "9\n");

        let resp = session.dispatch(Command::Goto(21)).unwrap();
        assert_eq!(resp.status, vec!["No image 21 (valid: 1-20)"]);
        assert_eq!(current(&session), 9);
    }

    #[test]
    fn test_stale_backup_blocks_startup_first() {
        let fx = Fixture::new(2, TAGS);
        let tags = fx.session.join("tags");
        fs::create_dir(&tags).unwrap();
        fs::write(tags.join("cat.txt.bak"), "1\n").unwrap();
        // A broken tag file must not be reached
        fs::write(fx.session.join("tags.txt"), "garbage line here now\n").unwrap();

        assert!(matches!(
            Session::open(fx.config("")),
            Err(TaggerError::StaleBackupPresent(_))
        ));
        assert!(!fx.session.join("images.txt").exists());
    }

    #[test]
    fn test_auto_advance_ticks_and_stops_at_last() {
        let fx = Fixture::new(3, TAGS);
        let mut session = Session::open(fx.config("AUTO_ADVANCE_DELAY 500\n")).unwrap();
        let t0 = Instant::now();

        let resp = session.dispatch_at(Command::ToggleAutoAdvance, t0).unwrap();
        assert_eq!(resp.status, vec!["Auto-advance on (0.5s)"]);
        assert_eq!(session.next_deadline(t0), Some(Duration::from_millis(500)));

        session.dispatch_at(Command::Tick, t0 + Duration::from_millis(100)).unwrap();
        assert_eq!(current(&session), 1);

        session.dispatch_at(Command::Tick, t0 + Duration::from_millis(500)).unwrap();
        assert_eq!(current(&session), 2);

        // Manual navigation pushes the next tick out a full interval
        session.dispatch_at(Command::Previous, t0 + Duration::from_millis(700)).unwrap();
        session.dispatch_at(Command::Tick, t0 + Duration::from_millis(1000)).unwrap();
        assert_eq!(current(&session), 1);

        session.dispatch_at(Command::Tick, t0 + Duration::from_millis(1200)).unwrap();
        let resp = session.dispatch_at(Command::Tick, t0 + Duration::from_millis(1700)).unwrap();
        assert_eq!(current(&session), 3);
        assert_eq!(resp.status, vec!["Auto-advance stopped at last image"]);
        assert!(!session.auto_advance().is_running());

        let resp = session.dispatch_at(Command::ToggleAutoAdvance, t0).unwrap();
        assert_eq!(resp.status, vec!["At last image"]);
    }

    #[test]
    fn test_view_shows_auto_advance_state() {
        let fx = Fixture::new(3, TAGS);
        let mut session = Session::open(fx.config("AUTO_ADVANCE_DELAY 1500\n")).unwrap();
        let t0 = Instant::now();

        let auto = |view: &View| match view {
            View::Single { auto_advance, .. } | View::Grid { auto_advance, .. } => auto_advance.clone(),
        };
        assert_eq!(auto(&session.view()), None);

        let resp = session.dispatch_at(Command::ToggleAutoAdvance, t0).unwrap();
        assert_eq!(auto(&resp.view).as_deref(), Some("Auto 1.5s"));

        let json = serde_json::to_value(&resp.view).unwrap();
        assert_eq!(json["auto_advance"], "Auto 1.5s");

        let resp = session.dispatch_at(Command::ToggleAutoAdvance, t0).unwrap();
        assert_eq!(auto(&resp.view), None);
    }

    #[test]
    fn test_adjust_delay() {
        let fx = Fixture::new(3, TAGS);
        let mut session = Session::open(fx.config("")).unwrap();
        let resp = session.dispatch(Command::AdjustDelay(250)).unwrap();
        assert_eq!(resp.status, vec!["Delay 1.75s"]);
        assert_eq!(session.auto_advance().interval(), Duration::from_millis(1750));
    }

    #[test]
    fn test_grid_mode_active_tag_toggle() {
        let fx = Fixture::new(6, TAGS);
        fx.thumbs(6);
        let mut session = Session::open(fx.config("MODE grid\nGRID_ROWS 1\nGRID_COLS 4\n")).unwrap();

        let resp = session.dispatch(Command::ToggleCell(0)).unwrap();
        assert_eq!(resp.status, vec!["Select an active tag first"]);

        // Keys pick the active tag in grid mode
        let resp = session.dispatch(Command::Key('w')).unwrap();
        assert_eq!(resp.status, vec!["Active tag: dog"]);
        assert_eq!(session.active_tag(), Some(2));
        assert!(session.index().images_for_tag(2).unwrap().is_empty());

        let resp = session.dispatch(Command::ToggleCell(2)).unwrap();
        assert_eq!(resp.status, vec!["3: tagged dog"]);
        match &resp.view {
            View::Grid { cells, active_tag, position, .. } => {
                assert_eq!(cells.len(), 4);
                assert!(cells[2].tagged);
                assert!(!cells[0].tagged);
                assert!(cells[2].thumbnail.ends_with("img3_thumb.jpg"));
                assert_eq!(active_tag.as_deref(), Some("dog"));
                assert_eq!(position, "1/6");
            }
            other => panic!("unexpected view: {other:?}"),
        }

        session.dispatch(Command::ToggleCell(2)).unwrap();
        assert!(!session.index().is_tagged(2, 3).unwrap());

        session.dispatch(Command::Next).unwrap();
        let resp = session.dispatch(Command::ToggleCell(3)).unwrap();
        assert_eq!(resp.status, vec!["No thumbnail cell 3 on this page"]);
    }

    #[test]
    fn test_grid_rejects_shared_key() {
        let fx = Fixture::new(2, "1 cat x\n2 dog x\n");
        fx.thumbs(2);
        let mut session = Session::open(fx.config("MODE grid\n")).unwrap();
        let resp = session.dispatch(Command::Key('x')).unwrap();
        assert_eq!(resp.status.len(), 1);
        assert!(session.active_tag().is_none());
    }

    #[test]
    fn test_single_mode_rejects_grid_commands() {
        let fx = Fixture::new(2, TAGS);
        let mut session = Session::open(fx.config("")).unwrap();
        let resp = session.dispatch(Command::SetActiveTag(1)).unwrap();
        assert_eq!(resp.status, vec!["Command not available in single-image mode"]);
    }

    #[test]
    fn test_queries_and_export() {
        let fx = Fixture::new(4, TAGS);
        let mut session = Session::open(fx.config("")).unwrap();
        session.dispatch(Command::AddTag { tag: 1, image: Some(1) }).unwrap();
        session.dispatch(Command::AddTag { tag: 3, image: Some(1) }).unwrap();
        session.dispatch(Command::AddTag { tag: 1, image: Some(4) }).unwrap();

        let resp = session.dispatch(Command::ShowTags).unwrap();
        assert_eq!(resp.status, vec!["1: cat bird"]);

        let resp = session.dispatch(Command::ShowCounts).unwrap();
        assert_eq!(resp.status.len(), 3);
        assert!(resp.status[0].contains("cat"));
        assert!(resp.status[0].ends_with('2'));

        let out = fx.session.join("cats.txt");
        session.dispatch(Command::ExportSubset { tag: 1, path: out.clone() }).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "1\n4\n");

        let resp = session.dispatch(Command::Quit).unwrap();
        assert!(resp.quit);
    }
}
