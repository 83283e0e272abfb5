//! Image tagger core domain logic
//!
//! This crate contains:
//! - Configuration
//! - Error types
//! - Image catalog and subset
//! - Tag registry and tag index store
//! - Navigation and auto-advance
//! - Command system and session state
//! - Thumbnail generation

pub mod auto_advance;
pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod navigation;
pub mod session;
pub mod tag_index;
pub mod tags;
pub mod thumbnail;

pub use auto_advance::{AutoAdvance, AutoAdvanceState};
pub use catalog::Catalog;
pub use command::Command;
pub use config::{Config, Directive, DisplayMode};
pub use error::{Result, TaggerError};
pub use navigation::{NavOutcome, Navigator};
pub use session::{GridCell, Response, Session, View};
pub use tag_index::TagIndex;
pub use tags::{KeyAction, Tag, TagId, TagRegistry, RESERVED_KEYS};
pub use thumbnail::{ThumbnailGenerator, ThumbnailReport};
