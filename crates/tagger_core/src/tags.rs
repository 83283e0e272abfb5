//! Tag definitions and key bindings
//!
//! Each line of the tag file is `id[marker] label [keys]`, e.g.
//!
//! ```text
//! 1  cat   cC+
//! 2+ dog   w
//! 12 other o
//! ```
//!
//! Tags 1..9 are always reachable through their digit. The marker after an
//! id or after a key means "advance to the next image after applying".

use crate::{DisplayMode, Result, TaggerError};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

pub type TagId = u32;

/// Member of a key's binding set meaning "auto-advance after applying"
pub const AUTO_ADVANCE: TagId = 0;

/// Keys the interface layer uses for commands; tags cannot claim them
pub const RESERVED_KEYS: &[char] = &['q', 'n', 'p', 'g', 'd', 's', 'a', 'f', 'l', '[', ']', '?', ' '];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub label: String,
    pub auto_advance: bool,
}

/// What pressing a key does
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAction {
    pub tags: Vec<TagId>,
    pub auto_advance: bool,
}

/// Tag definitions loaded once per session
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: BTreeMap<TagId, Tag>,
    by_label: HashMap<String, TagId>,
    bindings: BTreeMap<char, BTreeSet<TagId>>,
}

impl TagRegistry {
    /// Load the tag definition file
    pub fn load<P: AsRef<Path>>(path: P, marker: char) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TaggerError::TagFileMissing(path.to_path_buf()),
            _ => TaggerError::Io(e),
        })?;

        let registry = Self::parse(&content, marker)?;
        tracing::info!(
            "Loaded {} tags, {} key bindings from {:?}",
            registry.tags.len(),
            registry.bindings.len(),
            path
        );
        Ok(registry)
    }

    /// Parse tag definitions
    pub fn parse(text: &str, marker: char) -> Result<Self> {
        let mut registry = Self::default();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let fields: Vec<&str> = raw.split_whitespace().collect();

            match fields.as_slice() {
                [] => continue,
                [id, label] => registry.add_line(line, id, label, "", marker)?,
                [id, label, keys] => registry.add_line(line, id, label, keys, marker)?,
                _ => {
                    return Err(TaggerError::MalformedTagLine {
                        line,
                        reason: format!("expected `id label [keys]`, found {} fields", fields.len()),
                    })
                }
            }
        }

        Ok(registry)
    }

    fn add_line(&mut self, line: usize, id_field: &str, label: &str, keys: &str, marker: char) -> Result<()> {
        let (id_text, auto_advance) = match id_field.strip_suffix(marker) {
            Some(stripped) => (stripped, true),
            None => (id_field, false),
        };

        let id = match id_text.parse::<TagId>() {
            Ok(id) if id != AUTO_ADVANCE => id,
            _ => {
                return Err(TaggerError::MalformedTagLine {
                    line,
                    reason: format!("tag id must be a positive integer, found {:?}", id_field),
                })
            }
        };

        // The label names the tag's index file inside TAG_DIR
        if label == "." || label == ".." || label.contains(['/', '\\']) {
            return Err(TaggerError::MalformedTagLine {
                line,
                reason: format!("tag label {:?} is not usable as a file name", label),
            });
        }

        if self.tags.contains_key(&id) {
            return Err(TaggerError::DuplicateTagId { line, id });
        }
        if self.by_label.contains_key(label) {
            return Err(TaggerError::DuplicateLabel {
                line,
                label: label.to_string(),
            });
        }

        // Validate the whole key string before touching any binding.
        let mut parsed: Vec<(char, bool)> = Vec::new();
        for c in keys.chars() {
            if c == marker {
                match parsed.last_mut() {
                    Some((_, advance)) => *advance = true,
                    None => return Err(TaggerError::MarkerWithoutKey { line }),
                }
                continue;
            }
            if c.is_ascii_digit() {
                return Err(TaggerError::DigitKeyNotAllowed { line, key: c });
            }
            if RESERVED_KEYS.contains(&c) {
                return Err(TaggerError::ReservedKeyConflict { line, key: c });
            }
            parsed.push((c, false));
        }

        if let Some(digit) = char::from_digit(id, 10) {
            parsed.push((digit, auto_advance));
        }

        for (key, advance) in parsed {
            let set = self.bindings.entry(key).or_default();
            set.insert(id);
            if advance {
                set.insert(AUTO_ADVANCE);
            }
        }

        self.by_label.insert(label.to_string(), id);
        self.tags.insert(
            id,
            Tag {
                id,
                label: label.to_string(),
                auto_advance,
            },
        );
        Ok(())
    }

    pub fn get(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(&id)
    }

    pub fn contains(&self, id: TagId) -> bool {
        self.tags.contains_key(&id)
    }

    pub fn label(&self, id: TagId) -> Option<&str> {
        self.tags.get(&id).map(|t| t.label.as_str())
    }

    pub fn id_for_label(&self, label: &str) -> Option<TagId> {
        self.by_label.get(label).copied()
    }

    /// Tags in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Raw binding set for a key, including the [`AUTO_ADVANCE`] sentinel
    pub fn binding(&self, key: char) -> Option<&BTreeSet<TagId>> {
        self.bindings.get(&key)
    }

    /// Resolve a key press to the tags it applies
    pub fn resolve_key(&self, key: char, mode: DisplayMode) -> Result<KeyAction> {
        let set = self.bindings.get(&key).ok_or(TaggerError::UnboundKey(key))?;

        let tags: Vec<TagId> = set.iter().copied().filter(|&t| t != AUTO_ADVANCE).collect();
        if mode == DisplayMode::Grid && tags.len() > 1 {
            return Err(TaggerError::AmbiguousKey(key));
        }

        Ok(KeyAction {
            tags,
            auto_advance: set.contains(&AUTO_ADVANCE),
        })
    }

    /// Resolve a tag given as id or label
    pub fn lookup(&self, token: &str) -> Result<TagId> {
        match token.parse::<TagId>() {
            Ok(id) if self.contains(id) => Ok(id),
            Ok(id) => Err(TaggerError::UnknownTag(id)),
            Err(_) => self
                .id_for_label(token)
                .ok_or_else(|| TaggerError::UnknownLabel(token.to_string())),
        }
    }
}
