//! Terminal input decoding
//!
//! Each stdin line is one command. A bare character that is not a command
//! word is treated as a tag key press.

use std::path::PathBuf;
use tagger_core::{Command, TagRegistry, TaggerError};

/// Delay step for the `[` and `]` shortcuts, in milliseconds
pub const DELAY_STEP_MS: i64 = 250;

pub const HELP: &[&str] = &[
    "n / p / f / l      next, previous, first, last (empty line = next)",
    "g <id>             go to image (nearest in subset)",
    "<key> | k <key>    tag key",
    "+<tag> [id]        add tag (current image by default)",
    "-<tag> [id]        delete tag; also `d <tag> [id]`",
    "c <cell>           grid: toggle active tag on cell (from 1)",
    "active <tag>       grid: set active tag",
    "s | counts         tags of current image(s) | images per tag",
    "export <tag> <path>  write a tag's images as a subset file",
    "a | delay <ms> | [ | ]   auto-advance on/off, adjust delay",
    "q                  quit",
];

/// Result of decoding one line
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Help,
    Empty,
}

/// Why a line could not be decoded; shown as status text
#[derive(Debug, PartialEq, Eq)]
pub struct InputError(pub String);

impl From<TaggerError> for InputError {
    fn from(e: TaggerError) -> Self {
        InputError(e.user_message())
    }
}

fn usage(text: &str) -> InputError {
    InputError(format!("Usage: {}", text))
}

fn parse_number<T: std::str::FromStr>(token: Option<&str>, what: &str) -> Result<T, InputError> {
    let token = token.ok_or_else(|| InputError(format!("Missing {}", what)))?;
    token
        .parse()
        .map_err(|_| InputError(format!("Not a valid {}: {}", what, token)))
}

fn single_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// `+cat`, `+cat 12`, `-2 7`
fn tag_edit(tag: &str, rest: &[&str], registry: &TagRegistry, add: bool) -> Result<Command, InputError> {
    if tag.is_empty() {
        return Err(usage(if add { "+<tag> [id]" } else { "-<tag> [id]" }));
    }
    let tag = registry.lookup(tag)?;
    let image = match rest.first() {
        Some(id) => Some(parse_number::<u32>(Some(id), "image id")?),
        None => None,
    };
    Ok(match add {
        true => Command::AddTag { tag, image },
        false => Command::DeleteTag { tag, image },
    })
}

/// Decode one input line
pub fn parse_line(line: &str, registry: &TagRegistry) -> Result<Input, InputError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let (head, rest) = match tokens.split_first() {
        Some((head, rest)) => (*head, rest),
        // Enter on its own moves on, like space in a viewer
        None if line.is_empty() => return Ok(Input::Command(Command::Next)),
        None => return Ok(Input::Empty),
    };

    let command = match head {
        "n" => Command::Next,
        "p" => Command::Previous,
        "f" => Command::First,
        "l" => Command::Last,
        "g" => Command::Goto(parse_number(rest.first().copied(), "image id")?),
        // A bare `k` is the tag key `k` itself
        "k" if rest.is_empty() => Command::Key('k'),
        "k" => Command::Key(single_char(rest[0]).ok_or_else(|| usage("k <key>"))?),
        "d" => {
            let tag = rest.first().ok_or_else(|| usage("d <tag> [id]"))?;
            tag_edit(tag, &rest[1..], registry, false)?
        }
        "c" if !rest.is_empty() => {
            let cell: usize = parse_number(rest.first().copied(), "cell")?;
            match cell.checked_sub(1) {
                Some(cell) => Command::ToggleCell(cell),
                None => return Err(InputError("Cells are numbered from 1".to_string())),
            }
        }
        "active" => {
            let tag = rest.first().ok_or_else(|| usage("active <tag>"))?;
            Command::SetActiveTag(registry.lookup(tag)?)
        }
        "s" => Command::ShowTags,
        "counts" => Command::ShowCounts,
        "export" => match rest {
            [tag, path] => Command::ExportSubset {
                tag: registry.lookup(tag)?,
                path: PathBuf::from(*path),
            },
            _ => return Err(usage("export <tag> <path>")),
        },
        "a" => Command::ToggleAutoAdvance,
        "delay" => Command::AdjustDelay(parse_number(rest.first().copied(), "delay change")?),
        "[" => Command::AdjustDelay(-DELAY_STEP_MS),
        "]" => Command::AdjustDelay(DELAY_STEP_MS),
        "q" => Command::Quit,
        "?" | "help" => return Ok(Input::Help),
        _ => {
            if let Some(tag) = head.strip_prefix('+') {
                tag_edit(tag, rest, registry, true)?
            } else if let Some(tag) = head.strip_prefix('-').filter(|t| !t.is_empty()) {
                tag_edit(tag, rest, registry, false)?
            } else if let Some(key) = single_char(head).filter(|_| rest.is_empty()) {
                Command::Key(key)
            } else {
                return Err(InputError(format!("Unknown command: {}", line.trim())));
            }
        }
    };

    Ok(Input::Command(command))
}
