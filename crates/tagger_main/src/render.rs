//! Terminal output of session responses

use std::io::{self, Write};
use tagger_core::{Response, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    /// One JSON object per response, for driving the tagger from a script
    Json,
}

pub struct Renderer {
    format: OutputFormat,
    columns: usize,
    last_view: Option<View>,
}

impl Renderer {
    pub fn new(format: OutputFormat, columns: usize) -> Self {
        Self {
            format,
            columns: columns.max(1),
            last_view: None,
        }
    }

    /// Print a response; an unchanged view with no status prints nothing
    pub fn response(&mut self, response: &Response) -> anyhow::Result<()> {
        let changed = self.last_view.as_ref() != Some(&response.view);
        if !changed && response.status.is_empty() {
            return Ok(());
        }

        let mut out = io::stdout().lock();
        match self.format {
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(response)?)?,
            OutputFormat::Text => {
                for line in &response.status {
                    writeln!(out, "{}", line)?;
                }
                if changed {
                    self.write_view(&mut out, &response.view)?;
                }
            }
        }
        out.flush()?;

        self.last_view = Some(response.view.clone());
        Ok(())
    }

    /// Status text that did not come from the session
    pub fn message(&self, lines: &[&str]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        match self.format {
            OutputFormat::Json => {
                writeln!(out, "{}", serde_json::json!({ "status": lines }))?;
            }
            OutputFormat::Text => {
                for line in lines {
                    writeln!(out, "{}", line)?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }

    fn write_view(&self, out: &mut impl Write, view: &View) -> io::Result<()> {
        match view {
            View::Single {
                image,
                path,
                tags,
                position,
                auto_advance,
            } => {
                writeln!(
                    out,
                    "[{}] #{} {}{}",
                    position,
                    image,
                    path.display(),
                    timer_suffix(auto_advance)
                )?;
                if !tags.is_empty() {
                    writeln!(out, "    tags: {}", tags.join(" "))?;
                }
            }
            View::Grid {
                cells,
                active_tag,
                position,
                auto_advance,
            } => {
                writeln!(
                    out,
                    "[{}] active: {}{}",
                    position,
                    active_tag.as_deref().unwrap_or("-"),
                    timer_suffix(auto_advance)
                )?;
                for row in cells.chunks(self.columns) {
                    let line: Vec<String> = row
                        .iter()
                        .map(|c| {
                            let mark = if c.tagged { '*' } else { ' ' };
                            format!("{:>3}:#{:<6}{}", c.cell + 1, c.image, mark)
                        })
                        .collect();
                    writeln!(out, "{}", line.join(" "))?;
                }
            }
        }
        Ok(())
    }
}

fn timer_suffix(auto_advance: &Option<String>) -> String {
    auto_advance.as_deref().map(|a| format!("  [{}]", a)).unwrap_or_default()
}
