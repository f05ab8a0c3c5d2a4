//! Caption rotation and credit line.

use rand::seq::SliceRandom;
use std::io;
use std::path::Path;

/// Build the credit line for a source account.
#[must_use]
pub fn credit_line(username: &str) -> String {
    format!("photocred goes to: @{username}")
}

/// Cycles through configured captions, wrapping after the last one.
///
/// Owned by the orchestrator control task, so a single cursor serves every
/// publish trigger.
#[derive(Debug, Clone, Default)]
pub struct CaptionRotation {
    captions: Vec<String>,
    cursor: usize,
}

impl CaptionRotation {
    /// Rotate over `captions` in the given order.
    #[must_use]
    pub fn new(captions: Vec<String>) -> Self {
        Self {
            captions,
            cursor: 0,
        }
    }

    /// Read captions from a file, one per non-empty line.
    pub fn load(path: &Path) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(parse_captions(&content)))
    }

    /// Shuffle the caption order and restart the rotation.
    #[must_use]
    pub fn shuffled(mut self) -> Self {
        self.captions.shuffle(&mut rand::thread_rng());
        self.cursor = 0;
        self
    }

    /// Number of configured captions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.captions.len()
    }

    /// True when no captions are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    /// Build the next full caption for a post crediting `username`.
    ///
    /// Without captions this is just the credit line. Otherwise it is the
    /// next caption, a blank line, then the credit line.
    pub fn next_caption(&mut self, username: &str) -> String {
        let credit = credit_line(username);
        if self.captions.is_empty() {
            return credit;
        }

        let caption = &self.captions[self.cursor % self.captions.len()];
        self.cursor = (self.cursor + 1) % self.captions.len();
        format!("{caption}\n\n{credit}")
    }
}

fn parse_captions(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
