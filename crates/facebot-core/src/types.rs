//! Shared types used across facebot.
//!
//! These are the nouns of the system: remote media items, the accounts that
//! publish them, and the records the store keeps about each item.

use crate::error::FacebotError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Identifier of a remote media item.
///
/// Media IDs name output files, so they are restricted to ASCII
/// alphanumerics, `_` and `-`, 1-128 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaId(String);

impl MediaId {
    /// Create a new `MediaId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty, too long, or contains characters
    /// that are not safe in a file name.
    pub fn new(id: impl Into<String>) -> Result<Self, FacebotError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), FacebotError> {
        static MEDIA_ID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = MEDIA_ID_REGEX
            .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("valid regex"));

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(FacebotError::Validation(format!(
                "invalid media ID: must be 1-128 characters of [A-Za-z0-9_-], got '{id}'"
            )))
        }
    }
}

impl TryFrom<String> for MediaId {
    type Error = FacebotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MediaId> for String {
    fn from(id: MediaId) -> Self {
        id.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a remote account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new `AccountId`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A remote identity whose media the crawler polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Remote account ID
    pub id: AccountId,
    /// Public handle, used for the credit line
    pub username: String,
}

impl Account {
    /// Build an account from its parts.
    #[must_use]
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: AccountId::new(id),
            username: username.into(),
        }
    }
}

/// One piece of remote content. Immutable once observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Stable, globally unique media ID
    pub id: MediaId,
    /// Where the image can be fetched from
    pub url: String,
    /// Owning account
    pub account_id: AccountId,
    /// Owning account's username
    pub username: String,
}

/// Lifecycle state of a stored record.
///
/// Records start `Available`. The only transitions are to `Used` or
/// `Rejected`, and both are terminal until an operator reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordState {
    /// Eligible for selection
    Available,
    /// Successfully rendered (and uploaded, when uploading is enabled)
    Used,
    /// A publish attempt failed
    Rejected,
}

impl RecordState {
    /// All states, in display order.
    pub const ALL: [Self; 3] = [Self::Available, Self::Used, Self::Rejected];

    /// Whether moving from `self` to `next` is a permitted transition.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Available, Self::Used | Self::Rejected)
        )
    }

    /// Whether the state is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Available)
    }

    /// Stable string form, as persisted.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Used => "Used",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordState {
    type Err = FacebotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(Self::Available),
            "Used" => Ok(Self::Used),
            "Rejected" => Ok(Self::Rejected),
            other => Err(FacebotError::Validation(format!(
                "unknown record state '{other}'"
            ))),
        }
    }
}

/// The store's persisted unit: a media item plus what ingestion learned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The discovered item
    #[serde(flatten)]
    pub media: MediaItem,
    /// Number of faces detected at ingestion
    pub face_count: u32,
    /// Lifecycle state
    pub state: RecordState,
}

impl Record {
    /// A freshly ingested record.
    #[must_use]
    pub fn available(media: MediaItem, face_count: u32) -> Self {
        Self {
            media,
            face_count,
            state: RecordState::Available,
        }
    }

    /// Shorthand for the media ID.
    #[must_use]
    pub fn id(&self) -> &MediaId {
        &self.media.id
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (@{}, {} faces, {})",
            self.media.id, self.media.username, self.face_count, self.state
        )
    }
}

/// A detected face, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRegion {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}
