//! Classification of scenario tags into fixture categories.

use std::fmt;
use std::str::FromStr;

/// A tag the lifecycle manager understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `@board`: read-only use of the shared board.
    Board,
    /// `@board-create`: the scenario creates a board.
    BoardCreate,
    /// `@board-destructive`: the scenario renames or deletes its board.
    BoardDestructive,
    /// `@card`: a fresh card on the shared board's list.
    Card,
    /// `@card-create`: the scenario creates a card on a private board.
    CardCreate,
    /// `@card-destructive`: the scenario mutates or deletes its card.
    CardDestructive,
    /// `@skip`: the scenario is excluded.
    Skip,
}

impl Tag {
    /// Every fixture tag, in vocabulary order.
    pub const ALL: [Self; 7] = [
        Self::Board,
        Self::BoardCreate,
        Self::BoardDestructive,
        Self::Card,
        Self::CardCreate,
        Self::CardDestructive,
        Self::Skip,
    ];

    /// The tag as written in feature files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Board => "@board",
            Self::BoardCreate => "@board-create",
            Self::BoardDestructive => "@board-destructive",
            Self::Card => "@card",
            Self::CardCreate => "@card-create",
            Self::CardDestructive => "@card-destructive",
            Self::Skip => "@skip",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a fixture tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a fixture tag")]
pub struct UnknownTag(pub String);

impl FromStr for Tag {
    type Err = UnknownTag;

    /// Parse a tag with or without its leading `@`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed.strip_prefix('@').unwrap_or(trimmed);
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().strip_prefix('@') == Some(bare))
            .ok_or_else(|| UnknownTag(trimmed.to_owned()))
    }
}

/// The fixture behaviour a scenario receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioCategory {
    /// Excluded from the run.
    Skipped,
    /// No fixture setup or teardown.
    Untagged,
    /// Bound to the shared board.
    BoardShared,
    /// Given a private board.
    BoardPrivate,
    /// Bound to the shared board and list, given a fresh card.
    CardShared,
    /// Given a private board, its first list and a fresh card.
    CardPrivate,
}

impl ScenarioCategory {
    /// Every category.
    pub const ALL: [Self; 6] = [
        Self::Skipped,
        Self::Untagged,
        Self::BoardShared,
        Self::BoardPrivate,
        Self::CardShared,
        Self::CardPrivate,
    ];

    /// Classify a scenario's tags.
    ///
    /// `@skip` wins over everything; card tags outrank board tags; private
    /// outranks shared. Tags outside the fixture vocabulary are ignored.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let known: Vec<Tag> = tags
            .into_iter()
            .filter_map(|tag| tag.as_ref().parse().ok())
            .collect();
        let has = |wanted: &[Tag]| known.iter().any(|tag| wanted.contains(tag));

        if has(&[Tag::Skip]) {
            Self::Skipped
        } else if has(&[Tag::CardCreate, Tag::CardDestructive]) {
            Self::CardPrivate
        } else if has(&[Tag::Card]) {
            Self::CardShared
        } else if has(&[Tag::BoardCreate, Tag::BoardDestructive]) {
            Self::BoardPrivate
        } else if has(&[Tag::Board]) {
            Self::BoardShared
        } else {
            Self::Untagged
        }
    }

    /// Whether scenarios in this category run at all.
    #[must_use]
    pub const fn runs(self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

impl fmt::Display for ScenarioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Skipped => "skipped",
            Self::Untagged => "untagged",
            Self::BoardShared => "shared board",
            Self::BoardPrivate => "private board",
            Self::CardShared => "card on shared board",
            Self::CardPrivate => "card on private board",
        };
        f.write_str(label)
    }
}
