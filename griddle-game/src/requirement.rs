//! The closed set of requirement (policy-gate) variants.
//!
//! Every piece of gated content - dialogue lines, store offers, diner props,
//! tutorial steps, tasks, chapters - carries a list of these. An instance is
//! built once by the factory from authored JSON and is immutable afterwards;
//! it owns none of the state it inspects.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::operators::{ComparisonOperator, StringComparisonOperator};

/// Account tier, ordered Guest < Free < Premium.
///
/// The declaration order is load-bearing: `account` requirements compare
/// tiers ordinally, so `greaterThanEqual Free` holds for Free and Premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Entitlement {
    Guest,
    Free,
    Premium,
}

impl Entitlement {
    /// Authored keys accepted in config, for parse error messages.
    pub const ALLOWED_KEYS: &'static str = "Guest, Free, Premium";

    /// Resolve an authored tier name; `None` for anything outside the set.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Guest" => Some(Self::Guest),
            "Free" => Some(Self::Free),
            "Premium" => Some(Self::Premium),
            _ => None,
        }
    }
}

/// Wall-clock comparison mode for `date` requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateOperator {
    Before,
    After,
    InRange,
}

impl DateOperator {
    pub const ALLOWED_KEYS: &'static str = "before, after, inRange";

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "before" => Some(Self::Before),
            "after" => Some(Self::After),
            "inRange" => Some(Self::InRange),
            _ => None,
        }
    }
}

/// Seen-flag comparison used by dialogue and tutorial requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeenOperator {
    HasSeen,
    HasNotSeen,
}

impl SeenOperator {
    pub const ALLOWED_KEYS: &'static str = "hasSeen, hasNotSeen";

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "hasSeen" => Some(Self::HasSeen),
            "hasNotSeen" => Some(Self::HasNotSeen),
            _ => None,
        }
    }
}

/// Completion mode for `levelId` requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PuzzleOperator {
    Complete,
    Incomplete,
    IsNext,
}

impl PuzzleOperator {
    pub const ALLOWED_KEYS: &'static str = "complete, incomplete, isNext";

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "complete" => Some(Self::Complete),
            "incomplete" => Some(Self::Incomplete),
            "isNext" => Some(Self::IsNext),
            _ => None,
        }
    }
}

/// A single declarative gate condition.
///
/// The tag uniquely determines the field set; extending the vocabulary means
/// touching the factory and evaluator too, which the exhaustive matches in
/// both enforce at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "requirementType", rename_all = "camelCase")]
pub enum Requirement {
    /// Wall-clock window. `end_date` is only meaningful (and mandatory at
    /// parse time) for `inRange`.
    #[serde(rename_all = "camelCase")]
    Date {
        date: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_date: Option<DateTime<Utc>>,
        operator: DateOperator,
    },
    /// Compares the player's highest completed puzzle number.
    #[serde(rename_all = "camelCase")]
    Level {
        level: u32,
        operator: ComparisonOperator,
    },
    /// Compares against a specific puzzle by id.
    #[serde(rename_all = "camelCase")]
    LevelId {
        level_id: String,
        operator: PuzzleOperator,
    },
    /// Compares the held quantity of an inventory item.
    #[serde(rename_all = "camelCase")]
    Inventory {
        item_id: String,
        item_count: u32,
        operator: ComparisonOperator,
    },
    /// Whether a dialogue has been viewed.
    #[serde(rename_all = "camelCase")]
    Dialogue {
        dialogue_id: String,
        operator: SeenOperator,
    },
    /// Compares the id of the prop currently placed in a diner node.
    #[serde(rename_all = "camelCase")]
    PropInNode {
        prop_id: String,
        node_id: String,
        operator: StringComparisonOperator,
    },
    /// Whether the prop placed in a diner node carries a given tag.
    #[serde(rename_all = "camelCase")]
    PropHasTagInNode { tag: String, node_id: String },
    /// Whether every task in a chapter is complete.
    #[serde(rename_all = "camelCase")]
    ChapterComplete { chapter_id: String },
    /// Whether a specific task's completion count is satisfied.
    #[serde(rename_all = "camelCase")]
    TaskComplete { task_id: String },
    /// Ordinal comparison of the player's account tier.
    #[serde(rename_all = "camelCase")]
    Account {
        entitlement: Entitlement,
        operator: ComparisonOperator,
    },
    /// Whether a tutorial step has been shown.
    #[serde(rename_all = "camelCase")]
    Tutorial {
        tutorial_id: String,
        operator: SeenOperator,
    },
    /// Compares the number of quick-play sessions played.
    #[serde(rename_all = "camelCase")]
    QuickPlaySessions {
        play_count: u32,
        operator: ComparisonOperator,
    },
}

impl Requirement {
    /// The authored `requirementType` tag for this variant.
    #[must_use]
    pub const fn requirement_type(&self) -> &'static str {
        match self {
            Self::Date { .. } => "date",
            Self::Level { .. } => "level",
            Self::LevelId { .. } => "levelId",
            Self::Inventory { .. } => "inventory",
            Self::Dialogue { .. } => "dialogue",
            Self::PropInNode { .. } => "propInNode",
            Self::PropHasTagInNode { .. } => "propHasTagInNode",
            Self::ChapterComplete { .. } => "chapterComplete",
            Self::TaskComplete { .. } => "taskComplete",
            Self::Account { .. } => "account",
            Self::Tutorial { .. } => "tutorial",
            Self::QuickPlaySessions { .. } => "quickPlaySessions",
        }
    }
}
