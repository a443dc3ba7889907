//! Griddle Requirement Engine
//!
//! Platform-agnostic content-gating logic for the Griddle diner game. A
//! requirement is a declarative, JSON-authored condition deciding whether
//! content is unlocked - dialogue lines, store offers, diner props, tutorial
//! steps, tasks, chapters. This crate owns the closed requirement
//! vocabulary, the factory that turns untyped authored config into validated
//! instances with path-qualified errors, and the evaluator that resolves
//! instances against caller-owned state providers.
//!
//! Nothing here performs I/O or holds state: config loaders hand raw JSON to
//! [`parse_requirement`], and runtime UI logic hands parsed requirements plus
//! provider handles to [`is_met`].

pub mod evaluator;
pub mod factory;
pub mod operators;
pub mod requirement;
pub mod tasks;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use evaluator::{all_met, is_met};
pub use factory::{ContextPath, RequirementParseError, parse_requirement, parse_requirement_list};
pub use operators::{
    ComparisonOperator, StringComparisonOperator, compare_ordinal, compare_string,
};
pub use requirement::{DateOperator, Entitlement, PuzzleOperator, Requirement, SeenOperator};
pub use tasks::{TaskConfig, TaskData};

/// Quick-play progress snapshot exposed by the progression provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickPlaySaveData {
    pub play_count: u32,
}

/// Trait for abstracting player-progression state
/// The save-game system provides this; evaluation never mutates it.
pub trait ProgressionProvider {
    /// Highest puzzle number the player has completed.
    fn highest_puzzle_completed(&self) -> u32;

    /// Whether a specific puzzle has been completed.
    fn is_puzzle_completed(&self, puzzle_id: &str) -> bool;

    /// Id of the next puzzle on the player's path, if any remain.
    fn next_puzzle_id(&self) -> Option<String>;

    /// Held quantity of an inventory item; zero when never held.
    fn item_count_in_inventory(&self, item_id: &str) -> u32;

    /// Whether a dialogue has been viewed.
    fn has_dialogue_been_seen(&self, dialogue_id: &str) -> bool;

    /// Whether a tutorial step has been shown.
    fn has_tutorial_been_seen(&self, tutorial_id: &str) -> bool;

    /// The player's current account tier.
    fn entitlement(&self) -> Entitlement;

    /// Quick-play progress, `None` before the first session.
    fn quick_play_save(&self) -> Option<QuickPlaySaveData>;

    /// Whether every task in a chapter is complete, per the supplied task
    /// table.
    fn is_chapter_completed(&self, chapter_id: &str, tasks: &TaskConfig) -> bool;

    /// Whether a task has been completed at least `required_count` times.
    fn is_task_completed(&self, task_id: &str, required_count: u32) -> bool;
}

/// Trait for abstracting diner-world spatial state
/// The diner scene provides this; evaluation never mutates it.
pub trait WorldProvider {
    /// Id of the prop currently placed in a node, `None` when empty.
    fn prop_id_in_node(&self, node_id: &str) -> Option<String>;

    /// Whether the prop placed in a node carries a given tag.
    fn is_prop_tagged_in_node(&self, tag: &str, node_id: &str) -> bool;

    /// The authored task table, used by task and chapter gates.
    fn task_config(&self) -> &TaskConfig;
}
