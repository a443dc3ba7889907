//! Resolution of parsed requirements against live game state.
//!
//! Evaluation is total and fails closed: a gate that cannot be resolved
//! (missing end date, unknown task id, absent requirement) evaluates to
//! "not met" with a logged warning rather than crashing the session.
//! Nothing here caches or mutates; callers may re-evaluate every frame.
use chrono::{DateTime, Utc};
use log::warn;

use crate::operators::{StringComparisonOperator, compare_ordinal, compare_string};
use crate::requirement::{DateOperator, PuzzleOperator, Requirement, SeenOperator};
use crate::{ProgressionProvider, WorldProvider};

/// Evaluate an optional single gating requirement.
///
/// `None` means "no requirement" and evaluates to `false` (not met), used by
/// callers that store an optional gate rather than a list.
#[must_use]
pub fn is_met<P, W>(requirement: Option<&Requirement>, progression: &P, world: &W) -> bool
where
    P: ProgressionProvider,
    W: WorldProvider,
{
    requirement.is_some_and(|requirement| requirement.is_met(progression, world))
}

/// Whether every requirement in a list is met. Vacuously true for an empty
/// list; content with no requirements is always unlocked.
#[must_use]
pub fn all_met<P, W>(requirements: &[Requirement], progression: &P, world: &W) -> bool
where
    P: ProgressionProvider,
    W: WorldProvider,
{
    requirements
        .iter()
        .all(|requirement| requirement.is_met(progression, world))
}

impl Requirement {
    /// Evaluate this requirement against the current wall clock.
    #[must_use]
    pub fn is_met<P, W>(&self, progression: &P, world: &W) -> bool
    where
        P: ProgressionProvider,
        W: WorldProvider,
    {
        self.is_met_at(Utc::now(), progression, world)
    }

    /// Evaluate with an explicit "now", the deterministic entry point.
    #[must_use]
    pub fn is_met_at<P, W>(&self, now: DateTime<Utc>, progression: &P, world: &W) -> bool
    where
        P: ProgressionProvider,
        W: WorldProvider,
    {
        match self {
            Self::Date {
                date,
                end_date,
                operator,
            } => match operator {
                DateOperator::Before => now < *date,
                DateOperator::After => now >= *date,
                DateOperator::InRange => match end_date {
                    Some(end) => now >= *date && now < *end,
                    // Factory rejects this shape; deserialized caches may not.
                    None => {
                        warn!("date requirement uses inRange without endDate; treating as unmet");
                        false
                    }
                },
            },
            Self::Level { level, operator } => {
                compare_ordinal(*operator, progression.highest_puzzle_completed(), *level)
            }
            Self::LevelId { level_id, operator } => match operator {
                PuzzleOperator::Complete => progression.is_puzzle_completed(level_id),
                PuzzleOperator::Incomplete => !progression.is_puzzle_completed(level_id),
                PuzzleOperator::IsNext => progression
                    .next_puzzle_id()
                    .is_some_and(|next| next == *level_id),
            },
            Self::Inventory {
                item_id,
                item_count,
                operator,
            } => compare_ordinal(
                *operator,
                progression.item_count_in_inventory(item_id),
                *item_count,
            ),
            Self::Dialogue {
                dialogue_id,
                operator,
            } => seen_matches(*operator, progression.has_dialogue_been_seen(dialogue_id)),
            Self::PropInNode {
                prop_id,
                node_id,
                operator,
            } => match world.prop_id_in_node(node_id) {
                Some(placed) => compare_string(*operator, &placed, prop_id),
                // An empty node holds no prop: only notEqual can match.
                None => matches!(operator, StringComparisonOperator::NotEqual),
            },
            Self::PropHasTagInNode { tag, node_id } => world.is_prop_tagged_in_node(tag, node_id),
            Self::ChapterComplete { chapter_id } => {
                progression.is_chapter_completed(chapter_id, world.task_config())
            }
            Self::TaskComplete { task_id } => match world.task_config().task(task_id) {
                Some(task) => progression.is_task_completed(task_id, task.required_count),
                None => {
                    warn!("task requirement references unknown task `{task_id}`; treating as unmet");
                    false
                }
            },
            Self::Account {
                entitlement,
                operator,
            } => compare_ordinal(*operator, progression.entitlement(), *entitlement),
            Self::Tutorial {
                tutorial_id,
                operator,
            } => seen_matches(*operator, progression.has_tutorial_been_seen(tutorial_id)),
            Self::QuickPlaySessions {
                play_count,
                operator,
            } => {
                let played = progression
                    .quick_play_save()
                    .map_or(0, |save| save.play_count);
                compare_ordinal(*operator, played, *play_count)
            }
        }
    }
}

fn seen_matches(operator: SeenOperator, seen: bool) -> bool {
    match operator {
        SeenOperator::HasSeen => seen,
        SeenOperator::HasNotSeen => !seen,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuickPlaySaveData;
    use crate::operators::ComparisonOperator;
    use crate::requirement::Entitlement;
    use crate::tasks::TaskConfig;
    use chrono::TimeZone;
    use std::collections::{HashMap, HashSet};

    #[derive(Default)]
    struct FakeProgression {
        highest_level: u32,
        completed: HashSet<String>,
        next_puzzle: Option<String>,
        inventory: HashMap<String, u32>,
        dialogues_seen: HashSet<String>,
        tutorials_seen: HashSet<String>,
        tier: Option<Entitlement>,
        quick_play: Option<QuickPlaySaveData>,
        task_counts: HashMap<String, u32>,
    }

    impl ProgressionProvider for FakeProgression {
        fn highest_puzzle_completed(&self) -> u32 {
            self.highest_level
        }

        fn is_puzzle_completed(&self, puzzle_id: &str) -> bool {
            self.completed.contains(puzzle_id)
        }

        fn next_puzzle_id(&self) -> Option<String> {
            self.next_puzzle.clone()
        }

        fn item_count_in_inventory(&self, item_id: &str) -> u32 {
            self.inventory.get(item_id).copied().unwrap_or(0)
        }

        fn has_dialogue_been_seen(&self, dialogue_id: &str) -> bool {
            self.dialogues_seen.contains(dialogue_id)
        }

        fn has_tutorial_been_seen(&self, tutorial_id: &str) -> bool {
            self.tutorials_seen.contains(tutorial_id)
        }

        fn entitlement(&self) -> Entitlement {
            self.tier.unwrap_or(Entitlement::Guest)
        }

        fn quick_play_save(&self) -> Option<QuickPlaySaveData> {
            self.quick_play
        }

        fn is_chapter_completed(&self, chapter_id: &str, tasks: &TaskConfig) -> bool {
            let mut any = false;
            for task in tasks.tasks_in_chapter(chapter_id) {
                any = true;
                if !self.is_task_completed(&task.id, task.required_count) {
                    return false;
                }
            }
            any
        }

        fn is_task_completed(&self, task_id: &str, required_count: u32) -> bool {
            self.task_counts.get(task_id).copied().unwrap_or(0) >= required_count
        }
    }

    #[derive(Default)]
    struct FakeWorld {
        props: HashMap<String, String>,
        prop_tags: HashMap<String, HashSet<String>>,
        tasks: TaskConfig,
    }

    impl WorldProvider for FakeWorld {
        fn prop_id_in_node(&self, node_id: &str) -> Option<String> {
            self.props.get(node_id).cloned()
        }

        fn is_prop_tagged_in_node(&self, tag: &str, node_id: &str) -> bool {
            self.prop_tags
                .get(node_id)
                .is_some_and(|tags| tags.contains(tag))
        }

        fn task_config(&self) -> &TaskConfig {
            &self.tasks
        }
    }

    fn world_with_tasks() -> FakeWorld {
        FakeWorld {
            tasks: TaskConfig::from_json(
                r#"{
                    "tasks": [
                        {"id": "fix_the_stove", "chapterId": "chapter_1", "requiredCount": 3},
                        {"id": "sweep_the_floor", "chapterId": "chapter_1"}
                    ]
                }"#,
            )
            .unwrap(),
            ..FakeWorld::default()
        }
    }

    #[test]
    fn absent_requirement_is_not_met() {
        let progression = FakeProgression::default();
        let world = FakeWorld::default();
        assert!(!is_met(None, &progression, &world));
    }

    #[test]
    fn empty_list_is_vacuously_met() {
        let progression = FakeProgression::default();
        let world = FakeWorld::default();
        assert!(all_met(&[], &progression, &world));
    }

    #[test]
    fn list_is_the_and_of_members() {
        let progression = FakeProgression {
            highest_level: 7,
            tier: Some(Entitlement::Free),
            ..FakeProgression::default()
        };
        let world = FakeWorld::default();
        let met = Requirement::Level {
            level: 5,
            operator: ComparisonOperator::GreaterThanEqual,
        };
        let unmet = Requirement::Account {
            entitlement: Entitlement::Premium,
            operator: ComparisonOperator::GreaterThanEqual,
        };
        assert!(all_met(&[met.clone()], &progression, &world));
        assert!(!all_met(&[met, unmet], &progression, &world));
    }

    #[test]
    fn date_range_is_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let requirement = Requirement::Date {
            date: start,
            end_date: Some(end),
            operator: DateOperator::InRange,
        };
        let progression = FakeProgression::default();
        let world = FakeWorld::default();

        let inside = Utc.with_ymd_and_hms(2024, 6, 7, 12, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap();
        assert!(requirement.is_met_at(start, &progression, &world));
        assert!(requirement.is_met_at(inside, &progression, &world));
        assert!(!requirement.is_met_at(before, &progression, &world));
        assert!(!requirement.is_met_at(end, &progression, &world));
    }

    #[test]
    fn date_before_and_after() {
        let pivot = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let progression = FakeProgression::default();
        let world = FakeWorld::default();
        let earlier = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();

        let before = Requirement::Date {
            date: pivot,
            end_date: None,
            operator: DateOperator::Before,
        };
        assert!(before.is_met_at(earlier, &progression, &world));
        assert!(!before.is_met_at(pivot, &progression, &world));
        assert!(!before.is_met_at(later, &progression, &world));

        let after = Requirement::Date {
            date: pivot,
            end_date: None,
            operator: DateOperator::After,
        };
        assert!(after.is_met_at(pivot, &progression, &world));
        assert!(after.is_met_at(later, &progression, &world));
        assert!(!after.is_met_at(earlier, &progression, &world));
    }

    #[test]
    fn in_range_without_end_date_fails_closed() {
        let requirement = Requirement::Date {
            date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            end_date: None,
            operator: DateOperator::InRange,
        };
        let progression = FakeProgression::default();
        let world = FakeWorld::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 7, 0, 0, 0).unwrap();
        assert!(!requirement.is_met_at(now, &progression, &world));
    }

    #[test]
    fn level_and_level_id_gates() {
        let progression = FakeProgression {
            highest_level: 9,
            completed: HashSet::from(["puzzle_1_3".to_string()]),
            next_puzzle: Some("puzzle_2_1".to_string()),
            ..FakeProgression::default()
        };
        let world = FakeWorld::default();

        let level = Requirement::Level {
            level: 10,
            operator: ComparisonOperator::LessThan,
        };
        assert!(level.is_met(&progression, &world));

        let complete = Requirement::LevelId {
            level_id: "puzzle_1_3".to_string(),
            operator: PuzzleOperator::Complete,
        };
        assert!(complete.is_met(&progression, &world));

        let incomplete = Requirement::LevelId {
            level_id: "puzzle_1_3".to_string(),
            operator: PuzzleOperator::Incomplete,
        };
        assert!(!incomplete.is_met(&progression, &world));

        let is_next = Requirement::LevelId {
            level_id: "puzzle_2_1".to_string(),
            operator: PuzzleOperator::IsNext,
        };
        assert!(is_next.is_met(&progression, &world));

        let no_next = FakeProgression::default();
        assert!(!is_next.is_met(&no_next, &world));
    }

    #[test]
    fn inventory_and_quick_play_gates() {
        let progression = FakeProgression {
            inventory: HashMap::from([("napkins".to_string(), 12)]),
            quick_play: Some(QuickPlaySaveData { play_count: 4 }),
            ..FakeProgression::default()
        };
        let world = FakeWorld::default();

        let stocked = Requirement::Inventory {
            item_id: "napkins".to_string(),
            item_count: 10,
            operator: ComparisonOperator::GreaterThanEqual,
        };
        assert!(stocked.is_met(&progression, &world));

        let missing = Requirement::Inventory {
            item_id: "forks".to_string(),
            item_count: 1,
            operator: ComparisonOperator::GreaterThanEqual,
        };
        assert!(!missing.is_met(&progression, &world));

        let sessions = Requirement::QuickPlaySessions {
            play_count: 3,
            operator: ComparisonOperator::GreaterThan,
        };
        assert!(sessions.is_met(&progression, &world));

        // No quick-play save counts as zero sessions.
        let fresh = FakeProgression::default();
        assert!(!sessions.is_met(&fresh, &world));
        let none_yet = Requirement::QuickPlaySessions {
            play_count: 0,
            operator: ComparisonOperator::Equal,
        };
        assert!(none_yet.is_met(&fresh, &world));
    }

    #[test]
    fn seen_flag_gates() {
        let progression = FakeProgression {
            dialogues_seen: HashSet::from(["intro_marge".to_string()]),
            tutorials_seen: HashSet::from(["tut_counter".to_string()]),
            ..FakeProgression::default()
        };
        let world = FakeWorld::default();

        let seen = Requirement::Dialogue {
            dialogue_id: "intro_marge".to_string(),
            operator: SeenOperator::HasSeen,
        };
        assert!(seen.is_met(&progression, &world));

        let not_seen = Requirement::Dialogue {
            dialogue_id: "finale".to_string(),
            operator: SeenOperator::HasNotSeen,
        };
        assert!(not_seen.is_met(&progression, &world));

        let tutorial = Requirement::Tutorial {
            tutorial_id: "tut_counter".to_string(),
            operator: SeenOperator::HasNotSeen,
        };
        assert!(!tutorial.is_met(&progression, &world));
    }

    #[test]
    fn prop_gates() {
        let world = FakeWorld {
            props: HashMap::from([("corner_1".to_string(), "prop_jukebox_gold".to_string())]),
            prop_tags: HashMap::from([(
                "corner_1".to_string(),
                HashSet::from(["music".to_string()]),
            )]),
            ..FakeWorld::default()
        };
        let progression = FakeProgression::default();

        let starts_with = Requirement::PropInNode {
            prop_id: "prop_jukebox".to_string(),
            node_id: "corner_1".to_string(),
            operator: StringComparisonOperator::StartsWith,
        };
        assert!(starts_with.is_met(&progression, &world));

        let tagged = Requirement::PropHasTagInNode {
            tag: "music".to_string(),
            node_id: "corner_1".to_string(),
        };
        assert!(tagged.is_met(&progression, &world));

        let untagged = Requirement::PropHasTagInNode {
            tag: "seating".to_string(),
            node_id: "corner_1".to_string(),
        };
        assert!(!untagged.is_met(&progression, &world));
    }

    #[test]
    fn empty_node_only_matches_not_equal() {
        let world = FakeWorld::default();
        let progression = FakeProgression::default();
        for (operator, expected) in [
            (StringComparisonOperator::Equal, false),
            (StringComparisonOperator::NotEqual, true),
            (StringComparisonOperator::Contains, false),
            (StringComparisonOperator::StartsWith, false),
        ] {
            let requirement = Requirement::PropInNode {
                prop_id: "prop_jukebox".to_string(),
                node_id: "empty_corner".to_string(),
                operator,
            };
            assert_eq!(requirement.is_met(&progression, &world), expected);
        }
    }

    #[test]
    fn task_and_chapter_gates() {
        let world = world_with_tasks();
        let progression = FakeProgression {
            task_counts: HashMap::from([
                ("fix_the_stove".to_string(), 3),
                ("sweep_the_floor".to_string(), 1),
            ]),
            ..FakeProgression::default()
        };

        let task = Requirement::TaskComplete {
            task_id: "fix_the_stove".to_string(),
        };
        assert!(task.is_met(&progression, &world));

        let chapter = Requirement::ChapterComplete {
            chapter_id: "chapter_1".to_string(),
        };
        assert!(chapter.is_met(&progression, &world));

        let behind = FakeProgression {
            task_counts: HashMap::from([("fix_the_stove".to_string(), 2)]),
            ..FakeProgression::default()
        };
        assert!(!task.is_met(&behind, &world));
        assert!(!chapter.is_met(&behind, &world));
    }

    #[test]
    fn unknown_task_fails_closed() {
        let world = world_with_tasks();
        let progression = FakeProgression::default();
        let requirement = Requirement::TaskComplete {
            task_id: "paint_the_roof".to_string(),
        };
        assert!(!requirement.is_met(&progression, &world));
    }

    #[test]
    fn account_tier_compares_ordinally() {
        let world = FakeWorld::default();
        let free = FakeProgression {
            tier: Some(Entitlement::Free),
            ..FakeProgression::default()
        };

        // Free < Premium holds; Free >= Premium does not.
        let below_premium = Requirement::Account {
            entitlement: Entitlement::Premium,
            operator: ComparisonOperator::LessThan,
        };
        assert!(below_premium.is_met(&free, &world));

        let at_least_premium = Requirement::Account {
            entitlement: Entitlement::Premium,
            operator: ComparisonOperator::GreaterThanEqual,
        };
        assert!(!at_least_premium.is_met(&free, &world));

        let at_least_free = Requirement::Account {
            entitlement: Entitlement::Free,
            operator: ComparisonOperator::GreaterThanEqual,
        };
        assert!(at_least_free.is_met(&free, &world));
        let premium = FakeProgression {
            tier: Some(Entitlement::Premium),
            ..FakeProgression::default()
        };
        assert!(at_least_free.is_met(&premium, &world));
        let guest = FakeProgression::default();
        assert!(!at_least_free.is_met(&guest, &world));

        let exactly_free = Requirement::Account {
            entitlement: Entitlement::Free,
            operator: ComparisonOperator::Equal,
        };
        assert!(exactly_free.is_met(&free, &world));
        assert!(!exactly_free.is_met(&premium, &world));
    }

    #[test]
    fn parsed_requirements_evaluate_end_to_end() {
        use crate::factory::{ContextPath, parse_requirement};
        use serde_json::json;

        let raw = json!({
            "requirementType": "account",
            "entitlement": "Premium",
            "operator": "lessThan"
        });
        let requirement =
            parse_requirement(&raw, &ContextPath::root("store > upsell")).unwrap();
        let world = FakeWorld::default();
        let free = FakeProgression {
            tier: Some(Entitlement::Free),
            ..FakeProgression::default()
        };
        assert!(is_met(Some(&requirement), &free, &world));
    }
}
