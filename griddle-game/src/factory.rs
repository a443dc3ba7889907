//! Parsing of authored requirement JSON into validated variants.
//!
//! Requirement lists are hand-authored by designers via spreadsheets, so
//! every failure here must name the offending field and where in the config
//! tree it sits. Parsing is pure: no game state, no side effects, same
//! output for the same input.
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::operators::{ComparisonOperator, StringComparisonOperator};
use crate::requirement::{DateOperator, Entitlement, PuzzleOperator, Requirement, SeenOperator};

/// Breadcrumb locating a requirement inside a nested config structure,
/// e.g. `Chapter3 > task[2] > unlockRequirements[0]`.
///
/// Segments accumulate as parsing descends; the string form is only rendered
/// when an error is reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextPath(Vec<String>);

impl ContextPath {
    /// Start a path at a named config root.
    #[must_use]
    pub fn root(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Extend the path with a nested segment.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Append a list index to the innermost segment.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        match segments.last_mut() {
            Some(last) => last.push_str(&format!("[{index}]")),
            None => segments.push(format!("[{index}]")),
        }
        Self(segments)
    }
}

impl fmt::Display for ContextPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join(" > "))
    }
}

/// Errors raised when an authored requirement object is malformed.
///
/// Every variant carries the rendered context path so content authors can
/// find the broken entry without reading engine code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequirementParseError {
    #[error("{path}: requirement is not a JSON object")]
    NotAnObject { path: String },
    #[error("{path}: requirement list is not a JSON array")]
    NotAList { path: String },
    #[error("{path}: unknown requirement type `{tag}`")]
    UnknownType { tag: String, path: String },
    #[error("{path}: missing required field `{field}`")]
    MissingField { field: &'static str, path: String },
    #[error("{path}: field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
        path: String,
    },
    #[error("{path}: `{field}` value `{value}` is not one of [{allowed}]")]
    InvalidOperator {
        field: &'static str,
        value: String,
        allowed: &'static str,
        path: String,
    },
}

/// Parse one authored requirement object.
///
/// Accepts the legacy wrapper shape where the fields sit one level down
/// under `requirementData`; the indirection never affects the resulting
/// variant.
///
/// # Errors
///
/// Returns `RequirementParseError` when the tag is missing or unknown, a
/// required field is absent or mistyped, or an operator key is outside the
/// variant's allowed set.
pub fn parse_requirement(
    raw: &Value,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    let obj = as_object(raw, path)?;
    let (obj, path) = match obj.get("requirementData") {
        Some(nested) => {
            let nested_path = path.child("requirementData");
            (as_object(nested, &nested_path)?, nested_path)
        }
        None => (obj, path.clone()),
    };

    let tag = match obj.get("requirementType") {
        None => {
            return Err(RequirementParseError::MissingField {
                field: "requirementType",
                path: path.to_string(),
            });
        }
        Some(Value::String(tag)) => tag.as_str(),
        Some(_) => {
            return Err(RequirementParseError::InvalidField {
                field: "requirementType",
                expected: "a string",
                path: path.to_string(),
            });
        }
    };

    match tag {
        "date" => parse_date(obj, &path),
        "level" => parse_level(obj, &path),
        "levelId" => parse_level_id(obj, &path),
        "inventory" => parse_inventory(obj, &path),
        "dialogue" => parse_dialogue(obj, &path),
        "propInNode" => parse_prop_in_node(obj, &path),
        "propHasTagInNode" => parse_prop_has_tag_in_node(obj, &path),
        "chapterComplete" => parse_chapter_complete(obj, &path),
        "taskComplete" => parse_task_complete(obj, &path),
        "account" => parse_account(obj, &path),
        "tutorial" => parse_tutorial(obj, &path),
        "quickPlaySessions" => parse_quick_play_sessions(obj, &path),
        _ => Err(RequirementParseError::UnknownType {
            tag: tag.to_string(),
            path: path.to_string(),
        }),
    }
}

/// Parse an ordered requirement list, the unit actually embedded in content
/// config. The first malformed entry fails the whole list with its index in
/// the context path; the caller decides whether to skip the entry or the
/// file.
///
/// # Errors
///
/// Returns `RequirementParseError` when the value is not an array or any
/// member fails to parse.
pub fn parse_requirement_list(
    raw: &Value,
    path: &ContextPath,
) -> Result<Vec<Requirement>, RequirementParseError> {
    let entries = raw
        .as_array()
        .ok_or_else(|| RequirementParseError::NotAList {
            path: path.to_string(),
        })?;
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_requirement(entry, &path.index(i)))
        .collect()
}

fn parse_date(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    let date = date_field(obj, "date", path)?;
    let operator = operator_field(
        obj,
        path,
        DateOperator::from_key,
        DateOperator::ALLOWED_KEYS,
    )?;
    let end_date = match obj.get("endDate") {
        Some(_) => Some(date_field(obj, "endDate", path)?),
        None => None,
    };
    if operator == DateOperator::InRange && end_date.is_none() {
        return Err(RequirementParseError::MissingField {
            field: "endDate",
            path: path.to_string(),
        });
    }
    Ok(Requirement::Date {
        date,
        end_date,
        operator,
    })
}

fn parse_level(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    Ok(Requirement::Level {
        level: count_field(obj, "level", path)?,
        operator: comparison_operator_field(obj, path)?,
    })
}

fn parse_level_id(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    Ok(Requirement::LevelId {
        level_id: string_field(obj, "levelId", path)?,
        operator: operator_field(
            obj,
            path,
            PuzzleOperator::from_key,
            PuzzleOperator::ALLOWED_KEYS,
        )?,
    })
}

fn parse_inventory(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    Ok(Requirement::Inventory {
        item_id: string_field(obj, "itemId", path)?,
        item_count: count_field(obj, "itemCount", path)?,
        operator: comparison_operator_field(obj, path)?,
    })
}

fn parse_dialogue(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    Ok(Requirement::Dialogue {
        dialogue_id: string_field(obj, "dialogueId", path)?,
        operator: operator_field(
            obj,
            path,
            SeenOperator::from_key,
            SeenOperator::ALLOWED_KEYS,
        )?,
    })
}

fn parse_prop_in_node(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    Ok(Requirement::PropInNode {
        prop_id: string_field(obj, "propId", path)?,
        node_id: string_field(obj, "nodeId", path)?,
        operator: operator_field(
            obj,
            path,
            StringComparisonOperator::from_key,
            StringComparisonOperator::ALLOWED_KEYS,
        )?,
    })
}

fn parse_prop_has_tag_in_node(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    Ok(Requirement::PropHasTagInNode {
        tag: string_field(obj, "tag", path)?,
        node_id: string_field(obj, "nodeId", path)?,
    })
}

fn parse_chapter_complete(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    Ok(Requirement::ChapterComplete {
        chapter_id: string_field(obj, "chapterId", path)?,
    })
}

fn parse_task_complete(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    Ok(Requirement::TaskComplete {
        task_id: string_field(obj, "taskId", path)?,
    })
}

fn parse_account(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    let tier = string_field(obj, "entitlement", path)?;
    let entitlement =
        Entitlement::from_key(&tier).ok_or_else(|| RequirementParseError::InvalidOperator {
            field: "entitlement",
            value: tier,
            allowed: Entitlement::ALLOWED_KEYS,
            path: path.to_string(),
        })?;
    Ok(Requirement::Account {
        entitlement,
        operator: comparison_operator_field(obj, path)?,
    })
}

fn parse_tutorial(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    Ok(Requirement::Tutorial {
        tutorial_id: string_field(obj, "tutorialId", path)?,
        operator: operator_field(
            obj,
            path,
            SeenOperator::from_key,
            SeenOperator::ALLOWED_KEYS,
        )?,
    })
}

fn parse_quick_play_sessions(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<Requirement, RequirementParseError> {
    Ok(Requirement::QuickPlaySessions {
        play_count: count_field(obj, "playCount", path)?,
        operator: comparison_operator_field(obj, path)?,
    })
}

fn as_object<'a>(
    raw: &'a Value,
    path: &ContextPath,
) -> Result<&'a Map<String, Value>, RequirementParseError> {
    raw.as_object().ok_or_else(|| RequirementParseError::NotAnObject {
        path: path.to_string(),
    })
}

fn require<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
    path: &ContextPath,
) -> Result<&'a Value, RequirementParseError> {
    obj.get(field).ok_or_else(|| RequirementParseError::MissingField {
        field,
        path: path.to_string(),
    })
}

fn string_field(
    obj: &Map<String, Value>,
    field: &'static str,
    path: &ContextPath,
) -> Result<String, RequirementParseError> {
    require(obj, field, path)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RequirementParseError::InvalidField {
            field,
            expected: "a string",
            path: path.to_string(),
        })
}

fn count_field(
    obj: &Map<String, Value>,
    field: &'static str,
    path: &ContextPath,
) -> Result<u32, RequirementParseError> {
    require(obj, field, path)?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| RequirementParseError::InvalidField {
            field,
            expected: "a non-negative number",
            path: path.to_string(),
        })
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC);
/// hand-authored content uses both.
fn date_field(
    obj: &Map<String, Value>,
    field: &'static str,
    path: &ContextPath,
) -> Result<DateTime<Utc>, RequirementParseError> {
    let text = require(obj, field, path)?
        .as_str()
        .ok_or_else(|| RequirementParseError::InvalidField {
            field,
            expected: "a date string",
            path: path.to_string(),
        })?;
    parse_date_value(text).ok_or_else(|| RequirementParseError::InvalidField {
        field,
        expected: "an RFC 3339 timestamp or YYYY-MM-DD date",
        path: path.to_string(),
    })
}

fn parse_date_value(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn comparison_operator_field(
    obj: &Map<String, Value>,
    path: &ContextPath,
) -> Result<ComparisonOperator, RequirementParseError> {
    operator_field(
        obj,
        path,
        ComparisonOperator::from_key,
        ComparisonOperator::ALLOWED_KEYS,
    )
}

fn operator_field<O>(
    obj: &Map<String, Value>,
    path: &ContextPath,
    from_key: fn(&str) -> Option<O>,
    allowed: &'static str,
) -> Result<O, RequirementParseError> {
    let key = string_field(obj, "operator", path)?;
    from_key(&key).ok_or_else(|| RequirementParseError::InvalidOperator {
        field: "operator",
        value: key,
        allowed,
        path: path.to_string(),
    })
}
