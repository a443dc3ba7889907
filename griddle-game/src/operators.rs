//! Pure comparison primitives shared by the requirement variants.
use serde::{Deserialize, Serialize};

/// Relational operator over anything with a total order (numbers, tiers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

impl ComparisonOperator {
    /// Authored keys accepted in config, for parse error messages.
    pub const ALLOWED_KEYS: &'static str =
        "equal, notEqual, lessThan, lessThanEqual, greaterThan, greaterThanEqual";

    /// Resolve an authored operator key; `None` for anything outside the set.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "equal" => Some(Self::Equal),
            "notEqual" => Some(Self::NotEqual),
            "lessThan" => Some(Self::LessThan),
            "lessThanEqual" => Some(Self::LessThanEqual),
            "greaterThan" => Some(Self::GreaterThan),
            "greaterThanEqual" => Some(Self::GreaterThanEqual),
            _ => None,
        }
    }

    /// The authored key for this operator.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "notEqual",
            Self::LessThan => "lessThan",
            Self::LessThanEqual => "lessThanEqual",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanEqual => "greaterThanEqual",
        }
    }
}

/// String matching operator used by prop gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StringComparisonOperator {
    Equal,
    NotEqual,
    Contains,
    StartsWith,
}

impl StringComparisonOperator {
    /// Authored keys accepted in config, for parse error messages.
    pub const ALLOWED_KEYS: &'static str = "equal, notEqual, contains, startsWith";

    /// Resolve an authored operator key; `None` for anything outside the set.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "equal" => Some(Self::Equal),
            "notEqual" => Some(Self::NotEqual),
            "contains" => Some(Self::Contains),
            "startsWith" => Some(Self::StartsWith),
            _ => None,
        }
    }

    /// The authored key for this operator.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "notEqual",
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
        }
    }
}

/// Apply a relational operator with standard semantics.
///
/// Generic over `PartialOrd` so level numbers, inventory counts, and the
/// account-tier ordinal all share one implementation.
#[must_use]
pub fn compare_ordinal<T: PartialOrd>(op: ComparisonOperator, left: T, right: T) -> bool {
    match op {
        ComparisonOperator::Equal => left == right,
        ComparisonOperator::NotEqual => left != right,
        ComparisonOperator::LessThan => left < right,
        ComparisonOperator::LessThanEqual => left <= right,
        ComparisonOperator::GreaterThan => left > right,
        ComparisonOperator::GreaterThanEqual => left >= right,
    }
}

/// Apply a string matching operator.
#[must_use]
pub fn compare_string(op: StringComparisonOperator, left: &str, right: &str) -> bool {
    match op {
        StringComparisonOperator::Equal => left == right,
        StringComparisonOperator::NotEqual => left != right,
        StringComparisonOperator::Contains => left.contains(right),
        StringComparisonOperator::StartsWith => left.starts_with(right),
    }
}
