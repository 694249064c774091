//! Catalog of the data-quality checks the backend supports.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identifier of a data-quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum DqCheckId {
    #[serde(rename = "ISNOTNULL")]
    IsNotNull,
    #[serde(rename = "ISNULL")]
    IsNull,
    #[serde(rename = "IS_DATE")]
    IsDate,
    #[serde(rename = "IS_NUMERIC")]
    IsNumeric,
    #[serde(rename = "IS_NOT_NUMERIC")]
    IsNotNumeric,
    #[serde(rename = "IS_REGEX_MATCH")]
    IsRegexMatch,
    #[serde(rename = "NUMERIC_RANGE_BETWEEN")]
    NumericRangeBetween,
    #[serde(rename = "STRING_LENGTH_RANGE_BETWEEN")]
    StringLengthRangeBetween,
}

/// Value type of a check parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Number,
}

/// One named parameter a check expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckParameter {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub kind: ParameterKind,
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DqCheck {
    pub id: DqCheckId,
    pub description: &'static str,
    #[serde(rename = "class")]
    pub class_name: &'static str,
    pub parameters: &'static [CheckParameter],
}

const RANGE: &[CheckParameter] = &[
    CheckParameter {
        name: "min",
        label: "Minimum Value",
        kind: ParameterKind::Number,
    },
    CheckParameter {
        name: "max",
        label: "Maximum Value",
        kind: ParameterKind::Number,
    },
];

const IS_NOT_NULL: DqCheck = DqCheck {
    id: DqCheckId::IsNotNull,
    description: "Check if value is not null",
    class_name: "AbstractaDataQualityIsNotNullCheck",
    parameters: &[],
};

const IS_NULL: DqCheck = DqCheck {
    id: DqCheckId::IsNull,
    description: "Check if value is null",
    class_name: "AbstractaDataQualityIsNullCheck",
    parameters: &[],
};

const IS_DATE: DqCheck = DqCheck {
    id: DqCheckId::IsDate,
    description: "Check if value is a date",
    class_name: "AbstractaDataQualityIsDateCheck",
    parameters: &[],
};

const IS_NUMERIC: DqCheck = DqCheck {
    id: DqCheckId::IsNumeric,
    description: "Check if value is a number",
    class_name: "AbstractaDataQualityIsNumericCheck",
    parameters: &[],
};

const IS_NOT_NUMERIC: DqCheck = DqCheck {
    id: DqCheckId::IsNotNumeric,
    description: "Check if value is NOT a number",
    class_name: "AbstractaDataQualityIsNotNumericCheck",
    parameters: &[],
};

const IS_REGEX_MATCH: DqCheck = DqCheck {
    id: DqCheckId::IsRegexMatch,
    description: "Check if value matches a given regex pattern",
    class_name: "AbstractaDataQualityMatchesRegexCheck",
    parameters: &[CheckParameter {
        name: "pattern",
        label: "Regex Pattern",
        kind: ParameterKind::String,
    }],
};

const NUMERIC_RANGE_BETWEEN: DqCheck = DqCheck {
    id: DqCheckId::NumericRangeBetween,
    description: "Check if value is within a numeric range",
    class_name: "AbstractaDataQualityNumericRangeCheck",
    parameters: RANGE,
};

const STRING_LENGTH_RANGE_BETWEEN: DqCheck = DqCheck {
    id: DqCheckId::StringLengthRangeBetween,
    description: "Check if length of string is within a numeric range",
    class_name: "AbstractaDataQualityStringLengthCheck",
    parameters: RANGE,
};

/// Every supported check, in catalog order.
pub const DQ_CHECKS: &[DqCheck] = &[
    IS_NOT_NULL,
    IS_NULL,
    IS_DATE,
    IS_NUMERIC,
    IS_NOT_NUMERIC,
    IS_REGEX_MATCH,
    NUMERIC_RANGE_BETWEEN,
    STRING_LENGTH_RANGE_BETWEEN,
];

impl DqCheckId {
    /// Every check id, in catalog order.
    pub const ALL: [DqCheckId; 8] = [
        Self::IsNotNull,
        Self::IsNull,
        Self::IsDate,
        Self::IsNumeric,
        Self::IsNotNumeric,
        Self::IsRegexMatch,
        Self::NumericRangeBetween,
        Self::StringLengthRangeBetween,
    ];

    /// Wire name, e.g. `NUMERIC_RANGE_BETWEEN`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IsNotNull => "ISNOTNULL",
            Self::IsNull => "ISNULL",
            Self::IsDate => "IS_DATE",
            Self::IsNumeric => "IS_NUMERIC",
            Self::IsNotNumeric => "IS_NOT_NUMERIC",
            Self::IsRegexMatch => "IS_REGEX_MATCH",
            Self::NumericRangeBetween => "NUMERIC_RANGE_BETWEEN",
            Self::StringLengthRangeBetween => "STRING_LENGTH_RANGE_BETWEEN",
        }
    }

    /// Catalog entry for this check.
    pub fn check(&self) -> &'static DqCheck {
        match self {
            Self::IsNotNull => &IS_NOT_NULL,
            Self::IsNull => &IS_NULL,
            Self::IsDate => &IS_DATE,
            Self::IsNumeric => &IS_NUMERIC,
            Self::IsNotNumeric => &IS_NOT_NUMERIC,
            Self::IsRegexMatch => &IS_REGEX_MATCH,
            Self::NumericRangeBetween => &NUMERIC_RANGE_BETWEEN,
            Self::StringLengthRangeBetween => &STRING_LENGTH_RANGE_BETWEEN,
        }
    }
}

impl fmt::Display for DqCheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The catalog as indented JSON, for prompting the agent.
pub fn catalog_json() -> String {
    serde_json::to_string_pretty(DQ_CHECKS).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_id_resolves_to_its_own_entry() {
        for id in DqCheckId::ALL {
            assert_eq!(id.check().id, id);
            assert!(DQ_CHECKS.iter().any(|c| c.id == id), "{} not in catalog", id);
        }
        assert_eq!(DQ_CHECKS.len(), DqCheckId::ALL.len());
    }

    #[test]
    fn regex_check_takes_its_own_parameter() {
        let names: Vec<_> = DqCheckId::IsRegexMatch
            .check()
            .parameters
            .iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["pattern"]);
        assert!(DqCheckId::IsDate.check().parameters.is_empty());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&DqCheckId::NumericRangeBetween).unwrap();
        assert_eq!(json, "\"NUMERIC_RANGE_BETWEEN\"");
        let id: DqCheckId = serde_json::from_str("\"ISNOTNULL\"").unwrap();
        assert_eq!(id, DqCheckId::IsNotNull);
    }

    #[test]
    fn display_matches_serde() {
        for check in DQ_CHECKS {
            let json = serde_json::to_string(&check.id).unwrap();
            assert_eq!(json, format!("\"{}\"", check.id));
        }
    }

    #[test]
    fn range_checks_take_min_and_max() {
        let names: Vec<_> = DqCheckId::NumericRangeBetween
            .check()
            .parameters
            .iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["min", "max"]);
    }

    #[test]
    fn catalog_json_lists_classes() {
        let json = catalog_json();
        assert!(json.contains("\"class\": \"AbstractaDataQualityMatchesRegexCheck\""));
        assert!(json.contains("\"type\": \"number\""));
    }
}
