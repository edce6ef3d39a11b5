use crate::error::RuleParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The value type a payload field must parse as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Bool,
}

impl FieldType {
    fn parse_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" | "text" => Some(Self::String),
            "number" | "numeric" | "int" | "integer" | "decimal" => Some(Self::Number),
            "bool" | "boolean" => Some(Self::Bool),
            _ => None,
        }
    }

    /// Whether a raw payload value parses as this type.
    pub fn accepts(self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Self::String => true,
            Self::Number => value.parse::<f64>().is_ok_and(f64::is_finite),
            Self::Bool => value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false"),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
        })
    }
}

/// A single field rule attached to a flow.
///
/// Parsed from text of the form `field: required|optional[; clause]*`, where a
/// clause is `max N`, `type T`, or a bare type name (`string`, `number`, `bool`).
///
/// ```rust
/// use flowmatch::index::{FieldRule, FieldType};
///
/// let rule: FieldRule = "VendorID: required; max 30".parse().unwrap();
/// assert_eq!(rule.field_name, "VendorID");
/// assert!(rule.required);
/// assert_eq!(rule.field_type, FieldType::String);
/// assert_eq!(rule.max_length, Some(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    pub field_name: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub max_length: Option<usize>,
}

impl FieldRule {
    pub fn parse(text: &str) -> Result<Self, RuleParseError> {
        let rule = text.trim();
        let (field, rest) = rule
            .split_once(':')
            .ok_or_else(|| RuleParseError::MissingSeparator {
                rule: rule.to_string(),
            })?;

        let field_name = field.trim();
        if field_name.is_empty() {
            return Err(RuleParseError::EmptyFieldName {
                rule: rule.to_string(),
            });
        }

        let mut clauses = rest.split(';').map(str::trim);
        let requirement = clauses.next().unwrap_or_default();
        let required = match requirement.to_ascii_lowercase().as_str() {
            "required" => true,
            "optional" => false,
            _ => {
                return Err(RuleParseError::InvalidRequirement {
                    rule: rule.to_string(),
                    found: requirement.to_string(),
                });
            }
        };

        let mut field_type = FieldType::default();
        let mut max_length = None;
        for clause in clauses.filter(|c| !c.is_empty()) {
            let lower = clause.to_ascii_lowercase();
            if let Some(length) = strip_length_prefix(&lower) {
                let parsed = length
                    .parse::<usize>()
                    .map_err(|_| RuleParseError::InvalidMaxLength {
                        rule: rule.to_string(),
                        found: length.to_string(),
                    })?;
                max_length = Some(parsed);
            } else if let Some(name) = lower.strip_prefix("type") {
                let name = name.trim();
                field_type =
                    FieldType::parse_name(name).ok_or_else(|| RuleParseError::InvalidType {
                        rule: rule.to_string(),
                        found: name.to_string(),
                    })?;
            } else if let Some(parsed) = FieldType::parse_name(&lower) {
                field_type = parsed;
            } else {
                return Err(RuleParseError::UnknownClause {
                    rule: rule.to_string(),
                    clause: clause.to_string(),
                });
            }
        }

        Ok(Self {
            field_name: field_name.to_string(),
            required,
            field_type,
            max_length,
        })
    }
}

/// The length part of a `max ...` clause. The prefix must be followed by
/// whitespace or a digit, so words like `maximum` are not taken apart.
fn strip_length_prefix(clause: &str) -> Option<&str> {
    ["max length", "maxlength", "max"]
        .iter()
        .find_map(|prefix| {
            let rest = clause.strip_prefix(prefix)?;
            rest.starts_with(|c: char| c.is_whitespace() || c.is_ascii_digit())
                .then_some(rest)
        })
        .map(str::trim)
}

impl FromStr for FieldRule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical rule text, e.g. `VendorID: required; string; max 30`.
impl fmt::Display for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let requirement = if self.required { "required" } else { "optional" };
        write!(f, "{}: {}; {}", self.field_name, requirement, self.field_type)?;
        if let Some(max) = self.max_length {
            write!(f, "; max {}", max)?;
        }
        Ok(())
    }
}
