use crate::error::{EngineError, InvalidInput};
use crate::index::{FieldRule, FlowIndex};
use crate::lexicon::{ThresholdKind, Thresholds};
use crate::matcher::CandidateSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const PLACEHOLDER_PREFIX: &str = "<TODO: provide ";
const PLACEHOLDER_SUFFIX: &str = ">";

/// Placeholder written into a suggested payload for a missing required field.
///
/// ```rust
/// assert_eq!(flowmatch::validator::placeholder_for("VendorID"), "<TODO: provide VendorID>");
/// ```
pub fn placeholder_for(field: &str) -> String {
    format!("{}{}{}", PLACEHOLDER_PREFIX, field, PLACEHOLDER_SUFFIX)
}

pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.starts_with(PLACEHOLDER_PREFIX) && value.ends_with(PLACEHOLDER_SUFFIX)
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    /// `required`, `type`, `maxLength` or `placeholder`.
    pub rule: String,
    pub message: String,
    pub expected: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
    pub warnings: Vec<String>,
    pub applied_rules: Vec<String>,
    /// JSON of the payload with placeholders for missing required fields. Only
    /// produced when auto-fix was requested; it never validates as-is.
    pub suggested_payload: Option<String>,
}

/// Checks a request payload against the field rules of one flow.
pub struct RequestValidator<'a> {
    index: &'a FlowIndex,
    suggestion_threshold: f64,
}

impl<'a> RequestValidator<'a> {
    pub fn new(index: &'a FlowIndex) -> Self {
        Self::with_thresholds(index, &Thresholds::default())
    }

    pub fn with_thresholds(index: &'a FlowIndex, thresholds: &Thresholds) -> Self {
        Self {
            index,
            suggestion_threshold: thresholds.get(ThresholdKind::General),
        }
    }

    /// Validates `payload` against the rules of `flow_id`. The payload is never modified.
    pub fn validate(
        &self,
        flow_id: &str,
        payload: &BTreeMap<String, String>,
        auto_fix: bool,
    ) -> Result<ValidationResult, EngineError> {
        if flow_id.trim().is_empty() {
            return Err(InvalidInput::EmptyFlowId.into());
        }
        if payload.keys().any(|k| k.trim().is_empty()) {
            return Err(InvalidInput::BlankPayloadKey.into());
        }
        let rules = self
            .index
            .rules(flow_id)
            .ok_or_else(|| EngineError::UnknownFlow(flow_id.to_string()))?;

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut missing_required = Vec::new();

        for rule in rules {
            match payload.get(&rule.field_name) {
                None => {
                    if rule.required {
                        errors.push(required_error(rule, "is missing"));
                        missing_required.push(rule.field_name.as_str());
                    }
                }
                Some(value) if value.trim().is_empty() => {
                    if rule.required {
                        errors.push(required_error(rule, "is blank"));
                        missing_required.push(rule.field_name.as_str());
                    } else {
                        warnings.push(format!(
                            "Optional field '{}' is present but empty",
                            rule.field_name
                        ));
                    }
                }
                Some(value) => check_value(rule, value, &mut errors),
            }
        }

        warnings.extend(self.unknown_field_warnings(flow_id, rules, payload));

        let suggested_payload = (auto_fix && !missing_required.is_empty())
            .then(|| suggest_payload(payload, &missing_required))
            .flatten();

        Ok(ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            applied_rules: rules.iter().map(ToString::to_string).collect(),
            suggested_payload,
        })
    }

    fn unknown_field_warnings(
        &self,
        flow_id: &str,
        rules: &[FieldRule],
        payload: &BTreeMap<String, String>,
    ) -> Vec<String> {
        let declared = CandidateSet::new(rules.iter().map(|r| r.field_name.to_lowercase()));
        payload
            .keys()
            .filter(|key| !rules.iter().any(|r| &r.field_name == *key))
            .map(|key| {
                let hint = declared
                    .best_match(&key.to_lowercase(), self.suggestion_threshold)
                    .ok()
                    .flatten()
                    .map(|m| format!(" (did you mean '{}'?)", rules[m.index].field_name))
                    .unwrap_or_default();
                format!(
                    "Field '{}' is not declared by flow '{}' and is ignored{}",
                    key, flow_id, hint
                )
            })
            .collect()
    }
}

fn required_error(rule: &FieldRule, problem: &str) -> FieldError {
    FieldError {
        field: rule.field_name.clone(),
        rule: "required".to_string(),
        message: format!("Required field '{}' {}", rule.field_name, problem),
        expected: "Provide a value".to_string(),
    }
}

fn check_value(rule: &FieldRule, value: &str, errors: &mut Vec<FieldError>) {
    if is_placeholder(value) {
        errors.push(FieldError {
            field: rule.field_name.clone(),
            rule: "placeholder".to_string(),
            message: format!("Field '{}' still holds a placeholder value", rule.field_name),
            expected: "Replace the placeholder with a real value".to_string(),
        });
    }
    if !rule.field_type.accepts(value) {
        errors.push(FieldError {
            field: rule.field_name.clone(),
            rule: "type".to_string(),
            message: format!(
                "Field '{}' must be a {}, found '{}'",
                rule.field_name, rule.field_type, value
            ),
            expected: format!("A {} value", rule.field_type),
        });
    }
    if let Some(max) = rule.max_length {
        let length = value.chars().count();
        if length > max {
            errors.push(FieldError {
                field: rule.field_name.clone(),
                rule: "maxLength".to_string(),
                message: format!(
                    "Field '{}' is {} characters long, the maximum is {}",
                    rule.field_name, length, max
                ),
                expected: format!("At most {} characters", max),
            });
        }
    }
}

fn suggest_payload(payload: &BTreeMap<String, String>, missing: &[&str]) -> Option<String> {
    let mut suggested = payload.clone();
    for field in missing {
        suggested.insert(field.to_string(), placeholder_for(field));
    }
    serde_json::to_string(&suggested).ok()
}
