use thiserror::Error;

/// Errors that can occur while parsing a textual field rule such as `"VendorID: required; max 30"`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleParseError {
    #[error("Rule '{rule}' has no ':' between the field name and its requirement")]
    MissingSeparator { rule: String },

    #[error("Rule '{rule}' has an empty field name")]
    EmptyFieldName { rule: String },

    #[error("Rule '{rule}' declares requirement '{found}', expected 'required' or 'optional'")]
    InvalidRequirement { rule: String, found: String },

    #[error("Rule '{rule}' declares an invalid max length '{found}'")]
    InvalidMaxLength { rule: String, found: String },

    #[error("Rule '{rule}' declares unknown field type '{found}'")]
    InvalidType { rule: String, found: String },

    #[error("Rule '{rule}' contains an unrecognized clause '{clause}'")]
    UnknownClause { rule: String, clause: String },
}

/// Problems in the knowledge catalog, detected while building the lexicon or the flow index.
///
/// None of these abort a build: the offending alias or flow is left out and the
/// problem is kept in the build report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogIntegrityError {
    #[error("Flow '{flow_id}' references {kind} token '{token}', which is not in the lexicon")]
    UnknownToken {
        flow_id: String,
        kind: &'static str,
        token: String,
    },

    #[error("Flow '{flow_id}' has an invalid validation rule: {source}")]
    InvalidRule {
        flow_id: String,
        #[source]
        source: RuleParseError,
    },

    #[error("Flow '{0}' is declared more than once; the first declaration is kept")]
    DuplicateFlow(String),

    #[error("A flow with an empty id cannot be indexed")]
    EmptyFlowId,

    #[error("Alias '{alias}' points to '{target}', which never resolves to a lexicon word")]
    UnresolvedAlias { alias: String, target: String },

    #[error("Alias '{alias}' is part of an alias cycle")]
    AliasCycle { alias: String },
}

/// Caller contract violations, rejected before any computation starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("Use-case text is empty")]
    EmptyQuery,

    #[error("Match query string is empty")]
    EmptyMatchQuery,

    #[error("Flow id is empty")]
    EmptyFlowId,

    #[error("Payload contains an empty field name")]
    BlankPayloadKey,
}

/// Errors in engine configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Weight '{name}' must be a finite, non-negative number, found {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("At least one signal weight must be positive")]
    ZeroWeights,

    #[error("Fuzzy hit weight must be within [0, 1], found {0}")]
    InvalidFuzzyWeight(f64),
}

/// Errors returned across the engine boundary by `recommend` and `validate`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("Flow '{0}' is not present in the flow index")]
    UnknownFlow(String),

    #[error("The flow index contains no flows")]
    EmptyIndex,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that can occur when converting a custom catalog format into a `KnowledgeCatalog`.
#[derive(Error, Debug, Clone)]
pub enum CatalogConversionError {
    #[error("Invalid catalog data: {0}")]
    ValidationError(String),
}
