use clap::{Parser, Subcommand};
use flowmatch::error::CatalogConversionError;
use flowmatch::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These structs match the catalog files found in the wild and are only used here for conversion.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCatalog {
    #[serde(default)]
    flows: Vec<RawFlow>,
    #[serde(default, alias = "actions")]
    action_words: Vec<String>,
    #[serde(default, alias = "entities")]
    entity_words: Vec<String>,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
    #[serde(default)]
    synonyms: Vec<Vec<String>>,
    #[serde(default)]
    stop_words: Vec<String>,
    #[serde(default)]
    thresholds: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFlow {
    id: String,
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    #[serde(default)]
    used_by_operations: Option<RawOperations>,
    #[serde(default)]
    validation_rules: Vec<String>,
    keywords: Option<Vec<String>>,
    expected_actions: Option<Vec<String>>,
    expected_entities: Option<Vec<String>>,
    #[serde(default)]
    constants: BTreeMap<String, serde_json::Value>,
}

/// `usedByOperations` shows up both as a plain list and as an object keyed by
/// operation name. Keyed operations keep their file order (serde_json's
/// `preserve_order` feature).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOperations {
    List(Vec<String>),
    Keyed(serde_json::Map<String, serde_json::Value>),
}

impl RawOperations {
    fn into_names(self) -> Vec<String> {
        match self {
            RawOperations::List(names) => names,
            RawOperations::Keyed(map) => map.into_iter().map(|(name, _)| name).collect(),
        }
    }
}

// --- Converter Implementation ---
// This implements the conversion from the raw JSON model to flowmatch's canonical KnowledgeCatalog.

impl IntoCatalog for RawCatalog {
    fn into_catalog(self) -> std::result::Result<KnowledgeCatalog, CatalogConversionError> {
        let flows = self
            .flows
            .into_iter()
            .map(|raw| {
                if raw.id.trim().is_empty() {
                    return Err(CatalogConversionError::ValidationError(
                        "a flow in the catalog has an empty id".to_string(),
                    ));
                }
                Ok(FlowDefinition {
                    id: raw.id,
                    name: raw.name,
                    description: raw.description,
                    version: raw.version,
                    used_by_operations: raw
                        .used_by_operations
                        .map(RawOperations::into_names)
                        .unwrap_or_default(),
                    validation_rules: raw.validation_rules,
                    keywords: raw.keywords,
                    expected_actions: raw.expected_actions,
                    expected_entities: raw.expected_entities,
                    constants: raw.constants,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(KnowledgeCatalog {
            flows,
            action_words: self.action_words,
            entity_words: self.entity_words,
            aliases: self.aliases,
            synonyms: self.synonyms,
            stop_words: self.stop_words,
            thresholds: self.thresholds,
        })
    }
}

/// Recommends integration flows from free-text use cases and validates request payloads
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend a flow for a use-case description
    Recommend {
        /// Path to the knowledge catalog JSON file
        catalog_path: String,
        /// The use-case description
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Validate a request payload against a flow's field rules
    Validate {
        /// Path to the knowledge catalog JSON file
        catalog_path: String,
        /// The flow to validate against
        flow_id: String,
        /// Path to the payload JSON object
        payload_path: String,
        /// Propose a payload with placeholders for missing required fields
        #[arg(long)]
        auto_fix: bool,
    },
    /// Print what happened while the catalog was indexed
    Report {
        /// Path to the knowledge catalog JSON file
        catalog_path: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.human {
        run_interactive();
    } else {
        run_non_interactive(cli);
    }
}

fn load_engine(catalog_path: &str) -> Engine {
    let load_start = Instant::now();
    let catalog_json = fs::read_to_string(catalog_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read catalog file '{}': {}",
            catalog_path, e
        ))
    });
    let raw_catalog: RawCatalog = serde_json::from_str(&catalog_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse catalog JSON: {}", e)));
    let catalog = raw_catalog
        .into_catalog()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert catalog: {}", e)));

    let engine = Engine::builder(catalog)
        .with_eager_index(true)
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid engine configuration: {}", e)));
    tracing::info!(elapsed = ?load_start.elapsed(), "catalog loaded");
    engine
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
fn run_non_interactive(cli: Cli) {
    let command = cli.command.unwrap_or_else(|| {
        exit_with_error("A subcommand is required in non-interactive mode. See --help.");
    });

    match command {
        Command::Recommend { catalog_path, text } => {
            let engine = load_engine(&catalog_path);
            let recommendation = engine
                .recommend_flow(&text.join(" "))
                .unwrap_or_else(|e| exit_with_error(&format!("Recommendation failed: {}", e)));
            print_json(&recommendation);
        }
        Command::Validate {
            catalog_path,
            flow_id,
            payload_path,
            auto_fix,
        } => {
            let engine = load_engine(&catalog_path);
            let payload = load_payload(&payload_path);
            let result = engine
                .validate_request(&flow_id, &payload, auto_fix)
                .unwrap_or_else(|e| exit_with_error(&format!("Validation failed: {}", e)));
            print_json(&result);
        }
        Command::Report { catalog_path } => {
            let engine = load_engine(&catalog_path);
            print_report(&engine);
        }
    }
}

/// Reads a payload object. Scalar values are taken by their JSON text, so `42` becomes `"42"`.
fn load_payload(payload_path: &str) -> BTreeMap<String, String> {
    let payload_json = fs::read_to_string(payload_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read payload file '{}': {}",
            payload_path, e
        ))
    });
    let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&payload_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse payload JSON: {}", e)));

    raw.into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, value)
        })
        .collect()
}

fn print_report(engine: &Engine) {
    let snapshot = engine.snapshot();
    let index = snapshot.index();
    let report = index.report();

    println!("\n--- Index Summary ---");
    println!("Flows in catalog:     {}", snapshot.catalog().flows.len());
    println!("Flows indexed:        {}", index.len());
    println!("Action words:         {}", snapshot.lexicon().action_words().len());
    println!("Entity words:         {}", snapshot.lexicon().entity_words().len());

    if report.is_clean() {
        println!("\nNo integrity problems found.");
        return;
    }

    if !report.excluded.is_empty() {
        println!("\n--- Excluded Flows ---");
        for (flow_id, reason) in &report.excluded {
            println!("  -> {}: {}", flow_id, reason);
        }
    }
    if !report.conflicts.is_empty() {
        println!("\n--- Operation Conflicts ---");
        for conflict in &report.conflicts {
            println!(
                "  -> '{}' kept by '{}', ignored for '{}'",
                conflict.operation, conflict.kept_flow, conflict.rejected_flow
            );
        }
    }
    if !report.lexicon_issues.is_empty() {
        println!("\n--- Lexicon Issues ---");
        for issue in &report.lexicon_issues {
            println!("  -> {}", issue);
        }
    }
    println!();
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive() {
    println!("--- flowmatch Interactive Mode ---");

    let catalog_path = prompt_for_input("Enter catalog path", Some("data/catalog.json"));
    let engine = load_engine(&catalog_path);

    let mut use_case = loop {
        let text = prompt_for_input("Describe the integration task", None);
        if !text.is_empty() {
            break text;
        }
        println!("Please enter a description.");
    };

    let mut recommendation = recommend_or_exit(&engine, &use_case);

    // One clarifying round for an uncertain answer; the refinement is appended to the query.
    if recommendation.low_confidence {
        println!(
            "\nNot sure yet: best guess is '{}' at {:.2}.",
            recommendation.flow_id, recommendation.confidence
        );
        if !recommendation.alternatives.is_empty() {
            println!("Other candidates:");
            for alternative in &recommendation.alternatives {
                println!(
                    "  - {} ({:.2}): {}",
                    alternative.flow_id, alternative.confidence, alternative.reason
                );
            }
        }
        let refinement = prompt_for_input(
            "Which record and action do you mean? (empty to keep the guess)",
            None,
        );
        if !refinement.is_empty() {
            use_case = format!("{} {}", use_case, refinement);
            recommendation = recommend_or_exit(&engine, &use_case);
        }
    }

    println!("\nRecommendation Finished!");
    println!(
        "  -> Flow: {} ({:.2}{})",
        recommendation.flow_id,
        recommendation.confidence,
        if recommendation.low_confidence {
            ", low confidence"
        } else {
            ""
        }
    );
    if let Some(name) = &recommendation.flow_name {
        println!("  -> Name: {}", name);
    }
    println!("  -> Reason: {}", recommendation.reasoning);
    if !recommendation.operations.is_empty() {
        println!("  -> Operations: {}", recommendation.operations.join(", "));
    }

    let payload_path = prompt_for_input("Enter payload path to validate (optional)", None);
    if payload_path.is_empty() {
        return;
    }
    let payload = load_payload(&payload_path);
    let result = engine
        .validate_request(&recommendation.flow_id, &payload, true)
        .unwrap_or_else(|e| exit_with_error(&format!("Validation failed: {}", e)));
    print_json(&result);
}

fn recommend_or_exit(engine: &Engine, use_case: &str) -> Recommendation {
    engine
        .recommend_flow(use_case)
        .unwrap_or_else(|e| exit_with_error(&format!("Recommendation failed: {}", e)))
}

fn print_json<T: serde::Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize output: {}", e)));
    println!("{}", json);
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    io::stdout()
        .flush()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to flush stdout: {}", e)));

    io::stdin()
        .read_line(&mut line)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read line: {}", e)));
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_operations_keep_file_order() {
        let raw: RawCatalog = serde_json::from_str(
            r#"{
                "flows": [
                    {
                        "id": "export_vendor_flow",
                        "usedByOperations": { "updateVendor": {}, "exportVendor": {}, "getVendor": null }
                    },
                    { "id": "import_invoice_flow", "usedByOperations": ["importInvoice", "getInvoice"] }
                ]
            }"#,
        )
        .unwrap();
        let catalog = raw.into_catalog().unwrap();
        assert_eq!(
            catalog.flows[0].used_by_operations,
            vec!["updateVendor", "exportVendor", "getVendor"]
        );
        assert_eq!(
            catalog.flows[1].used_by_operations,
            vec!["importInvoice", "getInvoice"]
        );
    }

    #[test]
    fn empty_flow_id_is_rejected() {
        let raw: RawCatalog = serde_json::from_str(r#"{ "flows": [ { "id": " " } ] }"#).unwrap();
        assert!(matches!(
            raw.into_catalog(),
            Err(CatalogConversionError::ValidationError(_))
        ));
    }
}
