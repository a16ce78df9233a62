use clap::{Args, Parser, Subcommand};
use flowplan::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// --- Input Formats ---

/// Plans may be supplied as a list, or as an object keyed by plan name.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlanFile {
    Keyed(BTreeMap<String, FlowPlan>),
    List(Vec<FlowPlan>),
}

impl PlanFile {
    fn into_parts(self) -> (Vec<FlowPlan>, Vec<FlowConfigError>) {
        match self {
            PlanFile::List(plans) => (plans, Vec::new()),
            PlanFile::Keyed(keyed) => {
                let entries: Vec<(&str, &FlowPlan)> =
                    keyed.iter().map(|(k, p)| (k.as_str(), p)).collect();
                let errors = validate_collection(&entries);
                (keyed.into_values().collect(), errors)
            }
        }
    }
}

/// Compiles and validates flow plans against installed action descriptors
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile every plan and print the resulting flows as JSON
    Compile(Inputs),
    /// Install the plans as one plugin registration; fails if any plan is rejected
    Install(Inputs),
}

#[derive(Args, Debug)]
struct Inputs {
    /// Path to the flow plans JSON file
    #[arg(short, long)]
    plans: String,
    /// Path to the action descriptors JSON file
    #[arg(short, long)]
    descriptors: String,
    /// Optional path to the variables JSON file
    #[arg(short, long)]
    variables: Option<String>,
    /// Optional path to the engine configuration JSON file
    #[arg(short, long)]
    config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compile(inputs) => run(inputs, false),
        Command::Install(inputs) => run(inputs, true),
    }
}

fn run(inputs: Inputs, install: bool) {
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let config = match &inputs.config {
        Some(path) => EngineConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("{}", e))),
        None => EngineConfig::default(),
    };
    let plan_file: PlanFile = read_json(&inputs.plans, "flow plans");
    let descriptors: Vec<ActionDescriptor> = read_json(&inputs.descriptors, "descriptors");
    let variables: Vec<Variable> = match &inputs.variables {
        Some(path) => read_json(path, "variables"),
        None => Vec::new(),
    };

    let (plans, collection_errors) = plan_file.into_parts();
    if !collection_errors.is_empty() {
        exit_with_error(
            &collection_errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        );
    }

    // --- 2. Compilation ---
    let registry: ActionRegistry = descriptors.into_iter().collect();
    let catalog = PlanCatalog::new();
    let compiler = FlowCompiler::builder(&registry)
        .with_plans(&catalog)
        .with_config(&config)
        .build();

    let compile_start = Instant::now();
    let flows = if install {
        let coordinates = plans
            .first()
            .map(|p| p.source_plugin().clone())
            .unwrap_or_default();
        let registration = PluginRegistration {
            coordinates,
            flow_plans: plans,
            variables,
        };
        compiler
            .install_plugin(&registration)
            .unwrap_or_else(|e| exit_with_error(&format!("Install failed: {}", e)))
    } else {
        plans
            .iter()
            .map(|plan| compiler.compile(plan, &variables))
            .collect()
    };
    let compile_duration = compile_start.elapsed();

    // --- 3. Results ---
    let rendered = serde_json::to_string_pretty(&flows)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to render flows: {}", e)));
    println!("{}", rendered);

    let invalid = invalid_flows(&flows);
    eprintln!("\n--- Compilation Summary ---");
    eprintln!("Flows compiled:  {}", flows.len());
    eprintln!("Invalid flows:   {}", invalid.len());
    for flow in &invalid {
        for error in &flow.status.errors {
            eprintln!("  -> {}", error);
        }
    }
    eprintln!("Compilation:     {:?}", compile_duration);
    eprintln!("Total Execution: {:?}", total_start.elapsed());
}

fn read_json<T: DeserializeOwned>(path: &str, what: &str) -> T {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read {} file '{}': {}", what, path, e))
    });
    serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse {} JSON: {}", what, e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
