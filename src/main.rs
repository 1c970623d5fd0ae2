//! classctl: inspect the validation rules a method signature compiles to.

use std::env;
use std::process;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

use class_controller::controller::destructure;
use class_controller::rules::compile_rules;
use class_controller::signature::MethodSignature;
use class_controller::validation::{RuleValidator, ValidationEngine};
use class_controller::value::{Fields, Value};

const VERSION: &str = env!("CARGO_PKG_VERSION", "0.4.0");

/// CLI command to execute.
enum Command {
    /// Print the rules compiled from a signature
    Rules { signature: String },
    /// Validate JSON fields against a signature
    Check { signature: String, fields: String },
    Help,
    Version,
}

fn print_usage() {
    eprintln!("classctl {} - class controller rule inspector", VERSION);
    eprintln!();
    eprintln!("Usage: classctl rules <signature>");
    eprintln!("       classctl check <signature> <json fields>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  rules <signature>          Print the compiled rule set as JSON");
    eprintln!("  check <signature> <json>   Validate fields and print the positional arguments");
    eprintln!("  version                    Show the version");
    eprintln!("  help                       Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  classctl rules 'intOrFloatParam(param: int|float)'");
    eprintln!("  classctl check 'sum(...values: int)' '{{\"values\": [\"1\", 2]}}'");
    eprintln!();
    eprintln!("Set RUST_LOG=debug to see validation traces.");
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message.red());
    print_usage();
    process::exit(64);
}

fn parse_args() -> Command {
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("help") | Some("--help") | Some("-h") => Command::Help,
        Some("version") | Some("--version") | Some("-V") => Command::Version,
        Some("rules") => match args.get(1) {
            Some(signature) if args.len() == 2 => Command::Rules {
                signature: signature.clone(),
            },
            _ => usage_error("rules requires exactly one signature"),
        },
        Some("check") => match (args.get(1), args.get(2)) {
            (Some(signature), Some(fields)) if args.len() == 3 => Command::Check {
                signature: signature.clone(),
                fields: fields.clone(),
            },
            _ => usage_error("check requires a signature and a JSON object"),
        },
        Some(other) => usage_error(&format!("Unknown command: {}", other)),
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("class_controller=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match parse_args() {
        Command::Help => print_usage(),
        Command::Version => println!("classctl {}", VERSION),
        Command::Rules { signature } => run_rules(&signature),
        Command::Check { signature, fields } => run_check(&signature, &fields),
    }
}

fn parse_signature_or_exit(text: &str) -> MethodSignature {
    match MethodSignature::parse(text) {
        Ok(signature) => signature,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            process::exit(65);
        }
    }
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {}>", e))
}

fn run_rules(text: &str) {
    let signature = parse_signature_or_exit(text);
    let rules = compile_rules(signature.parameters());
    println!("{}", signature.to_string().bold());
    println!("{}", to_pretty_json(&rules));
}

fn run_check(text: &str, raw_fields: &str) {
    let signature = parse_signature_or_exit(text);

    let fields: Fields = match serde_json::from_str::<serde_json::Value>(raw_fields).map(Value::from) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            eprintln!(
                "{} fields must be a JSON object, got {}",
                "error:".red().bold(),
                other.type_name()
            );
            process::exit(65);
        }
        Err(e) => {
            eprintln!("{} invalid JSON: {}", "error:".red().bold(), e);
            process::exit(65);
        }
    };

    let rules = compile_rules(signature.parameters());
    let validated = RuleValidator::new().validate(&fields, &rules);

    if validated.fails() {
        println!("{} {}", "✗".red(), "validation failed".red().bold());
        println!("{}", to_pretty_json(&validated.errors));
        process::exit(1);
    }

    let arguments = destructure(signature.parameters(), &validated.fields);
    println!("{} {}", "✓".green(), "valid".green().bold());
    println!("{}", to_pretty_json(&arguments));
}
