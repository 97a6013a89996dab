//! Command-line interface for json-schema-rs

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use json_schema::loaders::Loader;
#[cfg(feature = "cli")]
use json_schema::locations::{default_base, Location};
#[cfg(feature = "cli")]
use json_schema::validators::metaschema;
#[cfg(feature = "cli")]
use json_schema::{Pool, Schema, Validator};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "json-schema")]
#[command(author, version, about = "JSON Schema validation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate JSON documents against a schema
    Validate {
        /// Path to the schema file
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Paths to the JSON documents to validate
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Preload a referenced schema document, as URI=FILE
        #[arg(long, value_name = "URI=FILE")]
        preload: Vec<String>,

        /// Output errors as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Check a schema document against the draft-06 meta-schema
    Check {
        /// Path to the schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,
    },

    /// Decode a schema and list every address its references can target
    Inspect {
        /// Path to the schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            schema,
            files,
            preload,
            json,
        } => cmd_validate(schema, files, preload, json),
        Commands::Check { schema } => cmd_check(schema),
        Commands::Inspect { schema, json } => cmd_inspect(schema, json),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

/// Load a schema file and the base URI it is identified by
#[cfg(feature = "cli")]
fn load_schema(path: &PathBuf) -> Result<(Schema, url::Url), Box<dyn std::error::Error>> {
    let location = Location::Path(path.clone());
    let schema = Loader::new().load_schema(&location)?;
    let base = location.base_uri().unwrap_or_else(default_base);
    Ok((schema, base))
}

#[cfg(feature = "cli")]
fn cmd_validate(
    schema_path: PathBuf,
    files: Vec<PathBuf>,
    preload: Vec<String>,
    json_output: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let (schema, base) = load_schema(&schema_path)?;

    let mut remotes = Vec::new();
    for spec in &preload {
        let (uri, file) = spec
            .split_once('=')
            .ok_or_else(|| format!("--preload expects URI=FILE, got '{}'", spec))?;
        let (remote, _) = load_schema(&PathBuf::from(file))?;
        remotes.push((uri.to_string(), remote));
    }

    let mut pool = Pool::with_draft6();
    pool.add_document_at(&schema, base);
    for (uri, remote) in &remotes {
        pool.add_document(remote, Some(uri))?;
    }
    let validator = Validator::new(&pool);

    let loader = Loader::new();
    let mut all_valid = true;
    let mut report = Vec::new();

    for file in &files {
        let instance = loader.load_json(&Location::Path(file.clone()))?;
        let result = validator.validate(&instance, &schema);

        if json_output {
            let mut errors = Vec::new();
            if let Err(ref failures) = result {
                for failure in failures {
                    let mut entry = serde_json::to_value(failure)?;
                    entry["value"] = failure
                        .pointer
                        .lookup(&instance)
                        .cloned()
                        .unwrap_or(serde_json::Value::Null);
                    errors.push(entry);
                }
            }
            report.push(serde_json::json!({
                "file": file.display().to_string(),
                "valid": result.is_ok(),
                "errors": errors,
            }));
        } else {
            match result {
                Ok(()) => println!("✓ {} is valid", file.display()),
                Err(ref errors) => {
                    println!("✗ {} is invalid", file.display());
                    for error in errors {
                        println!("  - {}", error);
                    }
                }
            }
        }

        all_valid &= result.is_ok();
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(all_valid)
}

#[cfg(feature = "cli")]
fn cmd_check(schema_path: PathBuf) -> Result<bool, Box<dyn std::error::Error>> {
    let document = Loader::new().load_json(&Location::Path(schema_path.clone()))?;

    let pool = Pool::with_draft6();
    match Validator::new(&pool).validate(&document, metaschema::draft6()) {
        Ok(()) => {
            println!("✓ {} is a valid draft-06 schema", schema_path.display());
            Ok(true)
        }
        Err(errors) => {
            println!("✗ {} is not a valid draft-06 schema", schema_path.display());
            for error in &errors {
                println!("  - {}", error);
            }
            Ok(false)
        }
    }
}

#[cfg(feature = "cli")]
fn cmd_inspect(schema_path: PathBuf, json_output: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let (schema, base) = load_schema(&schema_path)?;

    let mut pool = Pool::new();
    pool.add_document_at(&schema, base.clone());
    let addresses = pool.addresses();

    if json_output {
        let output = serde_json::json!({
            "base": base.to_string(),
            "addresses": addresses,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("json-schema-rs v{}", json_schema::VERSION);
        println!("Base: {}", base);
        println!("Addresses: {}", addresses.len());
        for address in addresses {
            println!("  {}", address);
        }
    }

    Ok(true)
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
