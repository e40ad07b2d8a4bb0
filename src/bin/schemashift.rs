//! schemashift — schema diff CLI
//!
//! # Usage
//!
//! ```bash
//! # Print the migration from one schema file to another
//! schemashift diff old.sql new.sql
//!
//! # Write it as a timestamped migration file
//! schemashift diff old.sql new.sql --output migrations --name rename_person
//!
//! # Show what the parser sees
//! schemashift parse schema.sql
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use schemashift::output::{self, LineKind, MigrationFile};
use schemashift::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schemashift")]
#[command(version)]
#[command(about = "Diff two SQL schema definitions into migration statements", long_about = None)]
#[command(after_help = "EXAMPLES:
    schemashift diff old.sql new.sql
    schemashift diff old.sql new.sql --format json
    schemashift diff old.sql new.sql --output migrations --name add_age
    schemashift parse schema.sql")]
struct Cli {
    /// Verbose logging (same as SCHEMASHIFT_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate migration statements from OLD to NEW
    Diff {
        /// Current schema file
        old: PathBuf,
        /// Target schema file
        new: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Directory to write a timestamped migration file into
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Migration name used in the file name
        #[arg(short, long, default_value = "migration")]
        name: String,

        /// Exit with status 1 when any ERROR line is produced
        #[arg(long)]
        strict: bool,

        /// Config file (defaults to ./schemashift.toml)
        #[arg(short, long, env = "SCHEMASHIFT_CONFIG")]
        config: Option<PathBuf>,

        /// Similarity needed to treat a missing table as renamed
        #[arg(long)]
        rename_threshold: Option<f64>,

        /// Similarity needed to suggest copying data into a new table
        #[arg(long)]
        replace_threshold: Option<f64>,
    },
    /// Parse a schema file and show its types and tables
    Parse {
        /// Schema file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Diff {
            old,
            new,
            format,
            output,
            name,
            strict,
            config,
            rename_threshold,
            replace_threshold,
        }) => run_diff(DiffArgs {
            old,
            new,
            format,
            output,
            name,
            strict,
            config,
            rename_threshold,
            replace_threshold,
        }),
        Some(Commands::Parse { file, format }) => run_parse(&file, format),
        None => {
            println!("{}", "schemashift — schema diff & migration generator".cyan().bold());
            println!();
            println!("Usage: schemashift diff <OLD> <NEW> [OPTIONS]");
            println!();
            println!("Try: schemashift --help");
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("SCHEMASHIFT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct DiffArgs {
    old: PathBuf,
    new: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
    name: String,
    strict: bool,
    config: Option<PathBuf>,
    rename_threshold: Option<f64>,
    replace_threshold: Option<f64>,
}

fn read_schema(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Returns `Ok(false)` when `--strict` is set and errors were reported.
fn run_diff(args: DiffArgs) -> Result<bool> {
    let mut options = Config::discover(args.config.as_deref())?.diff;
    if let Some(t) = args.rename_threshold {
        options.rename_threshold = t;
    }
    if let Some(t) = args.replace_threshold {
        options.replacement_threshold = t;
    }
    options.validate()?;

    let old_text = read_schema(&args.old)?;
    let new_text = read_schema(&args.new)?;
    let lines = generate_schema_alters_with(&old_text, &new_text, &options);

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output::annotate(&lines))?);
        }
        OutputFormat::Text => print_lines(&lines),
    }

    if let Some(dir) = &args.output {
        if lines.is_empty() {
            eprintln!("{}", "No changes; migration file not written".dimmed());
        } else {
            let path = MigrationFile::new(&args.name, lines.clone()).write_to(dir)?;
            eprintln!("{} Wrote migration to {}", "✓".green(), path.display().to_string().cyan());
        }
    }

    Ok(!(args.strict && output::has_errors(&lines)))
}

fn print_lines(lines: &[String]) {
    if lines.is_empty() {
        println!("{}", "✓ No changes - schemas are identical".green());
        return;
    }
    for line in lines {
        let styled = match classify(line) {
            LineKind::Error => line.red().bold(),
            LineKind::Caution => line.yellow().bold(),
            LineKind::Note => line.dimmed(),
            LineKind::Command => line.normal(),
        };
        println!("{}", styled);
    }
}

fn run_parse(file: &Path, format: OutputFormat) -> Result<bool> {
    let text = read_schema(file)?;
    let schema = match parse_schema(&text) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("{} {}", "Parse Error:".red().bold(), e);
            return Ok(false);
        }
    };

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(true);
    }

    println!("{} {}", "Schema:".dimmed(), file.display().to_string().yellow());
    println!();

    if !schema.types.is_empty() {
        println!("{}", "Types:".green().bold());
        for (name, def) in &schema.types {
            match def {
                TypeDef::Enum { values } => {
                    println!("  {} {} ({})", name.cyan(), "ENUM".dimmed(), values.join(", "))
                }
                TypeDef::Composite { definition } => {
                    println!("  {} {} {}", name.cyan(), "AS".dimmed(), definition)
                }
            }
        }
        println!();
    }

    if !schema.tables.is_empty() {
        println!("{}", "Tables:".green().bold());
        for (name, columns) in &schema.tables {
            println!("  {}", name.cyan().bold());
            for col in columns {
                let mut flags = Vec::new();
                if col.not_null {
                    flags.push("NOT NULL".to_string());
                }
                if let Some(value) = &col.default {
                    flags.push(format!("DEFAULT {}", value));
                }
                println!(
                    "    • {} {} {}",
                    col.name.white(),
                    col.data_type.yellow(),
                    flags.join(" ").dimmed()
                );
            }
        }
    }

    if schema.is_empty() {
        println!("{}", "(no types or tables)".dimmed());
    }

    Ok(true)
}
