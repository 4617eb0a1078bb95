use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use factwriter_config::{BadRecordAction, RuntimeConfig};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

/// Write Avro-described records into segmented columnar fact files
#[derive(Parser)]
#[command(name = "factwriter")]
#[command(version)]
#[command(about = "Write Avro-described records into segmented columnar fact files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write JSON lines as fact files into a segment
    Write(WriteArgs),
    /// Print the columnar schema an Avro schema translates to
    Schema {
        /// Avro schema file (.avsc)
        #[arg(short, long, value_name = "FILE")]
        schema: PathBuf,
    },
}

#[derive(Args)]
struct WriteArgs {
    /// Avro schema file (.avsc)
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,

    /// JSON lines input, one record per line (stdin if omitted)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output root (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Segment id (default: "null")
    #[arg(long, value_name = "ID")]
    segment_id: Option<String>,

    /// Sort columns in precedence order, comma separated
    #[arg(long, value_name = "COLUMNS", value_delimiter = ',')]
    sort_by: Option<Vec<String>>,

    /// Write directly into the output root instead of Fact/Part0/Segment_<id>
    #[arg(long)]
    non_transactional: bool,

    /// Log and skip records that do not fit the schema instead of failing
    #[arg(long)]
    skip_bad_records: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Step 1: Load base configuration
    let mut config = match &cli.config {
        Some(config_path) => RuntimeConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?,
        None => RuntimeConfig::load().context("Failed to load configuration")?,
    };

    // Step 2: Apply global CLI overrides and start logging
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    factwriter::init_tracing(&config.log);

    match cli.command {
        Commands::Write(args) => run_write(config, args),
        Commands::Schema { schema } => run_schema(schema),
    }
}

fn run_write(mut config: RuntimeConfig, args: WriteArgs) -> Result<()> {
    apply_write_overrides(&mut config, &args);
    config.validate().context("Invalid configuration")?;

    let schema = factwriter::load_avro_schema(&args.schema)?;
    let summary = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            factwriter::write_json_lines(&schema, config.writer, BufReader::new(file))?
        }
        None => factwriter::write_json_lines(&schema, config.writer, io::stdin().lock())?,
    };

    let rendered =
        serde_json::to_string_pretty(&summary).context("Failed to render write summary")?;
    println!("{}", rendered);
    Ok(())
}

fn apply_write_overrides(config: &mut RuntimeConfig, args: &WriteArgs) {
    if let Some(output) = &args.output {
        config.writer.output_path = output.clone();
    }
    if let Some(segment_id) = &args.segment_id {
        config.writer.segment_id = Some(segment_id.clone());
    }
    if let Some(columns) = &args.sort_by {
        config.writer.sort_by = columns
            .iter()
            .map(|column| column.trim().to_string())
            .filter(|column| !column.is_empty())
            .collect();
    }
    if args.non_transactional {
        config.writer.is_transactional_table = false;
    }
    if args.skip_bad_records {
        config.writer.bad_record_action = BadRecordAction::Skip;
    }
}

fn run_schema(path: PathBuf) -> Result<()> {
    let schema = factwriter::translate_schema_file(&path)?;
    let rendered = serde_json::to_string_pretty(&schema).context("Failed to render schema")?;
    println!("{}", rendered);
    Ok(())
}
