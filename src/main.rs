use anyhow::Result;
use clap::{Parser, Subcommand};
use querysmith::advisor::{optimize_sql, validate_sql};
use querysmith::config::AppConfig;
use querysmith::logging::init_tracing;
use querysmith::orchestrator::GenerationOrchestrator;

#[derive(Parser)]
#[command(name = "querysmith")]
#[command(about = "Turn natural language into SQL")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate SQL from a description
    Generate {
        /// The query in natural language
        description: String,

        /// Provider to use (overrides AI_PROVIDER)
        #[arg(short, long)]
        provider: Option<String>,

        /// Path to a schema JSON file (overrides DATABASE_SCHEMA)
        #[arg(short, long)]
        schema: Option<std::path::PathBuf>,
    },
    /// Check that a statement looks like a query
    Validate { sql: String },
    /// Suggest cosmetic improvements for a statement
    Optimize { sql: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let output = match args.command {
        Command::Generate { description, provider, schema } => {
            let mut config = AppConfig::from_env()?;
            if let Some(provider) = provider {
                config = config.with_provider(provider);
            }
            if let Some(path) = schema {
                config = config.with_schema(std::fs::read_to_string(&path)?);
            }
            let result = GenerationOrchestrator::new(config).generate(&description).await?;
            serde_json::to_value(&result)?
        }
        Command::Validate { sql } => serde_json::to_value(validate_sql(&sql))?,
        Command::Optimize { sql } => serde_json::to_value(optimize_sql(&sql))?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
