use crate::core::casing::Casing;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extension, validate_path, Validate};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty printed ordered mapping
    Array,
    /// Compact JSON
    Json,
    /// Human readable rendering
    Text,
    /// Versioned round-trippable blob
    Blob,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "model-cast")]
#[command(about = "Casts raw JSON into declared models and serializes them")]
pub struct CliConfig {
    #[arg(long, help = "TOML file with model definitions")]
    pub schema: String,

    #[arg(long, help = "Model type to build from the input")]
    pub model: String,

    #[arg(long, help = "JSON input file, or a blob with --from-blob")]
    pub input: String,

    #[arg(long, value_enum, default_value = "array")]
    pub format: OutputFormat,

    #[arg(long, help = "Key casing: snake or as_declared (defaults to the schema setting)")]
    pub casing: Option<Casing>,

    #[arg(long, help = "Treat the input file as a serialized blob")]
    pub from_blob: bool,

    #[arg(long, help = "Write output to this file instead of stdout")]
    pub output: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("schema", &self.schema)?;
        validate_file_extension("schema", &self.schema, &["toml"])?;
        validate_path("input", &self.input)?;
        if !self.from_blob {
            validate_file_extension("input", &self.input, &["json"])?;
        }
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        Ok(())
    }
}
