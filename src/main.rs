use clap::Parser;
use model_cast::core::registry;
use model_cast::utils::error::ErrorCategory;
use model_cast::utils::{logger, validation::Validate};
use model_cast::{CliConfig, Model, ModelError, OutputFormat, Result, SchemaConfig};

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(&config) {
        tracing::error!("❌ model-cast failed: {} (Category: {:?})", e, e.category());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);

        let exit_code = match e.category() {
            ErrorCategory::Cast | ErrorCategory::Blob => 2,
            ErrorCategory::Schema | ErrorCategory::Config => 1,
            ErrorCategory::System => 3,
        };
        std::process::exit(exit_code);
    }
}

fn run(config: &CliConfig) -> Result<()> {
    config.validate()?;

    let schema = SchemaConfig::from_file(&config.schema)?;
    schema.register()?;
    let casing = config.casing.unwrap_or_else(|| schema.casing());

    let model = if config.from_blob {
        let blob = std::fs::read(&config.input)?;
        let model = Model::deserialize(&blob)?;
        if model.type_name() != config.model {
            return Err(ModelError::deserialization(format!(
                "Blob holds a '{}' model, expected '{}'",
                model.type_name(),
                config.model
            )));
        }
        model
    } else {
        let properties = registry::lookup(&config.model).ok_or_else(|| {
            ModelError::schema(format!("Model '{}' is not defined in {}", config.model, config.schema))
        })?;
        let content = std::fs::read_to_string(&config.input)?;
        Model::from_json(properties, serde_json::from_str(&content)?)?
    };

    tracing::info!(
        "✅ Built '{}' with {} properties",
        model.type_name(),
        model.properties().count()
    );

    let rendered = match config.format {
        OutputFormat::Array => model.to_json_pretty(casing)?.into_bytes(),
        OutputFormat::Json => model.to_json(casing)?.into_bytes(),
        OutputFormat::Text => model.to_text().into_bytes(),
        OutputFormat::Blob => model.serialize()?,
    };

    match &config.output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            tracing::info!("📁 Output saved to: {}", path);
        }
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&rendered)?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
