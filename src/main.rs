use enlink::cli::{Cli, Commands, ConfigAction};
use enlink::config::Config;
use enlink::enrichment::{EnrichmentEngine, LinkOutcome};
use enlink::entities::{
    CategorizedMentions, ChatCompletionExtractor, EntityExtractor, Label, LabelSet,
    PrecomputedExtractor,
};
use enlink::error::{EnlinkError, Result};
use enlink::resolver::{RetryPolicy, WikipediaResolver};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Enrich {
            text,
            file,
            mentions,
            whitelist,
            json,
        } => {
            cmd_enrich(cli.config, text, file, mentions, whitelist, json)?;
        }
        Commands::Extract { text, file } => {
            cmd_extract(cli.config, text, file)?;
        }
        Commands::Resolve { mention } => {
            cmd_resolve(cli.config, &mention)?;
        }
        Commands::Labels => {
            cmd_labels();
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "enlink=debug" } else { "enlink=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_enrich(
    config_path: Option<PathBuf>,
    text: Option<String>,
    file: Option<PathBuf>,
    mentions_file: Option<PathBuf>,
    whitelist: Option<String>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let text = read_input(text, file)?;

    let whitelist = match whitelist {
        Some(list) => LabelSet::parse_list(&list).map_err(|e| EnlinkError::InvalidConfigValue {
            path: "--whitelist".to_string(),
            message: e.to_string(),
        })?,
        None => config.enrichment.whitelist,
    };

    let extractor: Box<dyn EntityExtractor> = match mentions_file {
        Some(path) => Box::new(PrecomputedExtractor::new(load_mentions(&path)?)),
        None => Box::new(ChatCompletionExtractor::from_config(&config.extractor)?),
    };

    let engine = build_engine(&config)?;
    let enrichment = runtime()?.block_on(engine.extract_and_enrich(
        extractor.as_ref(),
        &text,
        &LabelSet::all(),
        &whitelist,
    ))?;

    if json {
        let out = serde_json::to_string_pretty(&enrichment).map_err(|e| EnlinkError::Json {
            source: e,
            context: "Failed to serialize enrichment".to_string(),
        })?;
        println!("{}", out);
    } else {
        println!("{}", enrichment.text);
    }

    Ok(())
}

fn cmd_extract(
    config_path: Option<PathBuf>,
    text: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let text = read_input(text, file)?;

    let extractor = ChatCompletionExtractor::from_config(&config.extractor)?;
    let mentions = runtime()?.block_on(extractor.extract(&text, &LabelSet::all()))?;

    let out = mentions.to_json().map_err(|e| EnlinkError::Json {
        source: e,
        context: "Failed to serialize mentions".to_string(),
    })?;
    println!("{}", out);

    Ok(())
}

fn cmd_resolve(config_path: Option<PathBuf>, mention: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let engine = build_engine(&config)?;

    match runtime()?.block_on(engine.resolve_one(mention)) {
        LinkOutcome::Resolved { reference } => println!("{}", reference),
        LinkOutcome::Unresolved { reason } => println!("No reference ({:?})", reason),
    }

    Ok(())
}

fn cmd_labels() {
    for label in Label::ALL {
        let marker = if LabelSet::LINKABLE.contains(label) {
            "*"
        } else {
            " "
        };
        println!("{} {:<12} {}", marker, label.as_str(), label.description());
    }
    println!("\n* linked by default");
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let toml = toml::to_string_pretty(&config)?;
            println!("{}", toml);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| EnlinkError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::debug!(
            "Config file not found, using defaults. Run 'enlink config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        enlink::config::ConfigValidator::validate(&config)?;
        return Ok(config);
    }

    Config::load(&path)
}

fn build_engine(config: &Config) -> Result<EnrichmentEngine> {
    let settings = config.resolver_settings()?;
    let resolver = WikipediaResolver::new(&settings)
        .map_err(|e| EnlinkError::Config(format!("Failed to build resolver: {}", e)))?;

    Ok(EnrichmentEngine::new(
        Arc::new(resolver),
        RetryPolicy::new(config.retry_config()?),
        settings.max_concurrent,
    ))
}

fn load_mentions(path: &Path) -> Result<CategorizedMentions> {
    let content = std::fs::read_to_string(path).map_err(|e| EnlinkError::Io {
        source: e,
        context: format!("Failed to read mentions file: {:?}", path),
    })?;
    CategorizedMentions::from_json(&content).map_err(|e| EnlinkError::Json {
        source: e,
        context: format!("Invalid mentions file: {:?}", path),
    })
}

fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    if let Some(path) = file {
        return std::fs::read_to_string(&path).map_err(|e| EnlinkError::Io {
            source: e,
            context: format!("Failed to read input file: {:?}", path),
        });
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| EnlinkError::Io {
            source: e,
            context: "Failed to read text from stdin".to_string(),
        })?;
    Ok(buf)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| EnlinkError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })
}
