use anyhow::Result;
use clap::{Parser, Subcommand};
use pet_recipe::{
    config::{self, Config, LogFormat},
    pipeline::Pipeline,
    prompt::SubjectInfo,
    vision::{self, HttpLabelDetector},
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

const DEFAULT_IMAGE: &str = "assets/sample_image.jpeg";

/// Turns a photo of ingredients into a pet food recipe and a picture of the dish
#[derive(Parser)]
#[command(name = "pet-recipe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect ingredients, write a recipe and render it (the default)
    Run {
        /// Photo of the ingredients
        #[arg(default_value = DEFAULT_IMAGE)]
        image: PathBuf,

        /// Breed of the pet the recipe is for
        #[arg(long, default_value = "Golden Retriever")]
        breed: String,

        /// Age of the pet in years
        #[arg(long, default_value_t = 2)]
        age: u32,

        /// Where to write the recipe text (overrides config)
        #[arg(long)]
        recipe_out: Option<PathBuf>,

        /// Where to write the generated image (overrides config)
        #[arg(long)]
        image_out: Option<PathBuf>,

        /// Print the run outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print every label the detection service finds, unfiltered
    Labels {
        /// Image to analyze
        #[arg(default_value = DEFAULT_IMAGE)]
        image: PathBuf,

        /// Maximum number of labels to request
        #[arg(long, default_value_t = vision::DEFAULT_MAX_LABELS)]
        max_labels: u32,
    },
}

fn init_tracing(config: &Config) -> Result<()> {
    // Environment variable overrides config
    let log_level = config::log_directives(&config.logs, std::env::var("RUST_LOG").ok())?;

    let filter = tracing_subscriber::EnvFilter::try_new(&log_level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.logs.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.with_target(false).init(),
    }

    info!("Log level: {}", log_level);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration first (before logging setup)
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, mut config: Config) -> Result<ExitCode> {
    let command = cli.command.unwrap_or(Commands::Run {
        image: PathBuf::from(DEFAULT_IMAGE),
        breed: SubjectInfo::default().breed,
        age: SubjectInfo::default().age,
        recipe_out: None,
        image_out: None,
        json: false,
    });

    match command {
        Commands::Run {
            image,
            breed,
            age,
            recipe_out,
            image_out,
            json,
        } => {
            if let Some(path) = recipe_out {
                config.output.recipe_path = path.to_string_lossy().into_owned();
            }
            if let Some(path) = image_out {
                config.output.image_path = path.to_string_lossy().into_owned();
            }

            let pipeline = Pipeline::from_config(&config)?;
            let outcome = pipeline.run(&image, &SubjectInfo::new(breed, age)).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", outcome);
            }

            Ok(if outcome.completed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Labels { image, max_labels } => {
            let bytes = tokio::fs::read(&image).await?;
            let detector = HttpLabelDetector::new(config.vision);
            let labels = vision::detect_labels(&detector, &bytes, max_labels).await?;
            println!("Labels detected: {:?}", labels);
            Ok(ExitCode::SUCCESS)
        }
    }
}
