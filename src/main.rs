use clap::{Parser, Subcommand};
use rvidu::logger::{self, LogLevel, LoggerConfig};
use rvidu::{
    Config, GenerationRequest, ImageRef, Orientation, PhotoClient, PhotoSearchRequest,
    ReferenceImage, TaskHandle, ViduClient,
};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "rvidu", version, about = "Vidu reference-to-image and Unsplash search client")]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate images from a prompt and 1-7 reference images.
    Generate(GenerateArgs),
    /// Look up a task once and print the raw status body.
    Status { task_id: String },
    /// Poll an existing task until it finishes.
    Wait { task_id: String },
    /// Search Unsplash photos.
    Search(SearchArgs),
    /// Call the health endpoint.
    Health,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    #[arg(long, short)]
    prompt: String,
    /// URL, data URI, or local image path. Repeat for several references.
    #[arg(long = "image", short = 'i')]
    images: Vec<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    aspect_ratio: Option<String>,
    #[arg(long)]
    seed: Option<i64>,
    #[arg(long)]
    callback_url: Option<String>,
    /// Print the task id instead of polling for the result.
    #[arg(long)]
    no_wait: bool,
}

#[derive(Debug, Parser)]
struct SearchArgs {
    query: String,
    #[arg(long)]
    per_page: Option<u32>,
    #[arg(long)]
    orientation: Option<Orientation>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let mut logger_config = if cli.json_logs {
        LoggerConfig::production()
    } else {
        LoggerConfig::default()
    };
    if cli.verbose {
        logger_config = logger_config.with_level(LogLevel::Debug);
    }
    if let Err(e) = logger::init_with_config(logger_config) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    if dotenv_loaded {
        log::debug!("✅ .env file loaded");
    }

    let config = Config::from_env();
    if cli.verbose {
        logger::log_config_info(&config);
    }

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_client_side() => {
            log::error!("{} (nothing was sent)", e);
            ExitCode::from(2)
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: Config) -> rvidu::Result<()> {
    match command {
        Command::Generate(args) => generate(args, config).await,
        Command::Status { task_id } => {
            let client = ViduClient::new(config.vidu, config.poll)?;
            match client.tasks().fetch(&task_id).await {
                Some(body) => println!("{}", serde_json::to_string_pretty(&body)?),
                None => log::warn!("No status endpoint answered for task {}", task_id),
            }
            Ok(())
        }
        Command::Wait { task_id } => {
            let client = ViduClient::new(config.vidu, config.poll)?;
            let images = client.poller().poll(&TaskHandle::new(task_id)).await?;
            print_images(&images);
            Ok(())
        }
        Command::Search(args) => search(args, config).await,
        Command::Health => {
            let client = ViduClient::new(config.vidu, config.poll)?;
            let response = client.health().await?;
            println!("HTTP {}", response.status);
            println!("{}", serde_json::to_string_pretty(&response.body)?);
            Ok(())
        }
    }
}

async fn generate(args: GenerateArgs, config: Config) -> rvidu::Result<()> {
    let mut images = Vec::with_capacity(args.images.len());
    for arg in &args.images {
        images.push(ReferenceImage::from_arg(arg).await?);
    }

    let mut request = GenerationRequest::new(args.prompt).with_images(images);
    if let Some(model) = args.model {
        request = request.with_model(model);
    }
    if let Some(aspect_ratio) = args.aspect_ratio {
        request = request.with_aspect_ratio(aspect_ratio);
    }
    if let Some(seed) = args.seed {
        request = request.with_seed(seed);
    }
    if let Some(callback_url) = args.callback_url {
        request = request.with_callback_url(callback_url);
    }
    request.validate()?;

    let client = ViduClient::new(config.vidu, config.poll)?;

    if args.no_wait {
        match client.image().generate(&request).await? {
            rvidu::GenerationOutcome::Completed { images, .. } => print_images(&images),
            rvidu::GenerationOutcome::Pending(task) => println!("task_id: {}", task),
            rvidu::GenerationOutcome::Empty { raw } => {
                log::warn!("Request succeeded but returned no images or task id");
                if let Some(raw) = raw {
                    println!("{}", serde_json::to_string_pretty(&raw)?);
                }
            }
        }
        return Ok(());
    }

    let images = client.submit(&request).await?;
    print_images(&images);
    Ok(())
}

async fn search(args: SearchArgs, config: Config) -> rvidu::Result<()> {
    let mut request = PhotoSearchRequest::new(args.query);
    if let Some(per_page) = args.per_page {
        request = request.with_per_page(per_page);
    }
    if let Some(orientation) = args.orientation {
        request = request.with_orientation(orientation);
    }

    let client = PhotoClient::new(config.unsplash)?;
    let response = client.search(&request).await?;

    for photo in &response.results {
        println!(
            "{}\t{}\t{}",
            photo.id,
            photo.display_url().unwrap_or("-"),
            photo.caption().unwrap_or("")
        );
    }
    Ok(())
}

fn print_images(images: &[ImageRef]) {
    if images.is_empty() {
        log::warn!("No images returned");
    }
    for image in images {
        println!("{}", image);
    }
}
