use clap::{Parser, Subcommand};
use genai_social_proxy::utils::data_url;
use genai_social_proxy::{Config, GenAiClient, GenerationRequest, GraphClient, PublishRequest};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mediactl", about = "CLI for the GenAI Social Proxy", version)]
struct Cli {
    /// Override GENAI_BASE_URL
    #[arg(global = true, long)]
    genai_url: Option<String>,

    /// Override GRAPH_API_URL
    #[arg(global = true, long)]
    graph_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate text for a prompt
    Text {
        #[arg(long)]
        prompt: String,
    },
    /// Generate an image and save it
    Image {
        #[arg(long)]
        prompt: String,
        /// Output path (defaults to ./image.<ext>)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Generate a video, waiting for the job to finish
    Video {
        #[arg(long)]
        prompt: String,
        /// Seed image used as the first frame
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
        /// Output path (defaults to ./<asset id>.mp4)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Publish a post to a page or feed
    Post {
        /// Target page/feed identifier
        #[arg(long)]
        target: String,
        #[arg(long)]
        message: String,
        /// Image file path or URL (repeatable; only the first is published)
        #[arg(long = "image", value_name = "PATH|URL")]
        images: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load env and parse CLI
    Config::dotenv_load();
    let cli = Cli::parse();

    let mut conf = Config::new();
    if let Some(url) = cli.genai_url {
        conf.genai_base_url = url;
    }
    if let Some(url) = cli.graph_url {
        conf.graph_api_url = url;
    }

    let result = match cli.command {
        Commands::Text { prompt } => {
            let client = GenAiClient::from_config(&conf);
            client.generate_text(&prompt).await.map(|text| println!("{}", text))
        }
        Commands::Image { prompt, out } => {
            let client = GenAiClient::from_config(&conf);
            match client.generate_image(&prompt).await {
                Ok(url) => {
                    let image = data_url::decode(&url)?;
                    let path = out.unwrap_or_else(|| PathBuf::from(image.file_name("image")));
                    tokio::fs::write(&path, &image.bytes).await?;
                    println!("Saved {} ({} bytes)", path.display(), image.bytes.len());
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Commands::Video { prompt, image, out } => {
            let client = GenAiClient::from_config(&conf);
            let mut request = GenerationRequest::new(prompt);
            if let Some(path) = image {
                let bytes = tokio::fs::read(&path).await?;
                request = request.with_seed_image(bytes, data_url::mime_from_extension(&path));
            }
            eprintln!("Waiting for video generation; this can take several minutes...");
            match client.generate_video(&request).await {
                Ok(video) => {
                    let path = out.unwrap_or_else(|| PathBuf::from(format!("{}.mp4", video.id())));
                    let size = video.len();
                    tokio::fs::write(&path, video.into_bytes()).await?;
                    println!("Saved {} ({} bytes)", path.display(), size);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Commands::Post { target, message, images } => {
            let client = GraphClient::from_config(&conf);
            let mut request = PublishRequest::new(target, message);
            for image in images {
                request = request.with_image_url(image_reference(&image).await?);
            }
            match client.publish(&request).await {
                Ok(result) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// URLs pass through; local files become `data:` URIs.
async fn image_reference(value: &str) -> std::io::Result<String> {
    if value.starts_with("http://") || value.starts_with("https://") || data_url::is_data_url(value) {
        return Ok(value.to_string());
    }
    let path = Path::new(value);
    let bytes = tokio::fs::read(path).await?;
    Ok(data_url::encode(data_url::mime_from_extension(path), &bytes))
}
