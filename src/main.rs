use futures::StreamExt;
use genvisual::{
    logger::{self, LogLevel, LoggerConfig},
    AspectRatio, AssetResolver, AssetView, Config, GenerationOutcome, GenerationRequest,
};
use std::env;
use std::fs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_loaded = dotenv::dotenv().is_ok();

    let level = env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| level.parse::<LogLevel>().ok())
        .unwrap_or(LogLevel::Info);
    logger::init_with_config(LoggerConfig::development().with_level(level))?;

    if env_loaded {
        log::info!(".env file loaded");
    } else {
        log::warn!("No .env file found, using system environment variables");
    }

    let mut args = env::args().skip(1);
    let prompt = match args.next() {
        Some(prompt) => prompt,
        None => {
            eprintln!("usage: genvisual <prompt> [1:1|16:9|4:3]");
            std::process::exit(2);
        }
    };
    let aspect_ratio = match args.next() {
        Some(ratio) => ratio.parse::<AspectRatio>()?,
        None => AspectRatio::default(),
    };

    let config = Config::from_env();
    logger::log_config_info(&config);

    let resolver = AssetResolver::from_config(&config)?;
    let request = GenerationRequest::new(prompt.clone(), aspect_ratio)?;
    log::info!(
        "Resolving '{}' ({}) with {}",
        request.prompt(),
        aspect_ratio,
        resolver.model()
    );

    let mut outcomes = resolver.resolve(request);
    while let Some(outcome) = outcomes.next().await {
        let view = AssetView::from_outcome(&outcome, &prompt);
        log::info!("State: {} ({})", outcome.label(), view.alt);

        match &outcome {
            GenerationOutcome::Loading => {}
            GenerationOutcome::Ready(handle) => match handle.decode_inline() {
                Some(bytes) => {
                    let extension = handle
                        .mime_type()
                        .and_then(|mime| mime.strip_prefix("image/"))
                        .unwrap_or("png");
                    let filename = format!(
                        "generated_image_{}.{}",
                        chrono::Utc::now().timestamp(),
                        extension
                    );
                    fs::write(&filename, bytes)?;
                    log::info!("Image saved to: {}", filename);
                    println!("{}", filename);
                }
                None => log::error!("Generated asset could not be decoded"),
            },
            GenerationOutcome::Fallback(handle) => {
                log::warn!("Generation unavailable, fallback image: {}", handle);
                println!("{}", handle);
            }
        }
    }

    Ok(())
}
