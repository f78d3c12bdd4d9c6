use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use nv_core::{ArtifactStore, Config, Gallery, GenerationOutcome, Generator, Result};
use nv_web::AppState;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_number = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| format!("Duration too long: {}", s))?;
                current_number.clear();
                has_number = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| format!("Duration too long: {}", s))?;
            has_number = true;
        }

        if !has_number {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be longer than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Illustrate the news, one article at a time", long_about = None)]
pub struct Cli {
    #[arg(long, default_value = "local", help = "Where images and state live. Available: memory, local, s3")]
    storage: String,
    #[arg(long, default_value = "openai", help = "Image model. Available: openai (default), dummy")]
    model: String,
    #[arg(long, default_value = "newsapi", help = "News source. Available: newsapi (default), fixed")]
    news: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Illustrate one unprocessed article
    Generate {
        /// Keep running, one generation per interval (e.g. 15m, 1h, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Print stored images as JSON
    List,
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: SocketAddr,
    },
}

fn build_generator(cli: &Cli, config: &Config, store: Arc<dyn ArtifactStore>) -> Result<Generator> {
    let news = nv_news::create_source(&cli.news, &config.news)?;
    info!("📰 News source initialized (using {})", news.name());
    let images = nv_inference::create_model(&cli.model, &config.image)?;
    info!("🎨 Image model initialized (using {})", images.name());
    Ok(Generator::new(news, images, store, config.generator_settings()))
}

fn report(outcome: &GenerationOutcome) {
    match outcome {
        GenerationOutcome::Generated {
            image_key,
            style,
            article_title,
            ..
        } => info!(
            "✨ Stored {} for \"{}\" ({})",
            image_key,
            article_title,
            style.as_deref().unwrap_or("no style")
        ),
        GenerationOutcome::Reset { cleared } => {
            info!("🔁 Every article was already processed, cleared {} entries", cleared)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let store = nv_storage::create_storage(&cli.storage, &config.store).await?;
    info!("💾 Storage initialized (using {})", store.name());

    match &cli.command {
        Commands::Generate { interval } => {
            let generator = build_generator(&cli, &config, store)?;
            let mut rng = StdRng::from_entropy();

            match interval {
                Some(interval) => {
                    info!("Running in periodic mode with {}s interval", interval.0.as_secs());
                    loop {
                        info!("Starting generation cycle");
                        match generator.run(&mut rng).await {
                            Ok(outcome) => report(&outcome),
                            Err(e) => error!(kind = e.kind(), "Error during generation: {}", e),
                        }
                        info!("Waiting {}s before next generation", interval.0.as_secs());
                        tokio::time::sleep(interval.0).await;
                    }
                }
                None => report(&generator.run(&mut rng).await?),
            }
        }
        Commands::List => {
            let gallery = Gallery::new(store, config.gallery_settings());
            let images = gallery.list_images().await?;
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "images": images }))?);
        }
        Commands::Serve { addr } => {
            let generator = build_generator(&cli, &config, store.clone())?;
            let gallery = Gallery::new(store, config.gallery_settings());
            nv_web::serve(AppState::new(generator, gallery), *addr).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        let parse = |s: &str| HumanDuration::from_str(s).map(|d| d.0.as_secs());
        assert_eq!(parse("15m"), Ok(900));
        assert_eq!(parse("1h15m30s"), Ok(4530));
        assert_eq!(parse("1d"), Ok(86400));
        assert_eq!(parse("90"), Ok(90));
        assert_eq!(parse("1h 30m"), Ok(5400));
    }

    #[test]
    fn test_human_duration_errors() {
        assert!(HumanDuration::from_str("").is_err());
        assert!(HumanDuration::from_str("m").is_err());
        assert!(HumanDuration::from_str("5w").is_err());
        assert!(HumanDuration::from_str("0s").is_err());
        assert!(HumanDuration::from_str("1h-").is_err());
    }

    #[test]
    fn test_human_duration_overflow() {
        assert!(HumanDuration::from_str("9999999999999999h").is_err());
        assert!(HumanDuration::from_str("99999999999999999d").is_err());
        assert!(HumanDuration::from_str("18446744073709551615s1s").is_err());
        assert!(HumanDuration::from_str("1s18446744073709551615").is_err());
        assert!(Cli::try_parse_from(["nv", "generate", "--interval", "9999999999999999h"]).is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["nv", "--storage", "memory", "generate", "--interval", "15m"]).unwrap();
        assert_eq!(cli.storage, "memory");
        assert_eq!(cli.model, "openai");
        match cli.command {
            Commands::Generate { interval } => {
                assert_eq!(interval, Some(HumanDuration(Duration::from_secs(900))))
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["nv", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { addr } => assert_eq!(addr.port(), 3000),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
