use clap::Parser;
use color_eyre::Result;
use engine::request::{
    GenerationRequest, MockupRequest, ProImageRequest, ProductType, VideoRequest,
};
use mockup_studio::{
    cli::{Cli, Command},
    config_path, load_config, save_config,
    run::{build_orchestrator, execute},
    upload::load_image,
};
use strum::IntoEnumIterator;

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;

    let cli = Cli::parse();
    let mut config = load_config()?.unwrap_or_default();
    if let Some(key) = cli.api_key {
        config.api_key = key;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = Some(dir);
    }

    let request: GenerationRequest = match cli.command {
        Command::Products => {
            for product in ProductType::iter() {
                println!("{product}");
            }
            return Ok(());
        }
        Command::Config(args) => {
            let mut stored = load_config()?.unwrap_or_default();
            if args.api_key.is_none() && args.paid_api_key.is_none() {
                println!("{}\n{}", config_path()?.display(), stored.summary());
                return Ok(());
            }
            if let Some(key) = args.api_key {
                stored.api_key = key;
            }
            if let Some(key) = args.paid_api_key {
                stored.paid_api_key = (!key.trim().is_empty()).then_some(key);
            }
            save_config(&stored)?;
            println!("Saved {}", config_path()?.display());
            return Ok(());
        }
        Command::Mockup(args) => {
            MockupRequest::for_product(load_image(&args.logo)?, args.product, &args.details).into()
        }
        Command::Pro(args) => ProImageRequest {
            instructions: args.prompt,
            size: args.size,
            aspect_ratio: args.aspect_ratio,
        }
        .into(),
        Command::Video(args) => VideoRequest {
            image: load_image(&args.image)?,
            motion: args.motion,
            resolution: args.resolution,
            aspect_ratio: args.aspect_ratio,
        }
        .into(),
    };

    let orchestrator = build_orchestrator(&config, !cli.no_prompt);
    let path = execute(&orchestrator, request, &config.output_dir()?).await?;
    println!("{}", path.display());
    Ok(())
}
