use std::path::PathBuf;

use engine::request::{AspectRatio, ImageSize, ProductType, VideoAspectRatio, VideoResolution};

#[derive(Debug, clap::Parser)]
#[command(version, about = "Product mockups, promo images and promo videos")]
pub struct Cli {
    /// Basic API key, overrides the config file and environment
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Use the basic key for paid requests instead of asking for one
    #[arg(long)]
    pub no_prompt: bool,

    /// Directory generated files are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Put a logo on a product photo
    Mockup(Mockup),
    /// Generate a high resolution promo image from a prompt
    Pro(Pro),
    /// Animate an image into a short promo clip
    Video(Video),
    /// List the product templates
    Products,
    /// Store keys in the config file
    Config(ConfigArgs),
}

#[derive(Debug, clap::Args)]
pub struct Mockup {
    /// Logo image (png, jpeg or webp, at most 5MB)
    #[arg(short, long)]
    pub logo: PathBuf,

    #[arg(short, long, value_enum, default_value_t)]
    pub product: ProductType,

    /// Extra details for the scene
    #[arg(short, long, default_value = "")]
    pub details: String,
}

#[derive(Debug, clap::Args)]
pub struct Pro {
    #[arg(short, long)]
    pub prompt: String,

    #[arg(short, long, value_enum, default_value_t)]
    pub size: ImageSize,

    #[arg(short = 'r', long = "ratio", value_enum, default_value_t)]
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, clap::Args)]
pub struct Video {
    /// Still image to animate
    #[arg(short, long)]
    pub image: PathBuf,

    /// How the scene should move
    #[arg(short, long)]
    pub motion: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    pub resolution: VideoResolution,

    #[arg(short = 'r', long = "ratio", value_enum, default_value_t)]
    pub aspect_ratio: VideoAspectRatio,
}

#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub api_key: Option<String>,

    /// Paid key used for pro images and videos. Pass "" to forget it.
    #[arg(long)]
    pub paid_api_key: Option<String>,
}
