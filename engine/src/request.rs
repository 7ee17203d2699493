use derive_more::From;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{GenerationError, media::SourceImage};

/// Motion prompt used when a video request carries none.
pub const DEFAULT_MOTION: &str =
    "Animate this product shot with a slow, cinematic camera move and soft studio lighting.";

#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    EnumIter,
    Default,
)]
pub enum ProductType {
    #[default]
    #[strum(to_string = "Ceramic Coffee Mug")]
    Mug,
    #[strum(to_string = "Cotton T-Shirt")]
    Tshirt,
    #[strum(to_string = "Pullover Hoodie")]
    Hoodie,
    #[strum(to_string = "Canvas Tote Bag")]
    Tote,
    #[strum(to_string = "Laptop Sticker")]
    LaptopSticker,
    #[strum(to_string = "Baseball Cap")]
    Cap,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    EnumIter,
    Default,
)]
pub enum ImageSize {
    #[default]
    #[value(name = "1K")]
    #[serde(rename = "1K")]
    #[strum(to_string = "1K")]
    Size1K,
    #[value(name = "2K")]
    #[serde(rename = "2K")]
    #[strum(to_string = "2K")]
    Size2K,
    #[value(name = "4K")]
    #[serde(rename = "4K")]
    #[strum(to_string = "4K")]
    Size4K,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    EnumIter,
    Default,
)]
pub enum AspectRatio {
    #[default]
    #[value(name = "1:1")]
    #[serde(rename = "1:1")]
    #[strum(to_string = "1:1")]
    Square,
    #[value(name = "9:16")]
    #[serde(rename = "9:16")]
    #[strum(to_string = "9:16")]
    Portrait,
    #[value(name = "16:9")]
    #[serde(rename = "16:9")]
    #[strum(to_string = "16:9")]
    Landscape,
    #[value(name = "4:3")]
    #[serde(rename = "4:3")]
    #[strum(to_string = "4:3")]
    Standard,
    #[value(name = "3:4")]
    #[serde(rename = "3:4")]
    #[strum(to_string = "3:4")]
    Tall,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    EnumIter,
    Default,
)]
pub enum VideoResolution {
    #[default]
    #[value(name = "720p")]
    #[serde(rename = "720p")]
    #[strum(to_string = "720p")]
    Hd,
    #[value(name = "1080p")]
    #[serde(rename = "1080p")]
    #[strum(to_string = "1080p")]
    FullHd,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    EnumIter,
    Default,
)]
pub enum VideoAspectRatio {
    #[default]
    #[value(name = "16:9")]
    #[serde(rename = "16:9")]
    #[strum(to_string = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    #[serde(rename = "9:16")]
    #[strum(to_string = "9:16")]
    Portrait,
}

/// Quick composite of a logo onto a product photo.
#[derive(Debug, Clone)]
pub struct MockupRequest {
    pub image: SourceImage,
    pub instructions: String,
}

impl MockupRequest {
    pub fn new(image: SourceImage, instructions: impl Into<String>) -> Self {
        Self {
            image,
            instructions: instructions.into(),
        }
    }

    /// Builds the product-photo prompt around the chosen template.
    pub fn for_product(image: SourceImage, product: ProductType, extra_details: &str) -> Self {
        let extra_details = extra_details.trim();
        let details = if extra_details.is_empty() {
            String::new()
        } else {
            format!(" Additional details: {extra_details}.")
        };

        let instructions = indoc::formatdoc! {"
            Create a realistic, high-quality product photo of a {product}. \
            The product should feature the logo provided in the image input clearly applied to it.\
            {details} Ensure the lighting is professional and the composition is clean."};

        Self::new(image, instructions)
    }
}

/// High-fidelity text-to-image request, needs the paid credential.
#[derive(Debug, Clone)]
pub struct ProImageRequest {
    pub instructions: String,
    pub size: ImageSize,
    pub aspect_ratio: AspectRatio,
}

/// Animates a still image into a short clip, needs the paid credential.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub image: SourceImage,
    pub motion: Option<String>,
    pub resolution: VideoResolution,
    pub aspect_ratio: VideoAspectRatio,
}

impl VideoRequest {
    pub fn motion_prompt(&self) -> &str {
        self.motion.as_deref().unwrap_or(DEFAULT_MOTION)
    }
}

#[derive(Debug, Clone, From)]
pub enum GenerationRequest {
    Mockup(MockupRequest),
    Pro(ProImageRequest),
    Video(VideoRequest),
}

/// Independent state holders. Mockup and pro images share one.
#[derive(Debug, Clone, Copy, Display, PartialEq, Eq, Hash, EnumIter)]
pub enum Slot {
    Image,
    Video,
}

impl GenerationRequest {
    pub fn slot(&self) -> Slot {
        match self {
            GenerationRequest::Mockup(_) | GenerationRequest::Pro(_) => Slot::Image,
            GenerationRequest::Video(_) => Slot::Video,
        }
    }

    pub fn needs_elevated_credential(&self) -> bool {
        !matches!(self, GenerationRequest::Mockup(_))
    }

    /// Cheap local checks, run before any credential or network work.
    pub fn validate(&self) -> Result<(), GenerationError> {
        match self {
            GenerationRequest::Mockup(req) => {
                if req.image.is_empty() {
                    return Err(GenerationError::validation("Please upload a logo first."));
                }
            }
            GenerationRequest::Pro(req) => {
                if req.instructions.trim().is_empty() {
                    return Err(GenerationError::validation(
                        "Please enter a description for the image.",
                    ));
                }
            }
            GenerationRequest::Video(req) => {
                if req.image.is_empty() {
                    return Err(GenerationError::validation(
                        "Please provide an image to animate.",
                    ));
                }
                if req.motion.as_deref().is_some_and(|m| m.trim().is_empty()) {
                    return Err(GenerationError::validation(
                        "Please describe the motion or leave it out.",
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stub::TINY_PNG;

    fn logo() -> SourceImage {
        SourceImage::from_data_uri(&format!("data:image/png;base64,{TINY_PNG}"))
    }

    #[test]
    fn product_prompt_mentions_product_and_details() {
        let req = MockupRequest::for_product(logo(), ProductType::Tote, "on a wooden table");
        assert!(req.instructions.contains("product photo of a Canvas Tote Bag."));
        assert!(req.instructions.contains("Additional details: on a wooden table."));
        assert!(req.instructions.ends_with("the composition is clean."));

        let plain = MockupRequest::for_product(logo(), ProductType::Mug, "  ");
        assert!(!plain.instructions.contains("Additional details"));
        assert!(!plain.instructions.contains('\n'));
    }

    #[test]
    fn slots_and_tiers() {
        let mockup: GenerationRequest = MockupRequest::new(logo(), "x").into();
        let pro: GenerationRequest = ProImageRequest {
            instructions: "x".into(),
            size: ImageSize::Size4K,
            aspect_ratio: AspectRatio::Landscape,
        }
        .into();
        assert_eq!(mockup.slot(), Slot::Image);
        assert_eq!(pro.slot(), Slot::Image);
        assert!(!mockup.needs_elevated_credential());
        assert!(pro.needs_elevated_credential());
    }

    #[test]
    fn video_motion_is_optional_but_not_blank() {
        let mut req = VideoRequest {
            image: logo(),
            motion: None,
            resolution: VideoResolution::Hd,
            aspect_ratio: VideoAspectRatio::Landscape,
        };
        assert_eq!(req.motion_prompt(), DEFAULT_MOTION);
        assert!(GenerationRequest::from(req.clone()).validate().is_ok());

        req.motion = Some("   ".into());
        assert!(matches!(
            GenerationRequest::from(req).validate(),
            Err(GenerationError::Validation(_))
        ));
    }

    #[test]
    fn display_names() {
        assert_eq!(ImageSize::Size2K.to_string(), "2K");
        assert_eq!(AspectRatio::Tall.to_string(), "3:4");
        assert_eq!(VideoResolution::FullHd.to_string(), "1080p");
        assert_eq!(ProductType::LaptopSticker.to_string(), "Laptop Sticker");
    }
}
