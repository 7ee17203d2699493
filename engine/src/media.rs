use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;

use crate::GenerationError;

const KNOWN_IMAGE_FORMATS: [&str; 4] = ["png", "jpeg", "jpg", "webp"];
const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Decoded image or video payload, ready to be displayed or saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl MediaAsset {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.bytes))
    }

    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }
}

/// Image input as it is sent to the backend: raw base64 plus its mime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub mime_type: String,
    pub base64: String,
}

impl SourceImage {
    /// Accepts either a `data:image/...;base64,` URI or bare base64.
    ///
    /// The payload itself is not validated, the backend decides whether it
    /// accepts it.
    pub fn from_data_uri(data_uri: &str) -> Self {
        Self {
            mime_type: data_uri_mime_type(data_uri)
                .unwrap_or(DEFAULT_IMAGE_MIME)
                .to_string(),
            base64: strip_encoding_prefix(data_uri).to_string(),
        }
    }

    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64: BASE64.encode(bytes),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.base64.trim().is_empty()
    }
}

/// Removes a `data:image/<fmt>;base64,` prefix for png, jpeg, jpg and webp.
/// Anything else passes through unchanged.
pub fn strip_encoding_prefix(data_uri: &str) -> &str {
    let Some(rest) = data_uri.strip_prefix("data:image/") else {
        return data_uri;
    };

    KNOWN_IMAGE_FORMATS
        .iter()
        .find_map(|fmt| rest.strip_prefix(fmt)?.strip_prefix(";base64,"))
        .unwrap_or(data_uri)
}

pub fn wrap_as_displayable_image(raw_base64: &str, mime_type: &str) -> String {
    format!("data:{mime_type};base64,{raw_base64}")
}

/// Mime type named by a `data:<mime>;base64,` prefix, if there is one.
pub fn data_uri_mime_type(data_uri: &str) -> Option<&str> {
    let (mime, _) = data_uri.strip_prefix("data:")?.split_once(";base64,")?;
    (!mime.is_empty()).then_some(mime)
}

/// Decodes an inline base64 payload returned by the backend.
pub fn decode_inline(raw_base64: &str, mime_type: &str) -> Result<MediaAsset, GenerationError> {
    let bytes = BASE64
        .decode(raw_base64.trim().as_bytes())
        .map_err(|e| GenerationError::MalformedPayload(format!("inline data: {e}")))?;
    Ok(MediaAsset::new(bytes, mime_type))
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        m if m.starts_with("video/") => "mp4",
        _ => "png",
    }
}
