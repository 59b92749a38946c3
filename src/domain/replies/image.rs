use base64::{engine::general_purpose::STANDARD, Engine};
use regex::Regex;
use std::sync::OnceLock;

const DEFAULT_MIME_TYPE: &str = "image/png";

fn data_url_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| {
        Regex::new(r"(?i)^data:(image/(?:png|jpeg|jpg|webp));base64,")
            .expect("data URL pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImageError {
    #[error("No image was provided")]
    Empty,
    #[error("Image data is not valid base64")]
    InvalidEncoding,
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("Image is larger than {0} bytes")]
    TooLarge(usize),
}

/// A chat screenshot ready to be sent to a vision model
#[derive(Debug, Clone, PartialEq)]
pub struct ChatImage {
    pub mime_type: String,
    /// Base64 payload without the data URL prefix
    pub data: String,
}

impl ChatImage {
    /// Parse a browser data URL (or bare base64) into an image payload
    pub fn from_data_url(input: &str, max_bytes: usize) -> Result<Self, ImageError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ImageError::Empty);
        }

        let (mime_type, data) = match data_url_prefix().captures(input) {
            Some(caps) => {
                let mime = caps[1].to_lowercase().replace("image/jpg", "image/jpeg");
                (mime, &input[caps[0].len()..])
            }
            None if input.starts_with("data:") => {
                let declared = input
                    .trim_start_matches("data:")
                    .split([';', ','])
                    .next()
                    .unwrap_or_default()
                    .to_string();
                return Err(ImageError::UnsupportedType(declared));
            }
            None => (DEFAULT_MIME_TYPE.to_string(), input),
        };

        let decoded = STANDARD
            .decode(data)
            .map_err(|_| ImageError::InvalidEncoding)?;
        if decoded.is_empty() {
            return Err(ImageError::Empty);
        }
        if decoded.len() > max_bytes {
            return Err(ImageError::TooLarge(max_bytes));
        }

        Ok(Self {
            mime_type,
            data: data.to_string(),
        })
    }

    /// Build a payload from uploaded file bytes
    pub fn from_bytes(bytes: &[u8], content_type: Option<&str>, max_bytes: usize) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(ImageError::TooLarge(max_bytes));
        }

        let mime_type = match content_type.map(|c| c.trim().to_lowercase()) {
            Some(mime) if mime == "image/jpg" => "image/jpeg".to_string(),
            Some(mime) if ["image/png", "image/jpeg", "image/webp"].contains(&mime.as_str()) => mime,
            Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => {
                return Err(ImageError::UnsupportedType(mime));
            }
            _ => DEFAULT_MIME_TYPE.to_string(),
        };

        Ok(Self {
            mime_type,
            data: STANDARD.encode(bytes),
        })
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}
