use serde::Deserialize;
use validator::Validate;

/// A transformation descriptor: an order-independent set of named
/// operations requested against one image. Never persisted; it exists as
/// request input and as the basis of a cache key.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TransformationRequest {
    #[validate(nested)]
    pub resize: Option<Resize>,

    #[validate(nested)]
    pub crop: Option<Crop>,

    #[validate(range(min = -360, max = 360, message = "Angle must be within -360..=360"))]
    pub rotate: Option<i32>,

    #[validate(nested)]
    pub watermark: Option<Watermark>,

    pub filters: Option<Filters>,

    pub format: Option<TargetFormat>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Resize {
    #[validate(range(min = 1, max = 4096, message = "Width must be within 1..=4096"))]
    pub width: u32,

    #[validate(range(min = 1, max = 4096, message = "Height must be within 1..=4096"))]
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Crop {
    #[validate(range(min = 1, max = 4096, message = "Width must be within 1..=4096"))]
    pub width: u32,

    #[validate(range(min = 1, max = 4096, message = "Height must be within 1..=4096"))]
    pub height: u32,

    #[validate(range(min = 0, max = 4096, message = "X offset must be within 0..=4096"))]
    pub x: u32,

    #[validate(range(min = 0, max = 4096, message = "Y offset must be within 0..=4096"))]
    pub y: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Watermark {
    #[validate(length(min = 1, max = 64, message = "Text must be 1-64 characters"))]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub grayscale: bool,

    #[serde(default)]
    pub sepia: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpg,
    Png,
    Webp,
}

impl TargetFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFormat::Jpg => "jpg",
            TargetFormat::Png => "png",
            TargetFormat::Webp => "webp",
        }
    }
}

impl TransformationRequest {
    /// Deterministic normalization used to derive the cache key. Present
    /// operations are emitted in a fixed order (resize, crop, rotate,
    /// watermark, filters, format) so that semantically identical
    /// descriptors collide to the same key regardless of how the client
    /// ordered its fields. Absent and default-valued operations (filters
    /// with both flags off) are omitted.
    pub fn canonicalize(&self) -> String {
        let mut parts = Vec::new();

        if let Some(r) = &self.resize {
            parts.push(format!("resize:{}x{}", r.width, r.height));
        }
        if let Some(c) = &self.crop {
            parts.push(format!("crop:{}x{}@{},{}", c.width, c.height, c.x, c.y));
        }
        if let Some(angle) = self.rotate {
            parts.push(format!("rotate:{}", angle));
        }
        if let Some(w) = &self.watermark {
            parts.push(format!("watermark:{}", w.text));
        }
        if let Some(f) = &self.filters {
            let mut effects = Vec::new();
            if f.grayscale {
                effects.push("grayscale");
            }
            if f.sepia {
                effects.push("sepia");
            }
            if !effects.is_empty() {
                parts.push(format!("filters:{}", effects.join(",")));
            }
        }
        if let Some(format) = &self.format {
            parts.push(format!("format:{}", format.as_str()));
        }

        parts.join(";")
    }

    /// True when no effective operation is present. A `filters` block with
    /// both flags off counts as absent.
    pub fn is_empty(&self) -> bool {
        self.canonicalize().is_empty()
    }
}

/// Cache key for a derived asset: durable content identifier plus the
/// canonical descriptor serialization.
pub fn cache_key(content_id: &str, request: &TransformationRequest) -> String {
    format!("transform:{}:{}", content_id, request.canonicalize())
}
