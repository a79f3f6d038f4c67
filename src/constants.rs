use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Upload MIME allowlist, matching the provider's supported source formats.
pub const ALLOWED_IMAGE_MIME: &[&str] = &["image/jpeg", "image/png"];
