use crate::entities::transform::TransformationRequest;
use crate::errors::AppError;
use crate::repositories::media::MediaStore;

/// Translates a transformation descriptor into provider directives,
/// always in the canonical order resize, crop, rotate, watermark,
/// filters, format (the same order `canonicalize` reflects), so key
/// derivation stays consistent with dispatch behavior.
pub fn build_directives(request: &TransformationRequest) -> Vec<String> {
    let mut directives = Vec::new();

    if let Some(r) = &request.resize {
        directives.push(format!("w_{},h_{},c_fill", r.width, r.height));
    }
    if let Some(c) = &request.crop {
        directives.push(format!("w_{},h_{},c_crop,x_{},y_{}", c.width, c.height, c.x, c.y));
    }
    if let Some(angle) = request.rotate {
        directives.push(format!("a_{}", angle));
    }
    if let Some(w) = &request.watermark {
        directives.push(format!(
            "l_text:Arial_24:{},g_center,o_50",
            urlencoding::encode(&w.text)
        ));
    }
    if let Some(f) = &request.filters {
        if f.grayscale {
            directives.push("e_grayscale".to_string());
        }
        if f.sepia {
            directives.push("e_sepia".to_string());
        }
    }
    if let Some(format) = &request.format {
        directives.push(format!("f_{}", format.as_str()));
    }

    directives
}

/// Computes the derived-asset locator for one descriptor against one
/// content id. Boundary failures are surfaced, never retried here.
pub fn dispatch<M: MediaStore>(
    media: &M,
    content_id: &str,
    request: &TransformationRequest,
) -> Result<String, AppError> {
    let directives = build_directives(request);
    if directives.is_empty() {
        return Err(AppError::validation(
            "transformations",
            "At least one transformation is required",
        ));
    }

    Ok(media.transformed_url(content_id, &directives))
}
