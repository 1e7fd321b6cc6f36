//! Mask resolution for inpaint jobs.
//!
//! Remove-mode edits carry a brush mask as a base64 data URL. Add-mode
//! edits may instead carry a placement rectangle, from which a
//! white-on-black mask is rasterized at canvas size.

use std::io::Cursor;

use base64::Engine;
use image::{GrayImage, Luma};

use prop_models::{EditMode, PlacementRect};

use crate::error::{WorkerError, WorkerResult};

/// Decode a `data:<mime>;base64,<payload>` URL into raw bytes.
pub fn decode_data_url(data_url: &str) -> WorkerResult<Vec<u8>> {
    let payload = data_url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| WorkerError::validation("Mask is not a base64 data URL"))?;

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| WorkerError::validation(format!("Mask data URL is not valid base64: {}", e)))
}

/// Rasterize a placement rectangle into a PNG mask.
///
/// The canvas is black; the rectangle is white. Dimensions come from the
/// rectangle's canvas fields so the mask lines up with the source image.
pub fn rasterize_rect_mask(rect: &PlacementRect) -> WorkerResult<Vec<u8>> {
    if !rect.is_valid() {
        return Err(WorkerError::validation(
            "Placement rectangle is empty or outside the canvas",
        ));
    }

    let mut mask = GrayImage::new(rect.canvas_width, rect.canvas_height);
    for y in rect.top..rect.top + rect.height {
        for x in rect.left..rect.left + rect.width {
            mask.put_pixel(x, y, Luma([255u8]));
        }
    }

    let mut bytes = Vec::new();
    mask.write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .map_err(|e| WorkerError::job_failed(format!("Failed to encode mask: {}", e)))?;
    Ok(bytes)
}

/// Resolve the mask bytes for an edit, enforcing the mode rules:
/// remove requires a drawn mask; add may derive one from a rectangle or
/// proceed with none.
pub fn resolve_mask(
    mode: EditMode,
    mask_data_url: Option<&str>,
    placement_rect: Option<&PlacementRect>,
) -> WorkerResult<Option<Vec<u8>>> {
    match (mode, mask_data_url, placement_rect) {
        (EditMode::Remove, None, _) => {
            Err(WorkerError::validation("Mask is required for remove mode"))
        }
        (_, Some(data_url), _) => Ok(Some(decode_data_url(data_url)?)),
        (EditMode::Add, None, Some(rect)) => Ok(Some(rasterize_rect_mask(rect)?)),
        (EditMode::Add, None, None) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_url(bytes: &[u8]) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    #[test]
    fn test_decode_data_url_round_trip() {
        let bytes = vec![1u8, 2, 3, 4];
        assert_eq!(decode_data_url(&data_url(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn test_decode_rejects_plain_strings() {
        let err = decode_data_url("not a data url").unwrap_err();
        assert!(matches!(err, WorkerError::Validation(_)));
    }

    #[test]
    fn test_remove_without_mask_is_validation_error() {
        let err = resolve_mask(EditMode::Remove, None, None).unwrap_err();
        assert!(matches!(err, WorkerError::Validation(msg) if msg.contains("remove mode")));
    }

    #[test]
    fn test_add_without_mask_or_rect_is_allowed() {
        assert!(resolve_mask(EditMode::Add, None, None).unwrap().is_none());
    }

    #[test]
    fn test_rect_mask_is_white_inside_black_outside() {
        let rect = PlacementRect {
            left: 2,
            top: 2,
            width: 4,
            height: 4,
            canvas_width: 10,
            canvas_height: 10,
        };
        let png = rasterize_rect_mask(&rect).unwrap();

        let decoded = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (10, 10));
        assert_eq!(decoded.get_pixel(3, 3), &Luma([255u8]));
        assert_eq!(decoded.get_pixel(0, 0), &Luma([0u8]));
        assert_eq!(decoded.get_pixel(9, 9), &Luma([0u8]));
    }

    #[test]
    fn test_invalid_rect_rejected() {
        let rect = PlacementRect {
            left: 8,
            top: 0,
            width: 5,
            height: 5,
            canvas_width: 10,
            canvas_height: 10,
        };
        assert!(rasterize_rect_mask(&rect).is_err());
    }
}
