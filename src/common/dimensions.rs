use crate::common::variant::{config, VariantKind};
use crate::errors::DimensionError;

/// Exact output pixel size for one kind, derived from the original's size.
///
/// Aspect-preserving kinds always compute from the original ratio, never an
/// intermediate variant's. Square-crop kinds never upsample past the
/// original's smaller dimension.
pub fn dimensions_for(
    original_width: u32,
    original_height: u32,
    kind: VariantKind,
) -> Result<(u32, u32), DimensionError> {
    let config = config(kind);

    if config.width == 0 {
        return Ok((original_width, original_height));
    }

    match config.height {
        Some(height) if height == config.width => {
            let side = original_width.min(original_height).min(config.width);
            Ok((side, side))
        }
        Some(height) => Ok((config.width, height)),
        None => {
            if original_width == 0 {
                return Err(DimensionError::ZeroWidth);
            }
            let scaled =
                (config.width as f64 * original_height as f64 / original_width as f64).round();
            Ok((config.width, scaled as u32))
        }
    }
}
