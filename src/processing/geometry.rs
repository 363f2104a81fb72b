//! Target-size resolution from the source size and the resize settings.

use crate::core::{ConversionConfig, Dimensions};

/// Computes the output dimensions for a source of `natural_w`×`natural_h`.
///
/// Explicit dimensions replace the natural ones. With `keep_aspect_ratio` and
/// only one explicit dimension, the other follows the source's own ratio.
/// `max_dimension` then scales both sides down uniformly (never up). Each
/// side is at least 1.
pub fn resolve(natural_w: u32, natural_h: u32, config: &ConversionConfig) -> Dimensions {
    // Zero is treated as "not set", same as an empty form field
    let explicit_w = config.explicit_width.filter(|w| *w > 0);
    let explicit_h = config.explicit_height.filter(|h| *h > 0);

    let mut target_w = f64::from(explicit_w.unwrap_or(natural_w));
    let mut target_h = f64::from(explicit_h.unwrap_or(natural_h));

    if config.keep_aspect_ratio {
        match (explicit_w, explicit_h) {
            (Some(w), None) if natural_w > 0 => {
                target_h = (f64::from(w) / f64::from(natural_w) * f64::from(natural_h)).round();
            }
            (None, Some(h)) if natural_h > 0 => {
                target_w = (f64::from(h) / f64::from(natural_h) * f64::from(natural_w)).round();
            }
            _ => {}
        }
    }

    if let Some(max_dim) = config.max_dimension.filter(|m| *m > 0) {
        let longest = target_w.max(target_h);
        if longest > 0.0 {
            let scale = (f64::from(max_dim) / longest).min(1.0);
            target_w = (target_w * scale).round();
            target_h = (target_h * scale).round();
        }
    }

    Dimensions::new(clamp_side(target_w), clamp_side(target_h))
}

fn clamp_side(value: f64) -> u32 {
    // `as` saturates, so anything past u32::MAX stays representable
    (value as u32).max(1)
}
