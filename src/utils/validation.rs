use std::path::Path;
use crate::core::ConversionConfig;
use crate::utils::{ConverterError, ConverterResult, is_image_path};

/// Validates conversion settings loaded from outside the session setters
pub fn validate_settings(settings: &ConversionConfig) -> ConverterResult<()> {
    if !(0.0..=1.0).contains(&settings.quality) {
        return Err(ConverterError::validation(format!(
            "Invalid quality value: {}. Must be between 0 and 1",
            settings.quality
        )));
    }

    if settings.explicit_width == Some(0) {
        return Err(ConverterError::validation("Width cannot be 0"));
    }

    if settings.explicit_height == Some(0) {
        return Err(ConverterError::validation("Height cannot be 0"));
    }

    if settings.max_dimension == Some(0) {
        return Err(ConverterError::validation("Max dimension cannot be 0"));
    }

    Ok(())
}

/// Validates an input file path before it is read
pub fn validate_input_path(path: impl AsRef<Path>) -> ConverterResult<()> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConverterError::validation(format!(
            "Input file does not exist: {}",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(ConverterError::validation(format!(
            "Input path is not a file: {}",
            path.display()
        )));
    }

    if !is_image_path(path) {
        return Err(ConverterError::validation(format!(
            "Not an image file: {}",
            path.display()
        )));
    }

    Ok(())
}
