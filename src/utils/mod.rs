pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;

pub use error::{ConverterError, ConverterResult};
pub use validation::{validate_settings, validate_input_path};
pub use formats::{OutputFormat, format_bytes, is_image_path};
pub use fs::{read_source, write_artifact};
