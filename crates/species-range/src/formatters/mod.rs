//! Output formatters for GeoJSON, Markdown and JSON.

mod geojson;
mod json;
mod markdown;

pub use self::geojson::*;
pub use self::json::*;
pub use markdown::*;
