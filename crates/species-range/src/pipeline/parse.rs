//! Readers that turn a downloaded range file into a [`RangeTable`].
//!
//! Supported inputs: zipped shapefiles or GeoJSON, and bare GeoJSON. These run
//! synchronously and are called from the blocking pool by the loader.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use geojson::{Feature, GeoJson};
use serde_json::{Number, Value};
use shapefile::dbase::FieldValue;
use walkdir::WalkDir;

use crate::config::defaults;
use crate::error::{RangeError, RangeResult};
use crate::models::{RangeFeature, RangeTable};

/// Range file formats this crate can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeFormat {
    /// ZIP archive containing a shapefile or GeoJSON document
    Zip,
    /// GeoJSON document
    GeoJson,
    /// ESRI shapefile (`.shp` with `.dbf` alongside)
    Shapefile,
}

impl RangeFormat {
    /// Get a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Zip => "ZIP",
            Self::GeoJson => "GeoJSON",
            Self::Shapefile => "shapefile",
        }
    }
}

impl std::fmt::Display for RangeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Detects the format from a file name.
#[must_use]
pub fn detect_format(file_name: &str) -> Option<RangeFormat> {
    let name = file_name.to_ascii_lowercase();

    if name.ends_with(".zip") {
        Some(RangeFormat::Zip)
    } else if name.ends_with(".geojson") || name.ends_with(".json") {
        Some(RangeFormat::GeoJson)
    } else if name.ends_with(".shp") {
        Some(RangeFormat::Shapefile)
    } else {
        None
    }
}

/// Read a downloaded range file.
///
/// `name` is the catalog file name (used for format detection and error
/// reports); `scratch` is a directory the reader may extract archives into.
pub fn read_range_file(path: &Path, name: &str, scratch: &Path) -> RangeResult<RangeTable> {
    let format = detect_format(name)
        .ok_or_else(|| RangeError::parse(name, "unrecognized range file format"))?;
    tracing::debug!(%format, file = name, "Reading range file");

    let table = match format {
        RangeFormat::Zip => read_zip(path, name, scratch)?,
        RangeFormat::GeoJson => read_geojson(path, name)?,
        RangeFormat::Shapefile => read_shapefile(path, name)?,
    };

    ensure_geometry(&table, name)?;
    Ok(table)
}

/// Parse GeoJSON text. A single Feature or bare Geometry becomes a one-row table.
pub fn parse_geojson(text: &str, name: &str) -> RangeResult<RangeTable> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| RangeError::parse(name, format!("invalid GeoJSON: {e}")))?;

    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature::from(geometry)],
    };

    let rows = features
        .into_iter()
        .map(|feature| feature_to_row(feature, name))
        .collect::<RangeResult<Vec<_>>>()?;

    Ok(RangeTable::new(rows, defaults::CRS))
}

fn feature_to_row(feature: Feature, name: &str) -> RangeResult<RangeFeature> {
    let geometry = feature
        .geometry
        .map(geo_types::Geometry::<f64>::try_from)
        .transpose()
        .map_err(|e| RangeError::parse(name, format!("unsupported geometry: {e}")))?;

    let attributes: BTreeMap<String, Value> =
        feature.properties.unwrap_or_default().into_iter().collect();

    Ok(RangeFeature { attributes, geometry })
}

fn read_geojson(path: &Path, name: &str) -> RangeResult<RangeTable> {
    let text = fs::read_to_string(path)
        .map_err(|e| RangeError::parse(name, format!("not a UTF-8 text file: {e}")))?;
    parse_geojson(&text, name)
}

fn read_zip(path: &Path, name: &str, scratch: &Path) -> RangeResult<RangeTable> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| RangeError::parse(name, format!("corrupt archive: {e}")))?;

    let extract_dir = scratch.join("extracted");
    fs::create_dir_all(&extract_dir)?;
    archive
        .extract(&extract_dir)
        .map_err(|e| RangeError::parse(name, format!("failed to extract archive: {e}")))?;

    let member = find_member(&extract_dir)
        .ok_or_else(|| RangeError::parse(name, "archive contains no shapefile or GeoJSON"))?;
    tracing::debug!(member = %member.display(), "Reading archive member");

    let member_name = member.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let label = format!("{name}/{member_name}");
    match detect_format(&member_name) {
        Some(RangeFormat::Shapefile) => read_shapefile(&member, &label),
        _ => read_geojson(&member, &label),
    }
}

/// First shapefile in sorted path order, else the first GeoJSON document.
fn find_member(dir: &Path) -> Option<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().strip_prefix(dir).is_ok_and(|rel| !is_hidden(rel)))
        .map(walkdir::DirEntry::into_path)
        .collect();
    paths.sort();

    let find = |wanted: RangeFormat| {
        paths.iter().find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .and_then(detect_format)
                .is_some_and(|f| f == wanted)
        })
    };

    find(RangeFormat::Shapefile).or_else(|| find(RangeFormat::GeoJson)).cloned()
}

/// Archive tooling leaves entries such as `__MACOSX/._range.shp` behind.
fn is_hidden(path: &Path) -> bool {
    path.components().any(|c| {
        let part = c.as_os_str().to_string_lossy();
        part.starts_with("._") || part == "__MACOSX"
    })
}

fn read_shapefile(path: &Path, name: &str) -> RangeResult<RangeTable> {
    let mut reader = shapefile::Reader::from_path(path)
        .map_err(|e| RangeError::parse(name, format!("invalid shapefile: {e}")))?;

    let mut rows = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) =
            result.map_err(|e| RangeError::parse(name, format!("invalid shapefile record: {e}")))?;

        let geometry = match shape {
            shapefile::Shape::NullShape => None,
            shape => Some(
                geo_types::Geometry::<f64>::try_from(shape)
                    .map_err(|e| RangeError::parse(name, format!("unsupported shape: {e}")))?,
            ),
        };

        let attributes = record
            .into_iter()
            .map(|(column, value)| (column, field_to_json(value)))
            .collect();

        rows.push(RangeFeature { attributes, geometry });
    }

    let crs = read_projection(path).unwrap_or_else(|| defaults::CRS.to_string());
    Ok(RangeTable::new(rows, crs))
}

/// WKT from the `.prj` sidecar, if there is one.
fn read_projection(shp: &Path) -> Option<String> {
    let prj = shp.with_extension("prj");
    let wkt = fs::read_to_string(prj).ok()?;
    let wkt = wkt.trim();
    (!wkt.is_empty()).then(|| wkt.to_string())
}

fn field_to_json(value: FieldValue) -> Value {
    let float = |f: f64| Number::from_f64(f).map_or(Value::Null, Value::Number);
    match value {
        FieldValue::Character(text) => text.map_or(Value::Null, Value::String),
        FieldValue::Memo(text) => Value::String(text),
        FieldValue::Numeric(n) => n.map_or(Value::Null, float),
        FieldValue::Float(n) => n.map_or(Value::Null, |f| float(f64::from(f))),
        FieldValue::Double(n) | FieldValue::Currency(n) => float(n),
        FieldValue::Integer(n) => Value::from(n),
        FieldValue::Logical(b) => b.map_or(Value::Null, Value::Bool),
        other => Value::String(format!("{other:?}")),
    }
}

fn ensure_geometry(table: &RangeTable, name: &str) -> RangeResult<()> {
    if table.is_empty() {
        return Err(RangeError::parse(name, "range file has no features"));
    }
    if table.geometry_count() == 0 {
        return Err(RangeError::parse(name, "range file has no geometry"));
    }
    Ok(())
}
