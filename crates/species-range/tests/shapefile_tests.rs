//! Shapefile reading: a shapefile is written with the `shapefile` crate,
//! zipped the way GAP distributes ranges, and read back.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use geo_types::Geometry;
use serde_json::json;
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};

use species_range::error::RangeError;
use species_range::pipeline::parse::read_range_file;

const ALBERS_WKT: &str = r#"PROJCS["USA_Contiguous_Albers_Equal_Area_Conic_USGS_version",GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Albers"],UNIT["Meter",1.0]]"#;

fn write_points(dir: &Path) {
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("Season").unwrap(), 20)
        .add_numeric_field(FieldName::try_from("Code").unwrap(), 10, 0);

    let mut writer = shapefile::Writer::from_path(dir.join("range.shp"), table).unwrap();
    for (x, y, season, code) in [(-100.0, 40.0, "Summer", 2.0), (-90.0, 35.0, "Winter", 3.0)] {
        let mut record = Record::default();
        record.insert("Season".to_string(), FieldValue::Character(Some(season.to_string())));
        record.insert("Code".to_string(), FieldValue::Numeric(Some(code)));
        writer
            .write_shape_and_record(&shapefile::Point::new(x, y), &record)
            .unwrap();
    }
    drop(writer);
}

fn zip_dir(dir: &Path, prefix: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);

    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    for name in names {
        writer.start_file(format!("{prefix}{name}"), options).unwrap();
        writer.write_all(&fs::read(dir.join(&name)).unwrap()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn test_reads_zipped_shapefile() {
    let source = tempfile::tempdir().unwrap();
    write_points(source.path());
    fs::write(source.path().join("range.prj"), ALBERS_WKT).unwrap();

    let work = tempfile::tempdir().unwrap();
    let archive = work.path().join("bRANGx_CONUS_Range_2001v1.zip");
    fs::write(&archive, zip_dir(source.path(), "bRANGx_CONUS_Range_2001v1/")).unwrap();

    let table = read_range_file(&archive, "bRANGx_CONUS_Range_2001v1.zip", work.path()).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.crs, ALBERS_WKT);
    assert_eq!(table.columns(), vec!["Code", "Season"]);

    let first = &table.features[0];
    assert_eq!(first.attribute("Season"), Some(&json!("Summer")));
    assert_eq!(first.attribute("Code"), Some(&json!(2.0)));
    match &first.geometry {
        Some(Geometry::Point(p)) => assert_eq!((p.x(), p.y()), (-100.0, 40.0)),
        other => panic!("expected point, got {other:?}"),
    }
}

#[test]
fn test_shapefile_without_prj_defaults_to_wgs84() {
    let dir = tempfile::tempdir().unwrap();
    write_points(dir.path());

    let table = read_range_file(&dir.path().join("range.shp"), "range.shp", dir.path()).unwrap();
    assert_eq!(table.crs, "EPSG:4326");
    assert_eq!(table.geometry_count(), 2);
}

#[test]
fn test_shapefile_missing_dbf_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    write_points(dir.path());
    fs::remove_file(dir.path().join("range.dbf")).unwrap();

    let err = read_range_file(&dir.path().join("range.shp"), "range.shp", dir.path()).unwrap_err();
    assert!(matches!(err, RangeError::Parse { .. }));
}
