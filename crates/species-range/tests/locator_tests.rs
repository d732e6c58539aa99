//! Range file selection tests against a mock item endpoint.

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use species_range::client::SpeciesRangeClient;
use species_range::config::Config;
use species_range::error::{ClientError, RangeError};
use species_range::models::ItemId;
use species_range::pipeline::{GapRangeSource, RangeFileFilter};

fn source_for(server: &MockServer) -> GapRangeSource {
    let client = SpeciesRangeClient::new(Config::for_testing(&server.uri())).unwrap();
    GapRangeSource::new(Arc::new(client))
}

async fn mount_item(server: &MockServer, id: &str, files: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/catalog/item/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "title": "Bobcat (Lynx rufus) mBOBCx_CONUS_2001v1 Range Map",
            "files": files
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_locates_zip_among_metadata_files() {
    let server = MockServer::start().await;
    mount_item(
        &server,
        "bobcat",
        json!([
            {"name": "mBOBCx_CONUS_Range_2001v1.xml", "url": "https://example.org/xml"},
            {
                "name": "mBOBCx_CONUS_Range_2001v1.zip",
                "url": "https://example.org/zip",
                "size": 4096,
                "contentType": "application/zip"
            }
        ]),
    )
    .await;

    let file = source_for(&server).locate_range_file(&ItemId::from("bobcat")).await.unwrap();
    assert_eq!(file.name, "mBOBCx_CONUS_Range_2001v1.zip");
    assert_eq!(file.url, "https://example.org/zip");
    assert_eq!(file.size, Some(4096));
    assert_eq!(file.content_type.as_deref(), Some("application/zip"));
}

#[tokio::test]
async fn test_download_uri_is_used_when_url_missing() {
    let server = MockServer::start().await;
    mount_item(
        &server,
        "bobcat",
        json!([{"name": "range.geojson", "downloadUri": "https://example.org/dl"}]),
    )
    .await;

    let file = source_for(&server).locate_range_file(&ItemId::from("bobcat")).await.unwrap();
    assert_eq!(file.url, "https://example.org/dl");
}

#[tokio::test]
async fn test_selection_is_stable_across_calls() {
    let server = MockServer::start().await;
    mount_item(
        &server,
        "bobcat",
        json!([
            {"name": "a.zip", "url": "https://example.org/a"},
            {"name": "b.zip", "url": "https://example.org/b"}
        ]),
    )
    .await;

    let source = source_for(&server);
    let first = source.locate_range_file(&ItemId::from("bobcat")).await.unwrap();
    let second = source.locate_range_file(&ItemId::from("bobcat")).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.name, "a.zip");
}

#[tokio::test]
async fn test_no_matching_file() {
    let server = MockServer::start().await;
    mount_item(
        &server,
        "bobcat",
        json!([
            {"name": "readme.txt", "url": "https://example.org/txt"},
            {"name": "range.zip"}
        ]),
    )
    .await;

    let err = source_for(&server).locate_range_file(&ItemId::from("bobcat")).await.unwrap_err();
    assert!(matches!(err, RangeError::NoRangeFile { ref item_id } if item_id == "bobcat"));
}

#[tokio::test]
async fn test_empty_file_listing() {
    let server = MockServer::start().await;
    mount_item(&server, "bobcat", json!([])).await;

    let err = source_for(&server).locate_range_file(&ItemId::from("bobcat")).await.unwrap_err();
    assert!(matches!(err, RangeError::NoRangeFile { .. }));
}

#[tokio::test]
async fn test_custom_filter_and_predicate() {
    let server = MockServer::start().await;
    mount_item(
        &server,
        "bobcat",
        json!([
            {"name": "range.geojson", "url": "https://example.org/g"},
            {"name": "range_shp.zip", "url": "https://example.org/z"}
        ]),
    )
    .await;

    let source = source_for(&server).with_file_filter(RangeFileFilter::new(["zip"]));
    let file = source.locate_range_file(&ItemId::from("bobcat")).await.unwrap();
    assert_eq!(file.name, "range_shp.zip");

    let file = source
        .locate_range_file_with(&ItemId::from("bobcat"), |f| f.name.starts_with("range."))
        .await
        .unwrap();
    assert_eq!(file.name, "range.geojson");
}

#[tokio::test]
async fn test_missing_item_is_upstream_not_found() {
    let server = MockServer::start().await;

    let err = source_for(&server).locate_range_file(&ItemId::from("gone")).await.unwrap_err();
    assert!(matches!(err, RangeError::Upstream(ClientError::NotFound { .. })));
}
