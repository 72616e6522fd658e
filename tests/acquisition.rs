//! End-to-end acquisition scenarios against a mock HTTP server.
//!
//! Each test builds an engine over a temp output directory, points it at a
//! wiremock server, runs one pass, and inspects what landed on disk.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use webcam_scraper::normalize::{self, ImageKind};
use webcam_scraper::scraper::{CollectionMode, PageKind, Scraper, ScraperConfig, SourcePoint};
use webcam_scraper::wsdot::WsdotCameras;

fn encoded(w: u32, h: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([200, 100, 50])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn engine(sources: Vec<SourcePoint>, output_dir: &Path, cameras: Option<WsdotCameras>) -> Scraper {
    Scraper::new(
        ScraperConfig {
            user_agent: "webcam-scraper-tests".to_string(),
            sources,
            output_dir: output_dir.to_path_buf(),
        },
        cameras,
    )
}

async fn mount_get(server: &MockServer, at: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn direct_jpeg_source_is_materialized_as_png() {
    let server = MockServer::start().await;
    let jpeg = encoded(8, 6, ImageFormat::Jpeg);
    mount_get(&server, "/a.jpg", ResponseTemplate::new(200).set_body_bytes(jpeg)).await;

    let out = TempDir::new().unwrap();
    let point = SourcePoint::new(
        format!("{}/a.jpg", server.uri()),
        PageKind::Direct,
        CollectionMode::Direct,
        "cam1",
    )
    .unwrap();

    engine(vec![point], out.path(), None).run_pass().await;

    let dest = out.path().join("direct/direct/cam1.png");
    let bytes = std::fs::read(&dest).unwrap();
    assert_eq!(normalize::detect(&bytes), ImageKind::Png);
    assert_eq!(image::load_from_memory(&bytes).unwrap().dimensions(), (8, 6));
}

#[tokio::test]
async fn png_source_is_stored_byte_identical() {
    let server = MockServer::start().await;
    let png = encoded(5, 5, ImageFormat::Png);
    mount_get(
        &server,
        "/cam.png",
        ResponseTemplate::new(200).set_body_bytes(png.clone()),
    )
    .await;

    let out = TempDir::new().unwrap();
    let point = SourcePoint::new(
        format!("{}/cam.png", server.uri()),
        PageKind::Direct,
        CollectionMode::Direct,
        "cam",
    )
    .unwrap();

    engine(vec![point], out.path(), None).run_pass().await;

    let stored = std::fs::read(out.path().join("direct/direct/cam.png")).unwrap();
    assert_eq!(stored, png);
}

#[tokio::test]
async fn api_source_without_key_is_skipped_and_pass_continues() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/b.jpg",
        ResponseTemplate::new(200).set_body_bytes(encoded(4, 4, ImageFormat::Jpeg)),
    )
    .await;

    let out = TempDir::new().unwrap();
    let api_point = SourcePoint::new("42", PageKind::Wsdot, CollectionMode::Api, "cam2").unwrap();
    let direct_point = SourcePoint::new(
        format!("{}/b.jpg", server.uri()),
        PageKind::Direct,
        CollectionMode::Direct,
        "cam3",
    )
    .unwrap();

    engine(vec![api_point, direct_point], out.path(), None)
        .run_pass()
        .await;

    assert!(!out.path().join("wsdot").exists());
    assert!(out.path().join("direct/direct/cam3.png").exists());
}

#[tokio::test]
async fn page_without_matching_image_writes_nothing() {
    let server = MockServer::start().await;
    let html = r#"<html><body><img src="https://static.example.com/banner.png"></body></html>"#;
    mount_get(
        &server,
        "/webcams",
        ResponseTemplate::new(200).set_body_string(html),
    )
    .await;
    mount_get(
        &server,
        "/next.jpg",
        ResponseTemplate::new(200).set_body_bytes(encoded(2, 2, ImageFormat::Jpeg)),
    )
    .await;

    let out = TempDir::new().unwrap();
    let scrape_point = SourcePoint::new(
        format!("{}/webcams", server.uri()),
        PageKind::WeatherBug,
        CollectionMode::Scrape,
        "cam4",
    )
    .unwrap();
    let next_point = SourcePoint::new(
        format!("{}/next.jpg", server.uri()),
        PageKind::Direct,
        CollectionMode::Direct,
        "cam5",
    )
    .unwrap();

    engine(vec![scrape_point, next_point], out.path(), None)
        .run_pass()
        .await;

    assert!(!out.path().join("weatherbug").exists());
    assert!(out.path().join("direct/direct/cam5.png").exists());
}

#[tokio::test]
async fn weatherbug_page_scrape_end_to_end() {
    let server = MockServer::start().await;
    let image_path = "/cameras-cam.cdn.weatherbug.net/WA/winthrop.jpg";
    let html = format!(
        r#"<html><body>
            <img src="https://static.example.com/logo.svg">
            <img src="{}{image_path}">
        </body></html>"#,
        server.uri()
    );
    mount_get(
        &server,
        "/weather-camera",
        ResponseTemplate::new(200).set_body_string(html),
    )
    .await;
    mount_get(
        &server,
        image_path,
        ResponseTemplate::new(200).set_body_bytes(encoded(10, 2, ImageFormat::Jpeg)),
    )
    .await;

    let out = TempDir::new().unwrap();
    let point = SourcePoint::new(
        format!("{}/weather-camera", server.uri()),
        PageKind::WeatherBug,
        CollectionMode::Scrape,
        "winthrop",
    )
    .unwrap();

    engine(vec![point], out.path(), None).run_pass().await;

    let bytes = std::fs::read(out.path().join("weatherbug/scrape/winthrop.png")).unwrap();
    assert_eq!(normalize::detect(&bytes), ImageKind::Png);
    assert_eq!(
        image::load_from_memory(&bytes).unwrap().dimensions(),
        (10, 2)
    );
}

#[tokio::test]
async fn wsdot_api_lookup_end_to_end() {
    let server = MockServer::start().await;
    let body = format!(
        r#"{{"CameraID": 9818, "Title": "Washington Pass", "ImageURL": "{}/wsdot/9818.jpg"}}"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/GetCameraAsJson"))
        .and(query_param("AccessCode", "test-key"))
        .and(query_param("CameraID", "9818"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/wsdot/9818.jpg",
        ResponseTemplate::new(200).set_body_bytes(encoded(3, 7, ImageFormat::Jpeg)),
    )
    .await;

    let cameras = WsdotCameras::with_base_url("test-key", "webcam-scraper-tests", server.uri());
    let out = TempDir::new().unwrap();
    let point =
        SourcePoint::new("9818", PageKind::Wsdot, CollectionMode::Api, "washingtonpass").unwrap();

    engine(vec![point], out.path(), Some(cameras)).run_pass().await;

    let bytes = std::fs::read(out.path().join("wsdot/api/washingtonpass.png")).unwrap();
    assert_eq!(image::load_from_memory(&bytes).unwrap().dimensions(), (3, 7));
}

#[tokio::test]
async fn unsupported_format_writes_nothing_and_pass_continues() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/anim.gif",
        ResponseTemplate::new(200).set_body_bytes(b"GIF89a definitely a gif".to_vec()),
    )
    .await;
    mount_get(
        &server,
        "/ok.jpg",
        ResponseTemplate::new(200).set_body_bytes(encoded(2, 3, ImageFormat::Jpeg)),
    )
    .await;

    let out = TempDir::new().unwrap();
    let gif_point = SourcePoint::new(
        format!("{}/anim.gif", server.uri()),
        PageKind::Direct,
        CollectionMode::Direct,
        "gifcam",
    )
    .unwrap();
    let ok_point = SourcePoint::new(
        format!("{}/ok.jpg", server.uri()),
        PageKind::Direct,
        CollectionMode::Direct,
        "okcam",
    )
    .unwrap();

    engine(vec![gif_point, ok_point], out.path(), None)
        .run_pass()
        .await;

    assert!(!out.path().join("direct/direct/gifcam.png").exists());
    assert!(out.path().join("direct/direct/okcam.png").exists());
}

#[tokio::test]
async fn error_status_fails_the_source_only() {
    let server = MockServer::start().await;
    mount_get(&server, "/gone.jpg", ResponseTemplate::new(404)).await;
    mount_get(
        &server,
        "/alive.jpg",
        ResponseTemplate::new(200).set_body_bytes(encoded(2, 2, ImageFormat::Jpeg)),
    )
    .await;

    let out = TempDir::new().unwrap();
    let gone = SourcePoint::new(
        format!("{}/gone.jpg", server.uri()),
        PageKind::Direct,
        CollectionMode::Direct,
        "gone",
    )
    .unwrap();
    let alive = SourcePoint::new(
        format!("{}/alive.jpg", server.uri()),
        PageKind::Direct,
        CollectionMode::Direct,
        "alive",
    )
    .unwrap();

    engine(vec![gone, alive], out.path(), None).run_pass().await;

    assert!(!out.path().join("direct/direct/gone.png").exists());
    assert!(out.path().join("direct/direct/alive.png").exists());
}

#[tokio::test]
async fn duplicate_destination_last_write_wins() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/first.jpg",
        ResponseTemplate::new(200).set_body_bytes(encoded(2, 2, ImageFormat::Jpeg)),
    )
    .await;
    mount_get(
        &server,
        "/second.jpg",
        ResponseTemplate::new(200).set_body_bytes(encoded(6, 2, ImageFormat::Jpeg)),
    )
    .await;

    let out = TempDir::new().unwrap();
    // Same filename/page/mode: a configuration mistake, not a crash.
    let first = SourcePoint::new(
        format!("{}/first.jpg", server.uri()),
        PageKind::Direct,
        CollectionMode::Direct,
        "cam",
    )
    .unwrap();
    let second = SourcePoint::new(
        format!("{}/second.jpg", server.uri()),
        PageKind::Direct,
        CollectionMode::Direct,
        "cam",
    )
    .unwrap();

    engine(vec![first, second], out.path(), None).run_pass().await;

    let bytes = std::fs::read(out.path().join("direct/direct/cam.png")).unwrap();
    assert_eq!(image::load_from_memory(&bytes).unwrap().dimensions(), (6, 2));
}

#[tokio::test]
async fn overlapping_passes_do_not_run_concurrently() {
    let server = MockServer::start().await;
    // A slow page keeps the first pass busy while the second one fires.
    mount_get(
        &server,
        "/slow.jpg",
        ResponseTemplate::new(200)
            .set_body_bytes(encoded(2, 2, ImageFormat::Jpeg))
            .set_delay(std::time::Duration::from_millis(300)),
    )
    .await;

    let out = TempDir::new().unwrap();
    let point = SourcePoint::new(
        format!("{}/slow.jpg", server.uri()),
        PageKind::Direct,
        CollectionMode::Direct,
        "slow",
    )
    .unwrap();

    let scraper = Arc::new(engine(vec![point], out.path(), None));
    let first = tokio::spawn({
        let scraper = Arc::clone(&scraper);
        async move { scraper.run_pass().await }
    });

    // Give the first pass time to take the guard, then try to overlap.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    scraper.run_pass().await; // returns immediately, skipped

    assert!(!out.path().join("direct/direct/slow.png").exists());
    first.await.unwrap();
    assert!(out.path().join("direct/direct/slow.png").exists());
}

#[tokio::test]
async fn invalid_camera_id_fails_without_calling_the_api() {
    let server = MockServer::start().await;
    // No mocks mounted: any request would 404 and the test would still pass,
    // but the point is that parsing fails before a request is made.
    let cameras = WsdotCameras::with_base_url("test-key", "webcam-scraper-tests", server.uri());

    let out = TempDir::new().unwrap();
    let point = SourcePoint::new(
        "not-a-number",
        PageKind::Wsdot,
        CollectionMode::Api,
        "badid",
    )
    .unwrap();

    engine(vec![point], out.path(), Some(cameras)).run_pass().await;

    assert!(!out.path().join("wsdot").exists());
    assert!(server.received_requests().await.unwrap().is_empty());
}
