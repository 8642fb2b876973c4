//! End-to-end publication flow: composite -> publish -> gallery visibility.

use image::{DynamicImage, Rgba, RgbaImage};
use photostamp::gallery::list_artifacts;
use photostamp::publish::{PublishError, Publisher};
use photostamp::watermark::{composite, WatermarkStyle};
use tempfile::TempDir;

fn gallery_publisher(tmp: &TempDir) -> Publisher {
    Publisher::new(tmp.path().join("testapp watermark"), "testapp", 100)
}

#[test]
fn publish_roundtrip_is_listable_and_decodable() {
    let tmp = TempDir::new().unwrap();
    let publisher = gallery_publisher(&tmp);

    let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        100,
        100,
        Rgba([30, 60, 90, 255]),
    ));
    let style = WatermarkStyle {
        font_size: 16.0,
        ..WatermarkStyle::default()
    };
    let stamped = composite(&source, "@demo - 2024", &style).unwrap();

    let artifact = publisher.publish(&stamped).unwrap();

    // Exactly one artifact, named by the watermark convention
    let entries = list_artifacts(publisher.directory()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].display_name, artifact.display_name);
    assert!(entries[0].display_name.contains("-watermarked_"));
    assert!(entries[0].display_name.ends_with(".jpg"));

    // No pending reservation remains
    let pending_count = std::fs::read_dir(publisher.directory())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".pending"))
        .count();
    assert_eq!(pending_count, 0);

    // The artifact reads back as a valid JPEG with the source dimensions
    let decoded = image::open(&artifact.path).unwrap();
    assert_eq!(decoded.width(), 100);
    assert_eq!(decoded.height(), 100);
}

#[test]
fn failed_publish_leaves_no_trace() {
    let tmp = TempDir::new().unwrap();
    let publisher = gallery_publisher(&tmp);

    // JPEG rejects dimensions above 65535, forcing a failure after the
    // slot reservation succeeded
    let oversized = RgbaImage::new(70_000, 1);
    let err = publisher.publish(&oversized).unwrap_err();
    assert!(matches!(err, PublishError::Encode(_)));

    assert!(list_artifacts(publisher.directory()).unwrap().is_empty());
    let leftover = std::fs::read_dir(publisher.directory())
        .unwrap()
        .filter_map(|e| e.ok())
        .count();
    assert_eq!(leftover, 0);
}

#[test]
fn abandoned_pending_reservation_is_never_listed() {
    let tmp = TempDir::new().unwrap();
    let publisher = gallery_publisher(&tmp);

    // A publisher that died mid-write leaves a pending file behind; the
    // gallery must not surface it as a finished artifact
    std::fs::create_dir_all(publisher.directory()).unwrap();
    std::fs::write(
        publisher
            .directory()
            .join("testapp-watermarked_1700000000000.jpg.pending"),
        b"truncated jpeg bytes",
    )
    .unwrap();

    assert!(list_artifacts(publisher.directory()).unwrap().is_empty());
}

#[test]
fn concurrent_style_rapid_publishes_stay_unique() {
    let tmp = TempDir::new().unwrap();
    let publisher = gallery_publisher(&tmp);

    let image = RgbaImage::from_pixel(32, 32, Rgba([200, 200, 200, 255]));
    for _ in 0..8 {
        publisher.publish(&image).unwrap();
    }

    let entries = list_artifacts(publisher.directory()).unwrap();
    assert_eq!(entries.len(), 8);
}
