// Export to disk

use super::test_harness::{builtin_compositor, gradient};
use rstest::rstest;
use std::path::Path;
use tempfile::TempDir;
use watermarker::export::{
    export, ExportError, ExportOptions, FileSink, FormatHint, ImageSink, OutputFormat,
};
use watermarker::watermark::{WatermarkError, WatermarkSpec};

#[rstest]
#[case("out.png", OutputFormat::Png)]
#[case("out.jpg", OutputFormat::Jpeg)]
#[case("out.webp", OutputFormat::WebP)]
#[case("out.bmp", OutputFormat::Bmp)]
#[case("out.gif", OutputFormat::Gif)]
#[case("out.tiff", OutputFormat::Tiff)]
fn test_export_each_format(#[case] name: &str, #[case] format: OutputFormat) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);

    let report = export(
        &builtin_compositor(),
        &gradient(160, 120),
        &WatermarkSpec::with_text("SAMPLE"),
        &path,
        &ExportOptions::default(),
        &FileSink,
    )
    .unwrap();

    assert_eq!(report.format, format);
    assert_eq!(report.dimensions, (160, 120));

    let decoded = image::open(&path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (160, 120));
}

#[test]
fn test_lossless_export_matches_render() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exact.png");
    let compositor = builtin_compositor();
    let base = gradient(120, 90);
    let spec = WatermarkSpec::with_text("PNG");

    export(
        &compositor,
        &base,
        &spec,
        &path,
        &ExportOptions {
            format: FormatHint::SameAsPath,
            quality: 50,
            resize: None,
        },
        &FileSink,
    )
    .unwrap();

    let decoded = image::open(&path).unwrap();
    assert_eq!(decoded.to_rgb8(), compositor.render(&base, &spec).to_rgb8());
}

struct FailingSink;

impl ImageSink for FailingSink {
    fn write(&self, path: &Path, _bytes: &[u8]) -> Result<(), ExportError> {
        Err(ExportError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        ))
    }
}

// Test: a failing save surfaces once as an export failure
#[test]
fn test_sink_failure_is_reported() {
    let err = export(
        &builtin_compositor(),
        &gradient(32, 32),
        &WatermarkSpec::with_text("X"),
        Path::new("out.png"),
        &ExportOptions::default(),
        &FailingSink,
    )
    .unwrap_err();

    assert!(err.to_string().contains("disk full"));
    assert!(matches!(
        err.to_watermark_error(),
        WatermarkError::ExportIOFailure(_)
    ));
}

#[test]
fn test_failed_export_keeps_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keep.png");
    std::fs::write(&path, b"previous").unwrap();

    let result = export(
        &builtin_compositor(),
        &gradient(32, 32),
        &WatermarkSpec::with_text("X"),
        &path,
        &ExportOptions {
            resize: Some((0, 0)),
            ..ExportOptions::default()
        },
        &FileSink,
    );

    assert!(result.is_err());
    assert_eq!(std::fs::read(&path).unwrap(), b"previous");
}
