// Working set, templates and config wired together

use super::test_harness::gradient;
use tempfile::TempDir;
use watermarker::adjust::Filter;
use watermarker::export::{FileSink, FormatHint, OutputFormat};
use watermarker::watermark::{Anchor, Color};
use watermarker::AppConfig;

#[test]
fn test_import_adjust_export_flow() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("photo.png");
    gradient(300, 200).save(&input).unwrap();

    let yaml = format!(
        r##"
fonts:
  directories: ["{fonts}"]
watermark:
  margin: 12
  defaults:
    text: "Hello"
    color: "#FFCC00"
export:
  default_format: jpeg
  default_quality: 85
templates:
  path: "{templates}"
"##,
        fonts = dir.path().join("no-fonts").display(),
        templates = dir.path().join("templates.json").display()
    );
    let config = AppConfig::from_yaml_with_env(&yaml).unwrap();
    config.validate().unwrap();

    let mut workspace = config.workspace();
    let report = workspace.add_paths([&input]);
    assert_eq!(report.added.len(), 1);
    assert!(report.failed.is_empty());

    workspace.set_contrast(1.5).unwrap();
    workspace.apply_filter(Filter::Sharpen).unwrap();

    let info = workspace.info().unwrap();
    assert_eq!((info.width, info.height), (300, 200));
    assert_eq!((info.position, info.total), (1, 1));

    let entry = workspace.current_mut().unwrap();
    assert_eq!(entry.spec.text, "Hello");
    assert_eq!(entry.spec.color, Color::new(0xFF, 0xCC, 0x00));
    entry.spec.anchor = Anchor::TopLeft;

    let output = dir.path().join("photo_wm.jpg");
    let options = config.export_options();
    assert_eq!(options.format, FormatHint::Explicit(OutputFormat::Jpeg));

    let exported = workspace
        .export_current(&output, &options, &FileSink)
        .unwrap();
    assert_eq!(exported.format, OutputFormat::Jpeg);
    assert_eq!(
        image::guess_format(&std::fs::read(&output).unwrap()).unwrap(),
        image::ImageFormat::Jpeg
    );

    // Save the watermark settings as a template and read it back through a fresh store
    let spec = workspace.current().unwrap().spec.clone();
    config.template_store().put("top-left hello", spec.clone()).unwrap();
    let loaded = config.template_store().load_all();
    assert_eq!(loaded.get("top-left hello"), Some(&spec));
}

#[test]
fn test_corrupt_template_store_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("templates.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let yaml = format!("templates:\n  path: \"{}\"\n", path.display());
    let config = AppConfig::from_yaml_with_env(&yaml).unwrap();

    assert!(config.template_store().load_all().is_empty());
}

#[test]
fn test_preview_of_current_image() {
    let config = AppConfig::default();
    let mut workspace = config.workspace();
    workspace.add_image("big", gradient(1200, 900));

    let preview = workspace.preview(0, 0).unwrap();
    // Default box 600x400: scale = min(0.5, 0.444) = 0.444
    assert_eq!(preview.transform.display_size(), (533, 400));
    assert_eq!(
        (preview.image.width(), preview.image.height()),
        preview.transform.display_size()
    );
}
