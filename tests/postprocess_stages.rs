//! Post-processing stage tests over real image files
//!
//! Covers resolution scoring, direction semantics, conversion with the image
//! crate, and the observable behavior around conversion failures.

use imgharvest::{
    FailureLog, NoOpStatusReporter, OutputFormat, PostProcessConfig, PostProcessor, SortCriterion,
};
use std::path::Path;
use tempfile::TempDir;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    image::RgbImage::from_pixel(width, height, image::Rgb([120, 40, 200]))
        .save(dir.join(name))
        .unwrap();
}

fn dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn resolution_ascending_orders_by_pixel_area() {
    let dir = TempDir::new().unwrap();
    write_png(dir.path(), "big.png", 40, 40); // area 1600
    write_png(dir.path(), "mid.png", 20, 20); // area 400
    write_png(dir.path(), "tiny.png", 4, 4); // area 16

    let log = FailureLog::disabled();
    let processor = PostProcessor::new(&log, &NoOpStatusReporter);
    let config = PostProcessConfig {
        sort: "resolution,asc".parse::<SortCriterion>().unwrap(),
        ..PostProcessConfig::default()
    };
    processor.process("cat", dir.path(), &config).unwrap();

    // Ascending: smallest area first
    let (w, h) = image::image_dimensions(dir.path().join("cat1.png")).unwrap();
    assert_eq!((w, h), (4, 4));
    let (w, h) = image::image_dimensions(dir.path().join("cat3.png")).unwrap();
    assert_eq!((w, h), (40, 40));
}

#[test]
fn resolution_descending_reverses_the_sequence() {
    let dir = TempDir::new().unwrap();
    write_png(dir.path(), "big.png", 40, 40);
    write_png(dir.path(), "tiny.png", 4, 4);

    let log = FailureLog::disabled();
    let processor = PostProcessor::new(&log, &NoOpStatusReporter);
    let config = PostProcessConfig {
        sort: "resolution,desc".parse::<SortCriterion>().unwrap(),
        ..PostProcessConfig::default()
    };
    processor.process("cat", dir.path(), &config).unwrap();

    let (w, h) = image::image_dimensions(dir.path().join("cat1.png")).unwrap();
    assert_eq!((w, h), (40, 40));
}

#[test]
fn undecodable_file_scores_zero_and_sorts_first_ascending() {
    let dir = TempDir::new().unwrap();
    write_png(dir.path(), "real.png", 10, 10);
    std::fs::write(dir.path().join("broken.png"), b"not an image").unwrap();

    let log = FailureLog::disabled();
    let processor = PostProcessor::new(&log, &NoOpStatusReporter);
    let config = PostProcessConfig {
        sort: "resolution,asc".parse::<SortCriterion>().unwrap(),
        ..PostProcessConfig::default()
    };
    // The undecodable file does not abort the keyword
    processor.process("cat", dir.path(), &config).unwrap();

    let cat1 = std::fs::read(dir.path().join("cat1.png")).unwrap();
    assert_eq!(cat1, b"not an image");
}

#[test]
fn descending_is_a_reversal_not_a_negated_sort() {
    // Ranks [1, 2, 2]: ascending gives [1, 2a, 2b] by listing order; the
    // descending sequence is the exact reversal [2b, 2a, 1]. Sorting by a
    // negated key would instead give [2a, 2b, 1].
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a2.jpg"), b"first-two").unwrap();
    std::fs::write(dir.path().join("b2.jpg"), b"second-two").unwrap();
    std::fs::write(dir.path().join("c1.jpg"), b"one").unwrap();

    let log = FailureLog::disabled();
    let processor = PostProcessor::new(&log, &NoOpStatusReporter);
    let config = PostProcessConfig {
        sort: "rank,desc".parse::<SortCriterion>().unwrap(),
        ..PostProcessConfig::default()
    };
    processor.process("cat", dir.path(), &config).unwrap();

    assert_eq!(std::fs::read(dir.path().join("cat1.jpg")).unwrap(), b"second-two");
    assert_eq!(std::fs::read(dir.path().join("cat2.jpg")).unwrap(), b"first-two");
    assert_eq!(std::fs::read(dir.path().join("cat3.jpg")).unwrap(), b"one");
}

#[test]
fn jpeg_extension_normalizes_to_jpg() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("img1.jpeg"), b"bytes").unwrap();

    let log = FailureLog::disabled();
    let processor = PostProcessor::new(&log, &NoOpStatusReporter);
    processor
        .process("cat", dir.path(), &PostProcessConfig::default())
        .unwrap();

    assert_eq!(dir_names(dir.path()), vec!["cat1.jpg"]);
    // Bytes preserved exactly on a plain move
    assert_eq!(std::fs::read(dir.path().join("cat1.jpg")).unwrap(), b"bytes");
}

#[test]
fn conversion_reencodes_into_the_output_format() {
    let dir = TempDir::new().unwrap();
    write_png(dir.path(), "img1.png", 12, 9);

    let log = FailureLog::disabled();
    let processor = PostProcessor::new(&log, &NoOpStatusReporter);
    let config = PostProcessConfig {
        output_format: Some(OutputFormat::Jpeg),
        quality: 85,
        ..PostProcessConfig::default()
    };
    let report = processor.process("cat", dir.path(), &config).unwrap();

    assert_eq!(report.converted, 1);
    assert_eq!(report.renamed, 0);
    assert_eq!(dir_names(dir.path()), vec!["cat1.jpg"]);

    // The converted file is a decodable JPEG with the source dimensions
    let decoded = image::open(dir.path().join("cat1.jpg")).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (12, 9));
}

#[test]
fn matching_extension_skips_conversion() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("img1.jpg"), b"already jpeg").unwrap();
    // .jpeg normalizes to .jpg and therefore also matches the jpg target
    std::fs::write(dir.path().join("img2.jpeg"), b"also jpeg").unwrap();

    let log = FailureLog::disabled();
    let processor = PostProcessor::new(&log, &NoOpStatusReporter);
    let config = PostProcessConfig {
        output_format: Some(OutputFormat::Jpeg),
        ..PostProcessConfig::default()
    };
    let report = processor.process("cat", dir.path(), &config).unwrap();

    assert_eq!(report.renamed, 2);
    assert_eq!(report.converted, 0);
    // Bytes preserved exactly, no re-encode
    assert_eq!(std::fs::read(dir.path().join("cat1.jpg")).unwrap(), b"already jpeg");
    assert_eq!(std::fs::read(dir.path().join("cat2.jpg")).unwrap(), b"also jpeg");
}

#[test]
fn failed_conversion_leaves_the_source_untouched() {
    let dir = TempDir::new().unwrap();
    write_png(dir.path(), "img1.png", 6, 6);
    // Claims to be a PNG but cannot be decoded
    std::fs::write(dir.path().join("img2.png"), b"corrupt").unwrap();

    let log = FailureLog::disabled();
    let processor = PostProcessor::new(&log, &NoOpStatusReporter);
    let config = PostProcessConfig {
        output_format: Some(OutputFormat::Jpeg),
        ..PostProcessConfig::default()
    };
    let report = processor.process("cat", dir.path(), &config).unwrap();

    assert_eq!(report.converted, 1);
    assert_eq!(report.conversion_failures, 1);

    // The failed source keeps its old name, leaving a gap in the sequence
    let names = dir_names(dir.path());
    assert!(names.contains(&"cat1.jpg".to_string()));
    assert!(names.contains(&"img2.png".to_string()));
    assert!(!names.contains(&"cat2.jpg".to_string()));
    assert_eq!(std::fs::read(dir.path().join("img2.png")).unwrap(), b"corrupt");
}

#[test]
fn failure_log_collects_stage_warnings() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("error.log");
    let images = dir.path().join("cat");
    std::fs::create_dir(&images).unwrap();
    std::fs::write(images.join("img1.png"), b"corrupt").unwrap();

    let log = FailureLog::open(&log_path).unwrap();
    let processor = PostProcessor::new(&log, &NoOpStatusReporter);
    let config = PostProcessConfig {
        output_format: Some(OutputFormat::Jpeg),
        ..PostProcessConfig::default()
    };
    processor.process("cat", &images, &config).unwrap();

    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("Unable to convert image"));
}
