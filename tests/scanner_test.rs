//! フォルダスキャンと送信前圧縮のテスト

use camp_report::error::ReportError;
use camp_report::scanner::{self, CompressOptions};
use image::{GenericImageView, ImageFormat, RgbImage};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_png(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

#[test]
fn test_scan_sorted_and_filtered() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("c.jpg"), b"dummy").unwrap();
    std::fs::write(dir.path().join("a.PNG"), b"dummy").unwrap();
    std::fs::write(dir.path().join("b.webp"), b"dummy").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"text").unwrap();
    std::fs::create_dir(dir.path().join("sub.jpg")).unwrap();

    let images = scanner::scan_folder(dir.path()).unwrap();
    let names: Vec<_> = images.iter().map(|i| i.file_name.as_str()).collect();
    assert_eq!(names, vec!["a.PNG", "b.webp", "c.jpg"]);
}

#[test]
fn test_scan_does_not_recurse() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested").join("x.jpg"), b"dummy").unwrap();

    assert!(scanner::scan_folder(dir.path()).unwrap().is_empty());
}

/// 順番通りに処理し、進捗は1枚ごとに通知される
#[test]
fn test_prepare_images_sequential() {
    let dir = tempdir().unwrap();
    let large = dir.path().join("1.png");
    let small = dir.path().join("2.png");
    write_png(&large, 3200, 1600);
    write_png(&small, 300, 200);

    let mut progress = Vec::new();
    let prepared = scanner::prepare_images(
        &[large, small],
        CompressOptions::default(),
        |done, total| progress.push((done, total)),
    )
    .unwrap();

    assert_eq!(progress, vec![(1, 2), (2, 2)]);
    assert_eq!(prepared.len(), 2);
    assert!(prepared.iter().all(|p| p.mime_type == "image/jpeg"));

    let first = image::load_from_memory(&prepared[0].data).unwrap();
    assert_eq!(first.dimensions(), (1600, 800));
    let second = image::load_from_memory(&prepared[1].data).unwrap();
    assert_eq!(second.dimensions(), (300, 200));
}

/// 1枚でも壊れていれば全体を失敗とする
#[test]
fn test_prepare_images_aborts_on_bad_file() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("1.png");
    let bad = dir.path().join("2.jpg");
    write_png(&good, 64, 64);
    std::fs::write(&bad, b"not an image").unwrap();

    let mut calls = 0;
    let result = scanner::prepare_images(
        &[good, bad.clone()],
        CompressOptions::default(),
        |_, _| calls += 1,
    );

    match result {
        Err(ReportError::ImageLoad(message)) => assert!(message.contains("2.jpg")),
        other => panic!("expected ImageLoad, got {:?}", other.map(|v| v.len())),
    }
    assert_eq!(calls, 1);
}

#[test]
fn test_prepare_missing_file() {
    let result = scanner::prepare_images(
        &[PathBuf::from("/nonexistent/photo.jpg")],
        CompressOptions::default(),
        |_, _| {},
    );
    assert!(matches!(result, Err(ReportError::ImageLoad(_))));
}
