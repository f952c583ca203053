//! 送信前の画像縮小・JPEG再エンコード
//!
//! メモリ使用量を抑えるため1枚ずつ順番に処理する。

use crate::error::{ReportError, Result};
use crate::gemini::InlineImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy)]
pub struct CompressOptions {
    /// 長辺の上限（px）
    pub max_dimension: u32,
    /// JPEG品質 (1-100)
    pub quality: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_dimension: 1600,
            quality: 70,
        }
    }
}

/// 縮小（拡大はしない）してJPEGに変換
pub fn compress_image(bytes: &[u8], options: CompressOptions) -> Result<InlineImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ReportError::ImageLoad(e.to_string()))?;

    let (width, height) = img.dimensions();
    let max = options.max_dimension.max(1);
    let img = if width > max || height > max {
        img.resize(max, max, FilterType::Triangle)
    } else {
        img
    };

    // JPEGはアルファ非対応
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut data = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut data, options.quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|e| ReportError::ImageLoad(e.to_string()))?;

    Ok(InlineImage {
        mime_type: "image/jpeg".to_string(),
        data,
    })
}

/// ファイルを順番に読み込み・圧縮する
///
/// 1枚でも失敗したら全体を失敗とする。`on_progress` は各画像の完了ごとに呼ばれる。
pub fn prepare_images(
    paths: &[PathBuf],
    options: CompressOptions,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<Vec<InlineImage>> {
    let mut prepared = Vec::with_capacity(paths.len());

    for (i, path) in paths.iter().enumerate() {
        let bytes = std::fs::read(path)
            .map_err(|e| ReportError::ImageLoad(format!("{}: {}", path.display(), e)))?;
        let image = compress_image(&bytes, options).map_err(|e| match e {
            ReportError::ImageLoad(reason) => {
                ReportError::ImageLoad(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })?;
        tracing::debug!(
            file = %path.display(),
            before = bytes.len(),
            after = image.data.len(),
            "image compressed"
        );
        prepared.push(image);
        on_progress(i + 1, paths.len());
    }

    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([30, 120, 60, 200]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_downscale_preserves_aspect() {
        let out = compress_image(&png(400, 200), CompressOptions { max_dimension: 100, quality: 70 }).unwrap();
        assert_eq!(out.mime_type, "image/jpeg");
        let decoded = image::load_from_memory(&out.data).unwrap();
        assert_eq!(decoded.dimensions(), (100, 50));
    }

    #[test]
    fn test_small_image_not_upscaled() {
        let out = compress_image(&png(40, 30), CompressOptions::default()).unwrap();
        let decoded = image::load_from_memory(&out.data).unwrap();
        assert_eq!(decoded.dimensions(), (40, 30));
    }

    #[test]
    fn test_invalid_bytes() {
        let result = compress_image(b"not an image", CompressOptions::default());
        assert!(matches!(result, Err(ReportError::ImageLoad(_))));
    }
}
