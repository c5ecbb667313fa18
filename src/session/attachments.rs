use crate::error::{ReporterError, Result};
use crate::imaging::image_bytes_to_data_url;
use futures::future::join_all;
use std::path::{Path, PathBuf};

/// 画像ファイルをまとめて読み込み、data URLに変換
///
/// 読み込み・デコードは並行に行うが、結果は選択順に並ぶ。
/// 1件でも失敗したらバッチ全体を失敗とし、失敗した入力を列挙して返す。
pub async fn load_image_batch(paths: &[PathBuf]) -> Result<Vec<String>> {
    let tasks = paths.iter().map(|path| async move {
        let result = load_one(path).await;
        (path, result)
    });

    let mut images = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();

    for (path, result) in join_all(tasks).await {
        match result {
            Ok(url) => images.push(url),
            Err(e) => {
                log::warn!("failed to load {}: {}", path.display(), e);
                failures.push(format!("{} ({})", path.display(), e));
            }
        }
    }

    if !failures.is_empty() {
        return Err(ReporterError::ImageDecode(failures));
    }
    Ok(images)
}

async fn load_one(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    tokio::task::spawn_blocking(move || image_bytes_to_data_url(&bytes))
        .await
        .map_err(|e| ReporterError::InvalidImage(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::decode_image;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([0, 128, 255]))
            .save(path)
            .expect("PNG書き込み失敗");
    }

    #[tokio::test]
    async fn test_batch_preserves_selection_order() {
        let dir = tempdir().expect("Failed to create temp dir");
        // 大きい画像を先に選択（デコード完了順に依存しないこと）
        let sizes = [(400, 300), (1, 1), (20, 10)];
        let mut paths = Vec::new();
        for (i, (w, h)) in sizes.iter().enumerate() {
            let path = dir.path().join(format!("photo_{}.png", i));
            write_png(&path, *w, *h);
            paths.push(path);
        }

        let images = load_image_batch(&paths).await.expect("読み込み失敗");
        assert_eq!(images.len(), 3);
        for (url, (w, h)) in images.iter().zip(sizes.iter()) {
            let decoded = decode_image(url).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (*w, *h));
        }
    }

    #[tokio::test]
    async fn test_batch_fails_as_a_whole() {
        let dir = tempdir().expect("Failed to create temp dir");
        let good = dir.path().join("good.png");
        let bad = dir.path().join("notes.txt");
        let missing = dir.path().join("missing.png");
        write_png(&good, 2, 2);
        std::fs::write(&bad, "not an image").unwrap();

        let err = load_image_batch(&[good, bad, missing]).await.unwrap_err();
        match err {
            ReporterError::ImageDecode(failures) => {
                assert_eq!(failures.len(), 2);
                assert!(failures[0].contains("notes.txt"));
                assert!(failures[1].contains("missing.png"));
            }
            other => panic!("想定外のエラー: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_batch() {
        assert!(load_image_batch(&[]).await.unwrap().is_empty());
    }
}
