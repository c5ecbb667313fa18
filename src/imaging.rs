//! 埋め込み画像（data URL）の変換
//!
//! 添付画像と署名はレポート内に `data:<mime>;base64,<payload>` として保持する。

use crate::error::{ReporterError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{DynamicImage, ImageFormat};
use lazy_static::lazy_static;
use regex::Regex;
use std::io::Cursor;

/// バイト列をdata URLに変換
pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

lazy_static! {
    static ref DATA_URL: Regex = Regex::new(r"^data:([^;,]*)(;base64)?,").unwrap();
}

/// data URLを (MIME, バイト列) に分解
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let caps = DATA_URL
        .captures(url)
        .ok_or_else(|| ReporterError::InvalidImage("not a data URL".into()))?;
    if caps.get(2).is_none() {
        return Err(ReporterError::InvalidImage("data URL is not base64 encoded".into()));
    }

    let payload = &url[caps[0].len()..];
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| ReporterError::InvalidImage(format!("base64: {}", e)))?;
    Ok((caps[1].to_string(), bytes))
}

/// 画像ファイルの中身を検証してdata URLにする
///
/// 形式を判別できない、またはデコードできないデータはエラー。
pub fn image_bytes_to_data_url(bytes: &[u8]) -> Result<String> {
    let format = image::guess_format(bytes)
        .map_err(|e| ReporterError::InvalidImage(e.to_string()))?;
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ReporterError::InvalidImage(e.to_string()))?;
    Ok(encode_data_url(bytes, format.to_mime_type()))
}

/// data URLから画像をデコード
pub fn decode_image(url: &str) -> Result<DynamicImage> {
    let (_, bytes) = decode_data_url(url)?;
    image::load_from_memory(&bytes).map_err(|e| ReporterError::InvalidImage(e.to_string()))
}

/// 画像をPNGのdata URLに変換
pub fn png_data_url(image: &DynamicImage) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| ReporterError::InvalidImage(e.to_string()))?;
    Ok(encode_data_url(buffer.get_ref(), "image/png"))
}
