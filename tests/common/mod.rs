//! 統合テスト用のインメモリソース

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::cell::Cell;
use std::collections::HashMap;
use std::io::Cursor;
use store_report::drive::{ImageLookup, ImageSource};
use store_report::error::{ReportError, Result};
use store_report::sheets::{MetadataSource, SheetTable};

pub const HEADER: &[&str] = &["Store Name", "Date", "Item", "Photo", "Remarks", "Name"];

/// 固定のシート
pub struct FakeSheet {
    pub table: SheetTable,
}

impl FakeSheet {
    pub fn new(rows: &[&[&str]]) -> Self {
        Self::with_header(HEADER, rows)
    }

    pub fn with_header(header: &[&str], rows: &[&[&str]]) -> Self {
        let mut values: Vec<Vec<String>> = vec![header.iter().map(|s| s.to_string()).collect()];
        values.extend(rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()));
        Self {
            table: SheetTable::from_values(values),
        }
    }
}

impl MetadataSource for FakeSheet {
    async fn fetch_table(&self) -> Result<SheetTable> {
        Ok(self.table.clone())
    }
}

/// 名前 → バイト列の固定ドライブ
#[derive(Default)]
pub struct FakeDrive {
    pub files: HashMap<String, Vec<u8>>,
    pub requests: Cell<usize>,
}

impl FakeDrive {
    pub fn with(files: &[(&str, Vec<u8>)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(name, bytes)| (name.to_string(), bytes.clone()))
                .collect(),
            requests: Cell::new(0),
        }
    }
}

impl ImageSource for FakeDrive {
    async fn fetch_image(&self, image_name: &str) -> Result<ImageLookup> {
        self.requests.set(self.requests.get() + 1);
        Ok(match self.files.get(image_name) {
            Some(bytes) => ImageLookup::Found(bytes.clone()),
            None => ImageLookup::NotFound,
        })
    }
}

/// 常に接続エラーを返すソース
pub struct Unreachable;

impl MetadataSource for Unreachable {
    async fn fetch_table(&self) -> Result<SheetTable> {
        Err(ReportError::SourceUnavailable("connection refused".into()))
    }
}

impl ImageSource for Unreachable {
    async fn fetch_image(&self, _image_name: &str) -> Result<ImageLookup> {
        Err(ReportError::SourceUnavailable("connection refused".into()))
    }
}

pub fn png(w: u32, h: u32, color: [u8; 3]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(color)))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// ローカルHTTPスタブの応答（パスの前方一致）
#[derive(Debug, Clone)]
pub struct Route {
    pub prefix: &'static str,
    pub status: u16,
    pub body: Vec<u8>,
}

impl Route {
    pub fn new(prefix: &'static str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix,
            status,
            body: body.into(),
        }
    }
}

/// 127.0.0.1 の空きポートで応答を返し、ベースURLを返す
pub async fn serve(routes: Vec<Route>) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes
                    .iter()
                    .find(|r| path.starts_with(r.prefix))
                    .map(|r| (r.status, r.body.clone()))
                    .unwrap_or((404, Vec::new()));

                let head = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes()).await;
                let _ = stream.write_all(&body).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}
