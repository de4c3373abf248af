//! Shared utilities for integration tests.

use std::io::Write;
use std::net::SocketAddr;

use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Write `contents` to a temp file ending in `.{ext}`.
#[allow(dead_code)]
pub fn write_document(contents: &str, ext: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("toolchain")
        .suffix(&format!(".{ext}"))
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Canonical single-network JSON document with the given port literal.
#[allow(dead_code)]
pub fn json_with_port(port: &str) -> String {
    format!(
        r#"{{
            "networks": {{"dev": {{"host": "127.0.0.1", "port": {port}, "networkId": "5777"}}}},
            "testRunnerOptions": {{}},
            "compiler": {{"version": "0.8.21"}}
        }}"#
    )
}

/// Start a minimal JSON-RPC node answering `eth_chainId` and `eth_blockNumber`.
///
/// Each connection serves one request and is then closed.
#[allow(dead_code)]
pub async fn start_mock_node(chain_id: u64, block_number: u64) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Some(body) = read_request_body(&mut socket).await else {
                    return;
                };
                let request: serde_json::Value = match serde_json::from_slice(&body) {
                    Ok(v) => v,
                    Err(_) => return,
                };

                let result = match request["method"].as_str() {
                    Some("eth_chainId") => serde_json::json!(format!("{chain_id:#x}")),
                    Some("eth_blockNumber") => serde_json::json!(format!("{block_number:#x}")),
                    _ => serde_json::Value::Null,
                };
                let payload = serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": request["id"].clone(),
                    "result": result,
                })
                .to_string();

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    payload.len(),
                    payload
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

async fn read_request_body(socket: &mut tokio::net::TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length: usize = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(buf[header_end..header_end + content_length].to_vec())
}
