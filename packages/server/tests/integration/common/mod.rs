#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::net::SocketAddr;
use std::time::Duration;

use ::common::Checksum;
use ::common::config::DataConfig;
use reqwest::Client;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use tempfile::TempDir;
use worker::RenderConfig;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use server::config::{AppConfig, ServerConfig};
use server::state::AppState;

pub mod routes {
    pub const SCENES: &str = "/api/v1/scenes";
    pub const RENDER: &str = "/api/v1/render";
    pub const RENDER_STATUS: &str = "/api/v1/render/status";
    pub const RENDER_RESULT: &str = "/api/v1/render/result";
    pub const NODE: &str = "/api/v1/node";
    pub const OPENAPI: &str = "/api-docs/openapi.json";
}

/// Stand-in render tool. Parses `-s/-e/-o`, prints Blender-style progress on
/// stdout with noise on stderr, and writes one file per frame. When
/// `GATE_FILE` is set it waits for that file before exiting with `EXIT_CODE`.
const FAKE_BLENDER: &str = r#"#!/bin/sh
out=""; start=""; end=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    -s) start="$2"; shift ;;
    -e) end="$2"; shift ;;
  esac
  shift
done
dir=$(dirname "$out")
f=$start
while [ "$f" -le "$end" ]; do
  echo "Fra:$f Mem:10.00M (Peak 12.00M) | Time:00:00.50 | Remaining:00:01.50 | Sample 1/16"
  echo "Warning: fake renderer" 1>&2
  echo "Fra:$f Mem:10.00M | Time:00:02.00 | Remaining:00:00.00 | Sample 16/16"
  printf 'frame %s' "$f" > "$dir/frame_$f.png"
  f=$((f + 1))
done
if [ -n "$GATE_FILE" ]; then
  while [ ! -f "$GATE_FILE" ]; do sleep 0.05; done
fi
exit ${EXIT_CODE:-0}
"#;

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            headers,
            text,
            body,
        }
    }
}

/// A running node on a random port with its data under a temp directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub data: DataConfig,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_env(&[]).await
    }

    /// Spawn with shell variables set for the fake render tool.
    pub async fn spawn_with_env(env: &[(&str, String)]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let data = DataConfig::rooted_at(dir.path().join("data"));
        data.ensure_directories()
            .await
            .expect("Failed to create data directories");

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 4000,
                name: "test-node".to_string(),
                max_upload_size: 1024 * 1024,
            },
            data: data.clone(),
            render: fake_render_tool(&dir, env),
        };

        let state = AppState::new(config)
            .await
            .expect("Failed to build app state");
        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            data,
            dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_form(&self, path: &str, form: Form) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart request");

        TestResponse::from_response(res).await
    }

    /// Upload `bytes` as `file_name`, declaring `checksum`.
    pub async fn upload_scene(&self, file_name: &str, bytes: Vec<u8>, checksum: &str) -> TestResponse {
        let form = Form::new()
            .text("metadata", json!({ "checksum": checksum }).to_string())
            .part("file", zip_part(file_name, bytes));
        self.post_form(routes::SCENES, form).await
    }

    /// Upload a valid single-scene archive and return its id.
    pub async fn upload_default_scene(&self) -> String {
        let archive = scene_archive();
        let checksum = checksum_hex(&archive);
        let res = self.upload_scene("shot.zip", archive, &checksum).await;
        assert_eq!(res.status, 201, "{}", res.text);
        res.body["id"].as_str().unwrap().to_string()
    }

    pub async fn start_render(&self, id: &str, start: u16, end: u16) -> TestResponse {
        self.post_json(
            routes::RENDER,
            &json!({ "id": id, "frame_start": start, "frame_end": end }),
        )
        .await
    }

    pub async fn fetch_result(&self, id: &str) -> reqwest::Response {
        self.client
            .post(self.url(routes::RENDER_RESULT))
            .json(&json!({ "id": id }))
            .send()
            .await
            .expect("Failed to send result request")
    }

    /// Poll the status endpoint until `check` accepts the body.
    pub async fn wait_for_status<F: Fn(&Value) -> bool>(&self, check: F) -> Value {
        for _ in 0..200 {
            let res = self.get(routes::RENDER_STATUS).await;
            if check(&res.body) {
                return res.body;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("status condition not reached in time");
    }

    pub async fn wait_until_idle(&self) {
        self.wait_for_status(|body| body["is_rendering"] == false)
            .await;
    }

    pub fn stored_scene_files(&self) -> usize {
        std::fs::read_dir(&self.data.scenes_directory)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub fn temp_files(&self) -> usize {
        std::fs::read_dir(&self.data.temp_directory)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

pub fn zip_part(file_name: &str, bytes: Vec<u8>) -> Part {
    Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str("application/zip")
        .expect("Failed to set MIME type")
}

pub fn checksum_hex(bytes: &[u8]) -> String {
    Checksum::compute(bytes).to_hex()
}

/// A zip holding one scene file plus a texture.
pub fn scene_archive() -> Vec<u8> {
    build_zip(&[
        ("shot/scene.blend", b"BLENDER-v400"),
        ("shot/textures/wood.png", b"PNG"),
    ])
}

pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("Failed to start zip entry");
        writer.write_all(contents).expect("Failed to write zip entry");
    }
    writer.finish().expect("Failed to finish zip").into_inner()
}

#[cfg(unix)]
fn fake_render_tool(dir: &TempDir, env: &[(&str, String)]) -> RenderConfig {
    use std::os::unix::fs::PermissionsExt;

    let exports: String = env.iter().map(|(k, v)| format!("{k}='{v}'\n")).collect();
    let script = FAKE_BLENDER.replacen("#!/bin/sh\n", &format!("#!/bin/sh\n{exports}"), 1);
    let path = dir.path().join("blender");
    std::fs::write(&path, script).expect("Failed to write fake render tool");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to mark fake render tool executable");
    RenderConfig::with_blender(path.to_string_lossy())
}

#[cfg(not(unix))]
fn fake_render_tool(_dir: &TempDir, _env: &[(&str, String)]) -> RenderConfig {
    RenderConfig::default()
}
