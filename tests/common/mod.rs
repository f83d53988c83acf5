#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

pub const SONG_BYTES: &[u8] = b"ID3\x04fake-mp3-frames";

/// One received multipart field: its name plus the file name for file
/// parts or the text value otherwise.
pub type Field = (String, String);

/// Stand-in for the conversion service. Every convert call gets the same
/// canned reply; `/api/download/song.mp3` is the only file it serves.
#[derive(Clone)]
pub struct FakeBackend {
    reply: Arc<(StatusCode, String)>,
    requests: Arc<Mutex<Vec<Vec<Field>>>>,
    downloads: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn replying(status: StatusCode, body: serde_json::Value) -> Self {
        Self {
            reply: Arc::new((status, body.to_string())),
            requests: Arc::default(),
            downloads: Arc::default(),
        }
    }

    pub fn song() -> Self {
        Self::replying(
            StatusCode::OK,
            serde_json::json!({
                "name": "song.mp3",
                "size": "3.1 MB",
                "bitrate": "192kbps",
                "downloadUrl": "/api/download/song.mp3",
            }),
        )
    }

    pub fn requests(&self) -> Vec<Vec<Field>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/convert", post(convert))
            .route("/api/download/{filename}", get(download))
            .with_state(self.clone())
    }
}

async fn convert(State(fake): State<FakeBackend>, mut multipart: Multipart) -> Response {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let value = match field.file_name().map(str::to_string) {
            Some(file_name) => file_name,
            None => field.text().await.unwrap(),
        };
        fields.push((name, value));
    }
    fake.requests.lock().unwrap().push(fields);

    let (status, body) = fake.reply.as_ref();
    (*status, [(header::CONTENT_TYPE, "application/json")], body.clone()).into_response()
}

async fn download(State(fake): State<FakeBackend>, Path(filename): Path<String>) -> Response {
    fake.downloads.fetch_add(1, Ordering::SeqCst);
    if filename != "song.mp3" {
        return (StatusCode::NOT_FOUND, "missing").into_response();
    }
    ([(header::CONTENT_TYPE, "audio/mpeg")], SONG_BYTES).into_response()
}

/// Serves `app` on an ephemeral port from inside a running tokio runtime.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Serves `app` from a dedicated runtime thread, for blocking tests.
pub fn serve_in_background(app: Router) -> SocketAddr {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            tx.send(serve(app).await).unwrap();
            std::future::pending::<()>().await;
        });
    });
    rx.recv().unwrap()
}
