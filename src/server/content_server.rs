use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use bytes::Bytes;
use mime_guess::Mime;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ServerError;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
const DIRECTORY_INDEX: &str = "index.html";

/// 静态内容服务
///
/// 绑定 `127.0.0.1:0`，端口由操作系统在绑定时分配。
/// 服务任务只读访问目录树，与遍历循环之间没有共享的可变状态。
pub struct ContentServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ContentServer {
    /// 启动服务
    pub async fn start(root: impl Into<PathBuf>) -> Result<Self, ServerError> {
        let root: PathBuf = root.into();
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .map_err(ServerError::BindFailed)?;
        let addr = listener.local_addr().map_err(ServerError::BindFailed)?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let router = router(root.clone());
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!("🌐 内容服务已启动: http://{} → {}", addr, root.display());
        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// 入口页面的完整 URL
    pub fn entry_url(&self, entry_page: &str) -> String {
        format!(
            "http://{}/{}",
            self.addr,
            entry_page.trim_start_matches('/')
        )
    }

    /// 关闭服务并等待后台任务退出，之后端口可被重新绑定
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut self.task).await {
            Ok(Ok(Ok(()))) => {
                info!("✓ 内容服务已关闭: {}", self.addr);
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(ServerError::ServeFailed(e)),
            Ok(Err(e)) => Err(ServerError::ShutdownFailed(e.to_string())),
            Err(_) => {
                self.task.abort();
                Err(ServerError::ShutdownFailed(format!(
                    "{} 秒内未能退出，已强制终止",
                    SHUTDOWN_TIMEOUT.as_secs()
                )))
            }
        }
    }
}

impl Drop for ContentServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            self.task.abort();
        }
    }
}

fn router(root: PathBuf) -> Router {
    Router::new()
        .route("/", get(serve_root))
        .route("/{*path}", get(serve_path))
        .with_state(Arc::new(root))
}

async fn serve_root(State(root): State<Arc<PathBuf>>) -> Response {
    serve_file(&root, "").await
}

async fn serve_path(State(root): State<Arc<PathBuf>>, Path(path): Path<String>) -> Response {
    serve_file(&root, &path).await
}

async fn serve_file(root: &FsPath, request_path: &str) -> Response {
    let Some(relative) = sanitize(request_path) else {
        debug!("拒绝请求: {}", request_path);
        return StatusCode::NOT_FOUND.into_response();
    };

    let Some(file) = resolve(root, &relative).await else {
        debug!("文件不存在: {}", request_path);
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&file).await {
        Ok(contents) => {
            let mime = mime_guess::from_path(&file).first_or_octet_stream();
            build_response(Bytes::from(contents), mime)
        }
        Err(e) => {
            warn!("⚠️ 读取文件失败 {}: {}", file.display(), e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// 把请求路径转换为相对路径，拒绝目录穿越
fn sanitize(request_path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for part in request_path.split('/').filter(|p| !p.is_empty()) {
        if part.contains('\\') {
            return None;
        }
        match FsPath::new(part).components().next() {
            Some(Component::Normal(c)) => relative.push(c),
            Some(Component::CurDir) => {}
            _ => return None,
        }
    }
    Some(relative)
}

/// 先精确匹配，失败后逐级做大小写不敏感匹配；目录请求返回其中的 index.html
async fn resolve(root: &FsPath, relative: &FsPath) -> Option<PathBuf> {
    let exact = root.join(relative);
    let candidate = if tokio::fs::try_exists(&exact).await.unwrap_or(false) {
        exact
    } else {
        resolve_case_insensitive(root, relative).await?
    };

    let metadata = tokio::fs::metadata(&candidate).await.ok()?;
    if metadata.is_dir() {
        let index = candidate.join(DIRECTORY_INDEX);
        let index_metadata = tokio::fs::metadata(&index).await.ok()?;
        return index_metadata.is_file().then_some(index);
    }
    metadata.is_file().then_some(candidate)
}

async fn resolve_case_insensitive(root: &FsPath, relative: &FsPath) -> Option<PathBuf> {
    let mut current = root.to_path_buf();
    for component in relative.components() {
        let wanted = component.as_os_str().to_str()?;
        let mut entries = tokio::fs::read_dir(&current).await.ok()?;
        let mut found = None;
        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
            {
                found = Some(entry.path());
                break;
            }
        }
        current = found?;
    }
    Some(current)
}

fn build_response(bytes: Bytes, mime: Mime) -> Response {
    let len = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
        headers.insert(header::CONTENT_LENGTH, value);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    response
}
