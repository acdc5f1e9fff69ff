mod form;

use axum::{
    extract::{DefaultBodyLimit, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use shared::{
    BlendResponse, CanvasRect, CanvasSize, ForegroundResponse, GenerationRequest,
    ReconstructionResponse, StudioError, UploadResponse, ViewUpload,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::error::ApiError;
use crate::AppState;
use form::FormData;

/// Uploads are full-size photos; axum's 2 MB default is too small.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let static_dir = state.studio.store().static_dir().to_path_buf();

    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/upload", post(upload))
        .route("/prompt_fg", post(prompt_fg))
        .route("/blend", post(blend))
        .route("/triposr", post(triposr))
        .route("/upload_3d_view", post(upload_3d_view))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run blocking studio work off the async executor.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("worker panicked: {e}")))?
}

fn url_of(state: &AppState, path: &std::path::Path) -> Result<String, ApiError> {
    state.studio.store().url_for(path).ok_or_else(|| {
        ApiError::internal(format!("`{}` is not under the static folder", path.display()))
    })
}

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Background (`image1`) + foreground (`image2`) → cut-out foreground
pub async fn upload(
    State(state): State<AppState>,
    mut form: FormData,
) -> Result<Json<UploadResponse>, ApiError> {
    let bg = form.take_file("image1");
    let fg = form.take_file("image2");

    let (Some(bg), Some(fg)) = (bg, fg) else {
        return Err(ApiError::bad_request("Missing files"));
    };
    if !shared::storage::allowed_file(&bg.name) || !shared::storage::allowed_file(&fg.name) {
        return Err(ApiError::bad_request("Unsupported file format"));
    }

    let studio = state.studio.clone();
    let pair = blocking(move || {
        studio
            .prepare_uploads(&bg.name, &bg.bytes, &fg.name, &fg.bytes)
            .map_err(|e| match e {
                StudioError::Image(_) => ApiError::bad_request(e.to_string()),
                other => other.into(),
            })
    })
    .await?;

    Ok(Json(UploadResponse {
        image1: url_of(&state, &pair.bg_path)?,
        image2_nobg: url_of(&state, &pair.fg_nobg_path)?,
    }))
}

fn generation_request(
    form: &FormData,
    default_steps: u32,
    default_guidance: f32,
) -> Result<GenerationRequest, ApiError> {
    let steps = form.parse("steps")?.unwrap_or(default_steps);
    let guidance = form.parse("guidance_scale")?.unwrap_or(default_guidance);
    let keep_shadows = form.text("keep_shadows") == Some("1");
    let prompt = form.text("prompt").unwrap_or_default();
    Ok(GenerationRequest::new(prompt, keep_shadows, steps, guidance)?)
}

fn generation_error(err: StudioError) -> ApiError {
    match &err {
        StudioError::ToolFailed { tool: "rembg", .. }
        | StudioError::ToolMissing { tool: "rembg", .. } => {
            ApiError::internal(format!("Background removal failed: {err}"))
        }
        _ => ApiError::internal(format!("Local generation failed: {err}")),
    }
}

/// Prompt → generated foreground with its background removed
pub async fn prompt_fg(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<ForegroundResponse>, ApiError> {
    let generator = &state.studio.config().generator;
    let request = generation_request(&form, generator.default_steps, generator.default_guidance)?;

    let studio = state.studio.clone();
    let path = blocking(move || {
        studio
            .generator()
            .get()
            .map_err(|e| ApiError::internal(format!("Local model load failed: {e}")))?;
        studio.prompt_foreground(&request).map_err(generation_error)
    })
    .await?;

    Ok(Json(ForegroundResponse {
        fg: url_of(&state, &path)?,
    }))
}

/// Composite the foreground rectangle onto the letterboxed background
pub async fn blend(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<BlendResponse>, ApiError> {
    let (Some(bg_url), Some(fg_url)) = (form.text("bg"), form.text("fg")) else {
        return Err(ApiError::bad_request("Missing image URLs"));
    };

    let store = state.studio.store();
    let bg_path = store.path_for_url(bg_url)?;
    let fg_path = store.path_for_url(fg_url)?;

    let rect = CanvasRect {
        x: form.number("x", 0.0)?,
        y: form.number("y", 0.0)?,
        w: form.number("w", 0.0)?,
        h: form.number("h", 0.0)?,
    };
    let defaults = CanvasSize::default();
    let canvas = CanvasSize {
        width: form.number("canvas_w", defaults.width)?,
        height: form.number("canvas_h", defaults.height)?,
    };

    let studio = state.studio.clone();
    let out = blocking(move || Ok(studio.blend_files(&bg_path, &fg_path, rect, canvas)?)).await?;

    Ok(Json(BlendResponse {
        final_url: url_of(&state, &out)?,
    }))
}

/// Reconstruct the foreground in 3D
pub async fn triposr(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<ReconstructionResponse>, ApiError> {
    let Some(fg_url) = form.text("fg") else {
        return Err(ApiError::bad_request("Missing foreground URL"));
    };

    let not_found = || ApiError::not_found("Foreground image not found");
    let fg_path = state
        .studio
        .store()
        .path_for_url(fg_url)
        .map_err(|_| not_found())?;
    if !fg_path.is_file() {
        return Err(not_found());
    }

    let studio = state.studio.clone();
    let outputs = blocking(move || Ok(studio.reconstruct(&fg_path)?)).await?;
    if outputs.is_empty() {
        return Err(ApiError::internal("TripoSR failed"));
    }

    Ok(Json(ReconstructionResponse::from_outputs(
        &outputs,
        state.studio.store(),
    )))
}

/// Store a captured 3D view (file or data URL) as a new foreground
pub async fn upload_3d_view(
    State(state): State<AppState>,
    mut form: FormData,
) -> Result<Json<ForegroundResponse>, ApiError> {
    let upload = match form.take_file("image_data") {
        Some(file) => Some(ViewUpload::Bytes(file.bytes)),
        None => form
            .text("image_data")
            .map(|data| ViewUpload::Encoded(data.to_string())),
    };
    let upload = upload.ok_or_else(|| ApiError::bad_request("Missing image data"))?;

    let studio = state.studio.clone();
    let path = blocking(move || Ok(studio.save_view(upload)?)).await?;

    Ok(Json(ForegroundResponse {
        fg: url_of(&state, &path)?,
    }))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use image::{Rgba, RgbaImage};
    use shared::config::{PathsConfig, RembgConfig, RemoverBackend};
    use shared::tools::{ImageGenerator, LazyGenerator, Reconstructor};
    use shared::{Studio, StudioConfig};
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "scenecraft-test-boundary";

    struct FlatGenerator;

    impl ImageGenerator for FlatGenerator {
        fn model_id(&self) -> &str {
            "flat"
        }

        fn generate(&self, _request: &GenerationRequest, output: &Path) -> shared::Result<()> {
            framed([255, 255, 255, 255]).save(output)?;
            Ok(())
        }
    }

    struct MeshWriter;

    impl Reconstructor for MeshWriter {
        fn reconstruct(&self, _image: &Path, out_dir: &Path) -> shared::Result<()> {
            std::fs::create_dir_all(out_dir.join("0")).unwrap();
            std::fs::write(out_dir.join("0/mesh.obj"), "v 0 0 0\n").unwrap();
            std::fs::write(out_dir.join("0/input.png"), b"png").unwrap();
            Ok(())
        }
    }

    struct Failing;

    impl Reconstructor for Failing {
        fn reconstruct(&self, _image: &Path, _out_dir: &Path) -> shared::Result<()> {
            Err(StudioError::ToolMissing {
                tool: "TripoSR",
                detail: "run.py missing".into(),
            })
        }
    }

    fn framed(backdrop: [u8; 4]) -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, y| {
            if (2..6).contains(&x) && (2..6).contains(&y) {
                Rgba([200, 10, 10, 255])
            } else {
                Rgba(backdrop)
            }
        })
    }

    fn png() -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        framed([0, 255, 0, 255])
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn state(root: &Path, reconstructor: Box<dyn Reconstructor>) -> AppState {
        let config = StudioConfig {
            paths: PathsConfig {
                static_dir: root.join("static"),
                ..Default::default()
            },
            rembg: RembgConfig {
                backend: RemoverBackend::ColorKey,
                ..Default::default()
            },
            ..Default::default()
        };
        config.ensure_dirs().unwrap();
        let remover = shared::tools::remover_from_config(&config.rembg);
        let generator =
            LazyGenerator::new(|| Ok(Arc::new(FlatGenerator) as Arc<dyn ImageGenerator>));
        AppState {
            studio: Arc::new(Studio::with_tools(config, remover, generator, reconstructor)),
        }
    }

    fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router(state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn with_uri(mut req: Request<Body>, uri: &str) -> Request<Body> {
        *req.uri_mut() = uri.parse().unwrap();
        req
    }

    async fn uploaded(state: &AppState) -> (String, String) {
        let png = png();
        let req = with_uri(
            multipart(&[
                ("image1", Some("bg.png"), png.as_slice()),
                ("image2", Some("fg.jpg"), png.as_slice()),
            ]),
            "/upload",
        );
        let (status, body) = send(state, req).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (
            body["image1"].as_str().unwrap().to_string(),
            body["image2_nobg"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_health() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let req = Request::get("/api/health").body(Body::empty()).unwrap();
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_index_page() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let req = Request::get("/").body(Body::empty()).unwrap();
        let resp = router(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8_lossy(&bytes);
        assert!(page.contains("<html"));
        // 3D placement posts its capture and the final download is offered
        assert!(page.contains("/upload_3d_view") && page.contains("OrbitControls"));
        assert!(page.contains("final.png"));
        assert!(!page.contains("URLSearchParams"));
    }

    #[tokio::test]
    async fn test_upload_and_serve() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let (bg, fg) = uploaded(&state).await;

        assert!(bg.starts_with("/static/uploads/") && bg.ends_with("_bg.png"));
        assert!(fg.starts_with("/static/uploads/") && fg.ends_with("_nobg.png"));

        let req = Request::get(fg.as_str()).body(Body::empty()).unwrap();
        let resp = router(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let png = png();
        let req = with_uri(multipart(&[("image1", Some("bg.png"), png.as_slice())]), "/upload");
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing files");
    }

    #[tokio::test]
    async fn test_upload_bad_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let png = png();
        let req = with_uri(
            multipart(&[
                ("image1", Some("bg.png"), png.as_slice()),
                ("image2", Some("fg.tiff"), png.as_slice()),
            ]),
            "/upload",
        );
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unsupported file format");
    }

    #[tokio::test]
    async fn test_prompt_fg() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let (status, body) = send(
            &state,
            form("/prompt_fg", "prompt=a+red+cube&keep_shadows=0&steps=10"),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let fg = body["fg"].as_str().unwrap();
        assert!(fg.ends_with("_nobg_local.png"));
    }

    #[tokio::test]
    async fn test_prompt_fg_missing_prompt() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let (status, body) = send(&state, form("/prompt_fg", "prompt=++&keep_shadows=1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing prompt");
    }

    #[tokio::test]
    async fn test_prompt_fg_bad_steps() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let (status, _) = send(&state, form("/prompt_fg", "prompt=cat&steps=many")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blend() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let (bg, fg) = uploaded(&state).await;

        let body = format!("bg={bg}&fg={fg}&x=100&y=50&w=200&h=200&canvas_w=900&canvas_h=550");
        let (status, body) = send(&state, form("/blend", &body)).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let url = body["final"].as_str().unwrap();
        assert!(url.starts_with("/static/uploads/final_"));

        let path = state.studio.store().path_for_url(url).unwrap();
        let img = image::open(path).unwrap();
        assert_eq!((img.width(), img.height()), (900, 550));
    }

    #[tokio::test]
    async fn test_blend_missing_urls() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let (status, body) = send(&state, form("/blend", "bg=/static/uploads/a.png")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing image URLs");
    }

    #[tokio::test]
    async fn test_blend_rejects_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let (status, _) = send(
            &state,
            form("/blend", "bg=/static/../secret.png&fg=/static/uploads/a.png&w=1&h=1"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_triposr() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let (_, fg) = uploaded(&state).await;

        let (status, body) = send(&state, form("/triposr", &format!("fg={fg}"))).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let model = body["model"].as_str().unwrap();
        assert!(model.starts_with("/static/triposr/") && model.ends_with("/0/mesh.obj"));
        assert!(body["render"].as_str().unwrap().ends_with("input.png"));
        // no texture-like file: texture falls back to the render
        assert_eq!(body["texture"], body["render"]);
    }

    #[tokio::test]
    async fn test_triposr_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(Failing));

        let (status, body) = send(&state, form("/triposr", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing foreground URL");

        let (status, body) = send(&state, form("/triposr", "fg=/static/uploads/nope.png")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Foreground image not found");

        let (_, fg) = uploaded(&state).await;
        let (status, body) = send(&state, form("/triposr", &format!("fg={fg}"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "TripoSR failed");
    }

    #[tokio::test]
    async fn test_upload_3d_view_data_url() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let req = with_uri(
            multipart(&[("image_data", None, &b"data:image/png;base64,aGVsbG8="[..])]),
            "/upload_3d_view",
        );
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let url = body["fg"].as_str().unwrap();
        assert!(url.ends_with("_3dview.png"));
        let path = state.studio.store().path_for_url(url).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_upload_3d_view_file() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let png = png();
        let req = with_uri(
            multipart(&[("image_data", Some("view.png"), png.as_slice())]),
            "/upload_3d_view",
        );
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let path = state
            .studio
            .store()
            .path_for_url(body["fg"].as_str().unwrap())
            .unwrap();
        assert_eq!(std::fs::read(path).unwrap(), png);
    }

    #[tokio::test]
    async fn test_upload_3d_view_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let req = with_uri(multipart(&[("other", None, &b"x"[..])]), "/upload_3d_view");
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing image data");
    }

    #[tokio::test]
    async fn test_form_routes_accept_multipart() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let (bg, fg) = uploaded(&state).await;

        let req = with_uri(
            multipart(&[
                ("prompt", None, &b"a red cube"[..]),
                ("keep_shadows", None, &b"1"[..]),
                ("steps", None, &b"8"[..]),
            ]),
            "/prompt_fg",
        );
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(body["fg"].as_str().unwrap().ends_with("_nobg_local.png"));

        let req = with_uri(
            multipart(&[
                ("bg", None, bg.as_bytes()),
                ("fg", None, fg.as_bytes()),
                ("x", None, &b"10.5"[..]),
                ("y", None, &b""[..]),
                ("w", None, &b"40"[..]),
                ("h", None, &b"40"[..]),
                ("canvas_w", None, &b"300"[..]),
                ("canvas_h", None, &b"200"[..]),
            ]),
            "/blend",
        );
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let path = state
            .studio
            .store()
            .path_for_url(body["final"].as_str().unwrap())
            .unwrap();
        assert_eq!(image::open(path).unwrap().width(), 300);

        let req = with_uri(multipart(&[("fg", None, fg.as_bytes())]), "/triposr");
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(body["model"].as_str().unwrap().ends_with("/0/mesh.obj"));
    }

    #[tokio::test]
    async fn test_blend_blank_and_invalid_numbers() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let (bg, fg) = uploaded(&state).await;

        let body = format!("bg={bg}&fg={fg}&x=&y=&w=20&h=20&canvas_w=&canvas_h=");
        let (status, body) = send(&state, form("/blend", &body)).await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let body = format!("bg={bg}&fg={fg}&x=left&w=20&h=20");
        let (status, body) = send(&state, form("/blend", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid x: left");
    }

    #[tokio::test]
    async fn test_upload_3d_view_urlencoded() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let (status, body) = send(
            &state,
            form(
                "/upload_3d_view",
                "image_data=data%3Aimage%2Fpng%3Bbase64%2CaGVsbG8%3D",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let path = state
            .studio
            .store()
            .path_for_url(body["fg"].as_str().unwrap())
            .unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_missing_body_answers_json() {
        let tmp = tempfile::tempdir().unwrap();
        let state = state(tmp.path(), Box::new(MeshWriter));
        let req = Request::post("/triposr").body(Body::empty()).unwrap();
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing foreground URL");
    }
}
