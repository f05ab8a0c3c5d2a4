//! Admin endpoint tests using axum's test utilities.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use facebot_app::admin::router;
use facebot_app::state::AppState;
use facebot_core::{
    AccountId, ApiSession, CapabilityError, CapabilityResult, FaceCapability, FaceRegion,
    ImageSource, MediaApi, MediaId, MediaItem, Record, RecordState,
};
use facebot_db::Database;
use facebot_pipeline::{spawn_control, CaptionRotation, JpegFileSink, PublishSettings, Publisher};
use http_body_util::BodyExt;
use image::{DynamicImage, Rgb, RgbImage};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct NoApi;

#[async_trait]
impl MediaApi for NoApi {
    async fn open_session(&self) -> CapabilityResult<Box<dyn ApiSession>> {
        Err(CapabilityError::Session("offline".into()))
    }
}

struct Images {
    fail: bool,
}

#[async_trait]
impl ImageSource for Images {
    async fn fetch(&self, url: &str) -> CapabilityResult<DynamicImage> {
        if self.fail {
            return Err(CapabilityError::Fetch {
                url: url.to_string(),
                reason: "HTTP 404".into(),
            });
        }
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            20,
            10,
            Rgb([200, 100, 50]),
        )))
    }
}

struct Faces;

#[async_trait]
impl FaceCapability for Faces {
    async fn detect_faces(&self, _image: &DynamicImage) -> CapabilityResult<Vec<FaceRegion>> {
        Ok(Vec::new())
    }

    async fn replace_faces(&self, image: &DynamicImage) -> CapabilityResult<DynamicImage> {
        Ok(image.grayscale())
    }
}

struct Harness {
    app: axum::Router,
    db: Database,
    dir: TempDir,
}

async fn harness(fail_fetch: bool) -> Harness {
    let db = Database::open(":memory:").await.expect("open db");
    let dir = TempDir::new().expect("temp dir");
    let publisher = Publisher::new(
        db.clone(),
        Arc::new(NoApi),
        Arc::new(Images { fail: fail_fetch }),
        Arc::new(Faces),
        Arc::new(JpegFileSink),
        PublishSettings {
            min_faces: 1,
            upload: false,
            auto_follow: false,
            output_dir: dir.path().join("output"),
        },
    );
    let (handle, _task) = spawn_control(publisher, CaptionRotation::default());
    Harness {
        app: router(AppState::new(db.clone(), handle)),
        db,
        dir,
    }
}

async fn seed(db: &Database, id: &str, faces: u32) {
    let item = MediaItem {
        id: MediaId::new(id).expect("id"),
        url: format!("http://img.test/{id}.jpg"),
        account_id: AccountId::new("acc-bob"),
        username: "bob".to_string(),
    };
    db.put(&Record::available(item, faces)).await.expect("seed");
}

async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.expect("body").to_bytes().to_vec()
}

async fn body_json(body: Body) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(body).await).expect("json body")
}

#[tokio::test]
async fn test_demo_returns_jpeg() {
    let h = harness(false).await;
    seed(&h.db, "m1", 2).await;

    let response = h
        .app
        .oneshot(Request::get("/demo").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).expect("content type"),
        "image/jpeg"
    );
    let bytes = body_bytes(response.into_body()).await;
    let image = image::load_from_memory(&bytes).expect("decode");
    assert_eq!((image.width(), image.height()), (20, 10));

    // Demo renders leave the record alone.
    let record = h.db.get(&MediaId::new("m1").expect("id")).await.expect("get");
    assert_eq!(record.state, RecordState::Available);
}

#[tokio::test]
async fn test_demo_not_found_when_nothing_eligible() {
    let h = harness(false).await;
    seed(&h.db, "m0", 0).await;

    let response = h
        .app
        .oneshot(Request::get("/demo").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], "NO_ELIGIBLE_RECORD");
}

#[tokio::test]
async fn test_stats_groups_available_by_face_count() {
    let h = harness(false).await;
    seed(&h.db, "a", 1).await;
    seed(&h.db, "b", 1).await;
    seed(&h.db, "c", 3).await;

    let response = h
        .app
        .oneshot(Request::get("/stats").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["state"], "Available");
    assert_eq!(json["total"], 3);
    assert_eq!(json["by_face_count"][0]["face_count"], 1);
    assert_eq!(json["by_face_count"][0]["records"], 2);
    assert_eq!(json["by_face_count"][1]["face_count"], 3);
}

#[tokio::test]
async fn test_publish_then_stats_all() {
    let h = harness(false).await;
    seed(&h.db, "m1", 2).await;

    let response = h
        .app
        .clone()
        .oneshot(
            Request::post("/publish")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response.into_body()).await;
    assert_eq!(outcome["record"]["id"], "m1");
    assert_eq!(outcome["record"]["state"], "Used");
    assert!(h.dir.path().join("output").join("m1.jpeg").exists());

    let response = h
        .app
        .oneshot(Request::get("/stats/all").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let counts = body_json(response.into_body()).await;
    assert_eq!(counts["used"], 1);
    assert_eq!(counts["available"], 0);
    assert_eq!(counts["rejected"], 0);
}

#[tokio::test]
async fn test_failed_publish_is_bad_gateway_and_rejects() {
    let h = harness(true).await;
    seed(&h.db, "m1", 2).await;

    let response = h
        .app
        .oneshot(
            Request::post("/publish")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let record = h.db.get(&MediaId::new("m1").expect("id")).await.expect("get");
    assert_eq!(record.state, RecordState::Rejected);
}
