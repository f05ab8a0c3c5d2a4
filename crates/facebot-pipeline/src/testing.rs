//! Fakes for the capability traits.

use async_trait::async_trait;
use facebot_core::{
    Account, AccountId, ApiSession, CapabilityError, CapabilityResult, FaceCapability, FaceRegion,
    ImageSink, ImageSource, MediaApi, MediaId, MediaItem,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn item(id: &str, username: &str) -> MediaItem {
    MediaItem {
        id: MediaId::new(id).expect("valid id"),
        url: format!("http://img.test/{id}.jpg"),
        account_id: AccountId::new(format!("acc-{username}")),
        username: username.to_string(),
    }
}

pub fn test_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([120, 80, 40])))
}

#[derive(Clone, Default)]
pub struct FakeImages {
    fail: bool,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl FakeImages {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ImageSource for FakeImages {
    async fn fetch(&self, url: &str) -> CapabilityResult<DynamicImage> {
        self.fetched.lock().expect("lock").push(url.to_string());
        if self.fail {
            return Err(CapabilityError::Fetch {
                url: url.to_string(),
                reason: "HTTP 404".into(),
            });
        }
        Ok(test_image())
    }
}

#[derive(Clone, Default)]
pub struct FakeFaces {
    count: usize,
    fail_detect: bool,
    fail_replace: bool,
    detect_calls: Arc<AtomicUsize>,
}

impl FakeFaces {
    pub fn with_count(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_detect: true,
            fail_replace: true,
            ..Self::default()
        }
    }

    pub fn failing_replace() -> Self {
        Self {
            fail_replace: true,
            ..Self::default()
        }
    }

    pub fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FaceCapability for FakeFaces {
    async fn detect_faces(&self, _image: &DynamicImage) -> CapabilityResult<Vec<FaceRegion>> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_detect {
            return Err(CapabilityError::Face("detector offline".into()));
        }
        Ok(vec![
            FaceRegion {
                x: 0,
                y: 0,
                width: 4,
                height: 4,
            };
            self.count
        ])
    }

    async fn replace_faces(&self, image: &DynamicImage) -> CapabilityResult<DynamicImage> {
        if self.fail_replace {
            return Err(CapabilityError::Face("replacer offline".into()));
        }
        Ok(image.grayscale())
    }
}

pub struct FailingSink;

#[async_trait]
impl ImageSink for FailingSink {
    async fn write(&self, path: &Path, _image: &DynamicImage) -> CapabilityResult<()> {
        Err(CapabilityError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("cannot write {}", path.display()),
        )))
    }
}

#[derive(Default)]
pub struct ApiState {
    pub accounts: Mutex<Vec<Account>>,
    pub media: Mutex<Vec<MediaItem>>,
    pub followers: Mutex<Vec<Account>>,
    pub fail_open: Mutex<bool>,
    pub fail_upload: Mutex<bool>,
    pub fail_follow: Mutex<bool>,
    pub uploads: Mutex<Vec<(PathBuf, String)>>,
    pub follows: Mutex<Vec<AccountId>>,
    pub follower_queries: Mutex<Vec<AccountId>>,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct FakeApi {
    pub state: Arc<ApiState>,
}

impl FakeApi {
    /// One followed account whose recent media are `ids`, in this order.
    pub fn set_feed(&self, username: &str, ids: &[&str]) {
        *self.state.accounts.lock().expect("lock") =
            vec![Account::new(format!("acc-{username}"), username)];
        *self.state.media.lock().expect("lock") =
            ids.iter().map(|id| item(id, username)).collect();
    }

    pub fn set_followers(&self, names: &[&str]) {
        *self.state.followers.lock().expect("lock") = names
            .iter()
            .map(|n| Account::new(format!("acc-{n}"), *n))
            .collect();
    }

    pub fn fail_upload(&self) {
        *self.state.fail_upload.lock().expect("lock") = true;
    }

    pub fn fail_follow(&self) {
        *self.state.fail_follow.lock().expect("lock") = true;
    }

    pub fn uploads(&self) -> Vec<(PathBuf, String)> {
        self.state.uploads.lock().expect("lock").clone()
    }

    pub fn follows(&self) -> Vec<AccountId> {
        self.state.follows.lock().expect("lock").clone()
    }

    pub fn follower_queries(&self) -> Vec<AccountId> {
        self.state.follower_queries.lock().expect("lock").clone()
    }

    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }
}

struct FakeSession {
    state: Arc<ApiState>,
}

#[async_trait]
impl MediaApi for FakeApi {
    async fn open_session(&self) -> CapabilityResult<Box<dyn ApiSession>> {
        if *self.state.fail_open.lock().expect("lock") {
            return Err(CapabilityError::Session("login refused".into()));
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            state: Arc::clone(&self.state),
        }))
    }
}

#[async_trait]
impl ApiSession for FakeSession {
    async fn list_accounts(&self) -> CapabilityResult<Vec<Account>> {
        Ok(self.state.accounts.lock().expect("lock").clone())
    }

    async fn list_recent_media(&self, account: &Account) -> CapabilityResult<Vec<MediaItem>> {
        Ok(self
            .state
            .media
            .lock()
            .expect("lock")
            .iter()
            .filter(|m| m.username == account.username)
            .cloned()
            .collect())
    }

    async fn list_followers(&self, account_id: &AccountId) -> CapabilityResult<Vec<Account>> {
        self.state
            .follower_queries
            .lock()
            .expect("lock")
            .push(account_id.clone());
        Ok(self.state.followers.lock().expect("lock").clone())
    }

    async fn follow(&self, account_id: &AccountId) -> CapabilityResult<()> {
        if *self.state.fail_follow.lock().expect("lock") {
            return Err(CapabilityError::Follow("rate limited".into()));
        }
        self.state
            .follows
            .lock()
            .expect("lock")
            .push(account_id.clone());
        Ok(())
    }

    async fn upload_photo(&self, path: &Path, caption: &str) -> CapabilityResult<()> {
        if *self.state.fail_upload.lock().expect("lock") {
            return Err(CapabilityError::Upload("HTTP 500".into()));
        }
        self.state
            .uploads
            .lock()
            .expect("lock")
            .push((path.to_path_buf(), caption.to_string()));
        Ok(())
    }

    async fn close(&self) -> CapabilityResult<()> {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
