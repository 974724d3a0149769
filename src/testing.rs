//! Testing utilities
//!
//! A scripted [`GenerationService`] so engine and pipeline behavior can be
//! exercised without a gateway. Responses are keyed by model identifier;
//! unscripted calls fall back to configurable defaults.

use crate::error::{Error, Result};
use crate::gateway::{GenerationService, ImageRequest, ImageResult, TextRequest};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// PNG magic bytes, enough to stand in for a generated image.
const FAKE_PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47];

pub struct MockGenerationService {
    default_text: Mutex<String>,
    default_image: Mutex<ImageResult>,
    text_scripts: Mutex<HashMap<String, VecDeque<Result<String>>>>,
    image_scripts: Mutex<HashMap<String, VecDeque<Result<ImageResult>>>>,
    text_calls: Mutex<Vec<TextRequest>>,
    image_calls: Mutex<Vec<ImageRequest>>,
}

impl MockGenerationService {
    pub fn new() -> Self {
        Self {
            default_text: Mutex::new(String::new()),
            default_image: Mutex::new(ImageResult::InlineBytes(FAKE_PNG.to_vec())),
            text_scripts: Mutex::new(HashMap::new()),
            image_scripts: Mutex::new(HashMap::new()),
            text_calls: Mutex::new(Vec::new()),
            image_calls: Mutex::new(Vec::new()),
        }
    }

    /// New mock whose unscripted text calls all return `text`.
    pub fn with_default_text(text: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.set_default_text(text);
        mock
    }

    pub fn set_default_text(&self, text: impl Into<String>) {
        *self.default_text.lock().unwrap() = text.into();
    }

    pub fn set_default_image(&self, image: ImageResult) {
        *self.default_image.lock().unwrap() = image;
    }

    /// Queue one successful text response for a model.
    pub fn script_text(&self, model_id: &str, raw: impl Into<String>) {
        self.text_scripts
            .lock()
            .unwrap()
            .entry(model_id.to_string())
            .or_default()
            .push_back(Ok(raw.into()));
    }

    /// Queue one failing text response for a model.
    pub fn script_text_error(&self, model_id: &str, message: &str) {
        self.text_scripts
            .lock()
            .unwrap()
            .entry(model_id.to_string())
            .or_default()
            .push_back(Err(Error::Gateway(message.to_string())));
    }

    /// Queue one successful image response for a model.
    pub fn script_image(&self, model_id: &str, image: ImageResult) {
        self.image_scripts
            .lock()
            .unwrap()
            .entry(model_id.to_string())
            .or_default()
            .push_back(Ok(image));
    }

    /// Queue one failing image response for a model.
    pub fn script_image_error(&self, model_id: &str, message: &str) {
        self.image_scripts
            .lock()
            .unwrap()
            .entry(model_id.to_string())
            .or_default()
            .push_back(Err(Error::Gateway(message.to_string())));
    }

    pub fn text_calls(&self) -> Vec<TextRequest> {
        self.text_calls.lock().unwrap().clone()
    }

    pub fn image_calls(&self) -> Vec<ImageRequest> {
        self.image_calls.lock().unwrap().clone()
    }
}

impl Default for MockGenerationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationService for MockGenerationService {
    async fn generate_text(&self, req: TextRequest) -> Result<String> {
        self.text_calls.lock().unwrap().push(req.clone());
        if let Some(queue) = self.text_scripts.lock().unwrap().get_mut(&req.model_id) {
            if let Some(scripted) = queue.pop_front() {
                return scripted;
            }
        }
        Ok(self.default_text.lock().unwrap().clone())
    }

    async fn generate_image(&self, req: ImageRequest) -> Result<ImageResult> {
        self.image_calls.lock().unwrap().push(req.clone());
        if let Some(queue) = self.image_scripts.lock().unwrap().get_mut(&req.model_id) {
            if let Some(scripted) = queue.pop_front() {
                return scripted;
            }
        }
        Ok(self.default_image.lock().unwrap().clone())
    }
}
