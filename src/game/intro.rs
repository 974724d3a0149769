//! One-time contestant intro: generated name, bio, and portrait
//!
//! Structurally a turn without the dish fields. The portrait always targets
//! the fixed portrait model regardless of the chef's dish image model, and
//! neither step failing blocks game progress.

use crate::chef::{Chef, PORTRAIT_IMAGE_MODEL};
use crate::extract::extract_intro;
use crate::game::events::PipelineEvent;
use crate::gateway::{GenerationService, ImageRequest, ImageResult, TextRequest};
use crate::prompts::{intro_system_prompt, intro_user_prompt, portrait_prompt};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

const INTRO_TEMPERATURE: f32 = 0.9;

pub(crate) async fn run_intro(
    service: Arc<dyn GenerationService>,
    chef: Chef,
    tx: UnboundedSender<PipelineEvent>,
) {
    let request = TextRequest {
        model_id: chef.model_id.clone(),
        system: Some(intro_system_prompt().to_string()),
        prompt: intro_user_prompt().to_string(),
        temperature: Some(INTRO_TEMPERATURE),
    };

    let raw = match service.generate_text(request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(chef = %chef.id, "intro text step failed: {e}");
            let _ = tx.send(PipelineEvent::IntroFailed {
                chef: chef.id,
                reason: e.to_string(),
            });
            return;
        }
    };

    let intro = extract_intro(&raw, &chef.name);
    debug!(chef = %chef.id, name = %intro.name, "intro resolved");
    let _ = tx.send(PipelineEvent::IntroReady {
        chef: chef.id,
        intro: intro.clone(),
    });

    let image_request = ImageRequest {
        model_id: PORTRAIT_IMAGE_MODEL.to_string(),
        prompt: portrait_prompt(&intro.name, &intro.bio),
    };
    let image = match service.generate_image(image_request).await {
        Ok(image) => image,
        Err(e) => {
            // A missing portrait never blocks the game.
            warn!(chef = %chef.id, "portrait step failed: {e}");
            ImageResult::Absent
        }
    };
    let _ = tx.send(PipelineEvent::IntroPortrait {
        chef: chef.id,
        image,
    });
}
