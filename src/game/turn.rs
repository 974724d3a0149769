//! One chef's turn: text generation, extraction, then image generation
//!
//! Each turn runs as its own task and only ever communicates through events.
//! The image step never starts before text extraction has resolved; a failed
//! or empty image degrades to an absent image rather than failing the turn.

use crate::chef::Chef;
use crate::extract::extract_dish;
use crate::game::events::PipelineEvent;
use crate::game::state::{Basket, Dish};
use crate::gateway::{GenerationService, ImageRequest, ImageResult, TextRequest};
use crate::prompts::{dish_image_prompt, dish_system_prompt, dish_user_prompt};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

const DISH_TEMPERATURE: f32 = 0.8;

pub(crate) async fn run_turn(
    service: Arc<dyn GenerationService>,
    chef: Chef,
    basket: Basket,
    round_number: u32,
    use_personas: bool,
    tx: UnboundedSender<PipelineEvent>,
) {
    let request = TextRequest {
        model_id: chef.model_id.clone(),
        system: Some(dish_system_prompt(&chef, basket.labels(), round_number, use_personas)),
        prompt: dish_user_prompt(basket.labels()),
        temperature: Some(DISH_TEMPERATURE),
    };

    let raw = match service.generate_text(request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(chef = %chef.id, round = round_number, "text step failed: {e}");
            let _ = tx.send(PipelineEvent::TurnFailed {
                chef: chef.id,
                round_number,
                reason: e.to_string(),
            });
            return;
        }
    };

    let record = extract_dish(&raw);
    debug!(chef = %chef.id, round = round_number, title = %record.title, "dish text resolved");

    let dish = Dish {
        round_number,
        chef_id: chef.id,
        title: record.title,
        narrative: record.narrative,
        ingredients_used: basket.labels().to_vec(),
        image_ref: None,
    };
    let _ = tx.send(PipelineEvent::DishReady {
        chef: chef.id,
        round_number,
        dish,
    });

    let image_request = ImageRequest {
        model_id: chef.image_model_id.clone(),
        prompt: dish_image_prompt(&record.image_prompt),
    };
    let image = match service.generate_image(image_request).await {
        Ok(image) => image,
        Err(e) => {
            // The round can still judge a text-only dish.
            warn!(chef = %chef.id, round = round_number, "image step failed: {e}");
            ImageResult::Absent
        }
    };
    let _ = tx.send(PipelineEvent::DishImage {
        chef: chef.id,
        round_number,
        image,
    });
}
