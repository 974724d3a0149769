//! Pipeline completion events
//!
//! Pipelines never touch shared state: each one emits events over the
//! engine's channel and the engine applies them. Turn events carry their
//! round number so a slow pipeline from a superseded round cannot corrupt
//! the current one.

use crate::chef::ChefProvider;
use crate::extract::IntroRecord;
use crate::game::state::Dish;
use crate::gateway::ImageResult;

#[derive(Debug)]
pub enum PipelineEvent {
    /// Text step resolved: a partial dish (no image yet) is ready.
    DishReady {
        chef: ChefProvider,
        round_number: u32,
        dish: Dish,
    },
    /// Image step resolved; `ImageResult::Absent` still completes the turn.
    DishImage {
        chef: ChefProvider,
        round_number: u32,
        image: ImageResult,
    },
    /// Text step failed; the turn is over with no dish.
    TurnFailed {
        chef: ChefProvider,
        round_number: u32,
        reason: String,
    },
    /// Intro text step resolved with a name and bio.
    IntroReady {
        chef: ChefProvider,
        intro: IntroRecord,
    },
    /// Portrait step resolved; `Absent` leaves the portrait unset.
    IntroPortrait {
        chef: ChefProvider,
        image: ImageResult,
    },
    /// Intro text step failed; placeholder identity stays in place.
    IntroFailed { chef: ChefProvider, reason: String },
}
