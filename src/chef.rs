//! Chef roster and model tables
//!
//! Each contestant is bound to one of a fixed set of provider tags and carries
//! its own narrative and image model identifiers. The roster is created once
//! at game start; the intro pipeline may later replace name, bio and portrait.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed set of provider identities competing in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChefProvider {
    OpenAi,
    Anthropic,
    Google,
    Xai,
}

impl ChefProvider {
    /// All providers, in roster order.
    pub fn all() -> [ChefProvider; 4] {
        [
            ChefProvider::OpenAi,
            ChefProvider::Anthropic,
            ChefProvider::Google,
            ChefProvider::Xai,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChefProvider::OpenAi => "openai",
            ChefProvider::Anthropic => "anthropic",
            ChefProvider::Google => "google",
            ChefProvider::Xai => "xai",
        }
    }
}

impl fmt::Display for ChefProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One contestant: identity, display name, bound models, optional intro data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chef {
    pub id: ChefProvider,
    pub name: String,
    pub model_id: String,
    pub image_model_id: String,
    pub bio: Option<String>,
    pub portrait_ref: Option<String>,
    /// Display accent used by presentation layers.
    pub color: String,
}

/// Default narrative model per provider.
pub fn default_model(provider: ChefProvider) -> &'static str {
    match provider {
        ChefProvider::OpenAi => "openai/gpt-5-nano",
        ChefProvider::Anthropic => "anthropic/claude-3-haiku",
        ChefProvider::Google => "google/gemini-2.5-flash-lite",
        ChefProvider::Xai => "xai/grok-4.1-fast-reasoning",
    }
}

/// Dish image generation is pinned to the same fast image model for every
/// provider to keep round turnaround times low.
pub const FORCED_IMAGE_MODEL: &str = "bfl/flux-2-flex";

/// Portraits always use a fixed high-quality image model, independent of the
/// model a chef uses for dishes.
pub const PORTRAIT_IMAGE_MODEL: &str = "google/gemini-2.5-flash-image";

fn placeholder_name(provider: ChefProvider) -> &'static str {
    match provider {
        ChefProvider::OpenAi => "Chef GPT",
        ChefProvider::Anthropic => "Chef Claude",
        ChefProvider::Google => "Chef Gemini",
        ChefProvider::Xai => "Chef Grok",
    }
}

fn roster_color(provider: ChefProvider) -> &'static str {
    match provider {
        ChefProvider::OpenAi => "green",
        ChefProvider::Anthropic => "orange",
        ChefProvider::Google => "blue",
        ChefProvider::Xai => "gray",
    }
}

/// Build the default four-chef roster.
pub fn default_roster() -> Vec<Chef> {
    ChefProvider::all()
        .into_iter()
        .map(|id| Chef {
            id,
            name: placeholder_name(id).to_string(),
            model_id: default_model(id).to_string(),
            image_model_id: FORCED_IMAGE_MODEL.to_string(),
            bio: None,
            portrait_ref: None,
            color: roster_color(id).to_string(),
        })
        .collect()
}
