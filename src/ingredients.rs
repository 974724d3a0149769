//! Ingredient catalog built from the embedded episode dataset
//!
//! The dataset maps episodes to the ingredients used in each course. The
//! catalog deduplicates names per course (first appearance wins for the
//! season/episode metadata) and can draw a random 4-item basket.

use crate::error::{Error, Result};
use crate::game::state::Basket;
use crate::prompts::CourseType;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

const EPISODES_JSON: &str = include_str!("data/episodes.json");

#[derive(Debug, Deserialize)]
struct Episode {
    season: u32,
    episode_number: u32,
    episode_title: String,
    ingredients: HashMap<String, Vec<String>>,
}

/// One selectable ingredient with its first-appearance provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientOption {
    pub value: String,
    pub label: String,
    pub season: u32,
    pub episode: u32,
    pub episode_title: String,
}

const COURSE_KEYS: [(&str, CourseType); 3] = [
    ("Appetizer", CourseType::Appetizer),
    ("Entree", CourseType::Entree),
    ("Dessert", CourseType::Dessert),
];

fn build_catalog() -> HashMap<&'static str, Vec<IngredientOption>> {
    let episodes: Vec<Episode> = match serde_json::from_str(EPISODES_JSON) {
        Ok(episodes) => episodes,
        Err(e) => {
            // The dataset ships inside the binary; a parse failure means a
            // broken build, but an empty catalog still lets manual baskets work.
            warn!("embedded episode dataset failed to parse: {e}");
            Vec::new()
        }
    };

    let mut catalog: HashMap<&'static str, Vec<IngredientOption>> = HashMap::new();
    for (key, _) in COURSE_KEYS {
        let mut seen: HashMap<String, IngredientOption> = HashMap::new();
        for episode in &episodes {
            let Some(names) = episode.ingredients.get(key) else {
                continue;
            };
            for raw in names {
                let name = raw.trim();
                if name.is_empty() || seen.contains_key(name) {
                    continue;
                }
                seen.insert(
                    name.to_string(),
                    IngredientOption {
                        value: name.to_string(),
                        label: name.to_string(),
                        season: episode.season,
                        episode: episode.episode_number,
                        episode_title: episode.episode_title.clone(),
                    },
                );
            }
        }
        let mut options: Vec<IngredientOption> = seen.into_values().collect();
        options.sort_by(|a, b| a.value.cmp(&b.value));
        catalog.insert(key, options);
    }
    catalog
}

static CATALOG: Lazy<HashMap<&'static str, Vec<IngredientOption>>> = Lazy::new(build_catalog);

fn course_key(course: CourseType) -> &'static str {
    // Mystery rounds draw from the appetizer list; the dataset has no
    // separate mystery column.
    match course {
        CourseType::Appetizer | CourseType::Mystery => "Appetizer",
        CourseType::Entree => "Entree",
        CourseType::Dessert => "Dessert",
    }
}

/// Deduplicated, sorted ingredient options for a course. With `show_details`
/// each label carries its first-appearance season and episode.
pub fn get_ingredients(course: CourseType, show_details: bool) -> Vec<IngredientOption> {
    let options = CATALOG.get(course_key(course)).cloned().unwrap_or_default();
    if !show_details {
        return options;
    }
    options
        .into_iter()
        .map(|opt| {
            let label = format!("{} (S{} E{})", opt.value, opt.season, opt.episode);
            IngredientOption { label, ..opt }
        })
        .collect()
}

/// Draw 4 distinct ingredients for a course.
pub fn get_random_basket(course: CourseType) -> Result<Basket> {
    let options = CATALOG.get(course_key(course)).cloned().unwrap_or_default();
    if options.len() < 4 {
        return Err(Error::NotFound(format!(
            "not enough catalog ingredients for a {course} basket"
        )));
    }
    let mut names: Vec<String> = options.into_iter().map(|o| o.value).collect();
    names.shuffle(&mut rand::rng());
    names.truncate(4);
    Basket::new(names)
}
