//! Prompt construction for dish turns, intros and images
//!
//! Course type is derived from the round ordinal: the first three rounds map
//! to the classic appetizer/entree/dessert sequence, anything beyond that is
//! a generic mystery round.

use crate::chef::{Chef, ChefProvider};
use std::fmt;

/// Category label shaping the round's prompt instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseType {
    Appetizer,
    Entree,
    Dessert,
    Mystery,
}

impl CourseType {
    /// Map a 1-based round ordinal to its course.
    pub fn for_round(round_number: u32) -> CourseType {
        match round_number {
            1 => CourseType::Appetizer,
            2 => CourseType::Entree,
            3 => CourseType::Dessert,
            _ => CourseType::Mystery,
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            CourseType::Appetizer => {
                "Create a starter dish that teases the palate. Small portion, high flavor impact."
            }
            CourseType::Entree => {
                "Create a substantial main course. Balanced, filling, and technically proficient."
            }
            CourseType::Dessert => {
                "Create a sweet conclusion to the meal. You must make a dessert."
            }
            CourseType::Mystery => {
                "Create a dish of any course. Surprise the judges with your interpretation."
            }
        }
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CourseType::Appetizer => "Appetizer",
            CourseType::Entree => "Entree",
            CourseType::Dessert => "Dessert",
            CourseType::Mystery => "Mystery",
        };
        write!(f, "{label}")
    }
}

struct Persona {
    name: &'static str,
    style: &'static str,
}

fn persona(provider: ChefProvider) -> Persona {
    match provider {
        ChefProvider::OpenAi => Persona {
            name: "Chef GPT",
            style: "Precise, technical, and slightly robotic but enthusiastic.",
        },
        ChefProvider::Anthropic => Persona {
            name: "Chef Claude",
            style: "Sophisticated, articulate, focused on ethical sourcing and balance.",
        },
        ChefProvider::Google => Persona {
            name: "Chef Gemini",
            style: "Data-driven, multimodal, and experimental.",
        },
        ChefProvider::Xai => Persona {
            name: "Chef Grok",
            style: "Edgy, witty, and unconventional.",
        },
    }
}

/// Fixed photography style appended to every dish image prompt.
pub const PHOTO_STYLE_SUFFIX: &str = ", high-quality professional food photography, 8k resolution, \
     studio lighting, overhead shot, vibrant colors, photorealistic.";

/// System prompt for one chef's dish turn.
pub fn dish_system_prompt(
    chef: &Chef,
    ingredients: &[String],
    round_number: u32,
    use_personas: bool,
) -> String {
    let course = CourseType::for_round(round_number);
    let persona = persona(chef.id);
    let (persona_name, persona_style) = if use_personas {
        (persona.name, persona.style)
    } else {
        ("AI Chef", "Creative and confident.")
    };

    let bio_line = chef
        .bio
        .as_deref()
        .map(|bio| format!("\nChef bio: {bio}\nUse this backstory to flavor the tone and dish concept."))
        .unwrap_or_default();

    format!(
        r#"You are {persona_name}, a contestant on the cooking show "Chopped".
Your personality is: {persona_style}.

This is the {course} Round (Round {round_number}).{bio_line}
The judges have given you 4 mystery ingredients: {basket}.
You must create a {course} dish that uses ALL 4 ingredients.
{instruction}

You must respond in a standardized JSON format so I can display your result on the show.
Do NOT output markdown code blocks. Just the raw JSON.

Rules:
1. Start your monologue with "Today for you judges, I have made..."
2. Explain how you transformed the ingredients.
3. Be creative but realistic.

JSON Structure:
{{
  "dishTitle": "Name of your dish",
  "monologue": "Your spoken presentation to the judges...",
  "shortImagePrompt": "A visual description of the plated dish for a photographer."
}}"#,
        basket = ingredients.join(", "),
        instruction = course.instruction(),
    )
}

/// User prompt accompanying the dish system prompt.
pub fn dish_user_prompt(ingredients: &[String]) -> String {
    format!(
        "Here are the ingredients: {}. Present your dish.",
        ingredients.join(", ")
    )
}

/// System prompt for the one-time intro step.
pub fn intro_system_prompt() -> &'static str {
    "You are an energetic cooking show contestant. Respond only with compact JSON \
     for your on-screen lower-third."
}

/// User prompt for the one-time intro step.
pub fn intro_user_prompt() -> &'static str {
    "Create a unique but realistic human name for yourself (avoid obvious AI names, \
     keep it plausible for TV) and a 1 sentence backstory (max 25 words).\n\
     Output JSON with keys: name, bio. No markdown, no code fences."
}

/// Portrait prompt synthesized from the resolved intro.
pub fn portrait_prompt(name: &str, bio: &str) -> String {
    format!(
        "Cinematic portrait of a chef named {name}, {bio}. Photorealistic, professional \
         studio lighting, head and shoulders, confident smile, wearing a chef coat."
    )
}

/// Full prompt for a dish image: the extracted image prompt plus the fixed
/// photography style descriptor.
pub fn dish_image_prompt(image_prompt: &str) -> String {
    format!("{image_prompt}{PHOTO_STYLE_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chef::default_roster;

    #[test]
    fn test_course_for_round_sequence() {
        assert_eq!(CourseType::for_round(1), CourseType::Appetizer);
        assert_eq!(CourseType::for_round(2), CourseType::Entree);
        assert_eq!(CourseType::for_round(3), CourseType::Dessert);
        assert_eq!(CourseType::for_round(4), CourseType::Mystery);
        assert_eq!(CourseType::for_round(99), CourseType::Mystery);
    }

    #[test]
    fn test_dish_prompt_includes_basket_and_course() {
        let chef = &default_roster()[0];
        let basket = vec![
            "Sourdough Bread".to_string(),
            "Pork Tenderloin".to_string(),
            "Pickled Radish".to_string(),
            "Blackberries".to_string(),
        ];
        let prompt = dish_system_prompt(chef, &basket, 2, true);
        assert!(prompt.contains("Entree Round (Round 2)"));
        assert!(prompt.contains("Sourdough Bread, Pork Tenderloin, Pickled Radish, Blackberries"));
        assert!(prompt.contains("dishTitle"));
        assert!(prompt.contains("Chef GPT"));
    }

    #[test]
    fn test_dish_prompt_persona_flag_and_bio() {
        let mut chef = default_roster()[1].clone();
        chef.bio = Some("Raised on a coastal farm.".to_string());
        let basket = vec!["A".into(), "B".into(), "C".into(), "D".into()];
        let with = dish_system_prompt(&chef, &basket, 1, true);
        assert!(with.contains("Chef Claude"));
        assert!(with.contains("Raised on a coastal farm."));
        let without = dish_system_prompt(&chef, &basket, 1, false);
        assert!(without.contains("AI Chef"));
        assert!(!without.contains("Chef Claude,"));
    }

    #[test]
    fn test_dish_image_prompt_has_style_suffix() {
        let full = dish_image_prompt("plated seafood");
        assert!(full.starts_with("plated seafood"));
        assert!(full.contains("food photography"));
    }
}
