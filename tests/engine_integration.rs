//! Full-competition integration test: intros, three rounds, one winner.

use chopped::chef::{default_roster, ChefProvider, FORCED_IMAGE_MODEL, PORTRAIT_IMAGE_MODEL};
use chopped::game::state::{LoadingStatus, RoundStatus};
use chopped::game::GameEngine;
use chopped::gateway::ImageResult;
use chopped::testing::MockGenerationService;
use std::sync::Arc;

fn dish_json(title: &str, prompt: &str) -> String {
    format!(
        "{{\"dishTitle\":\"{title}\",\"monologue\":\"Judges, I present {title}.\",\"shortImagePrompt\":\"{prompt}\"}}"
    )
}

fn intro_json(name: &str, bio: &str) -> String {
    format!("{{\"name\":\"{name}\",\"bio\":\"{bio}\"}}")
}

const APPETIZER_BASKET: [&str; 4] = ["Octopus", "Gochujang", "Rice Cakes", "Watermelon"];
const ENTREE_BASKET: [&str; 4] = ["Duck Breast", "Black Garlic", "Plantains", "Root Beer"];
const DESSERT_BASKET: [&str; 4] = ["Figs", "Goat Cheese", "Puff Pastry", "Lavender"];

fn labels(basket: [&str; 4]) -> Vec<String> {
    basket.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_full_competition_to_winner() {
    let service = MockGenerationService::new();

    // Each chef gets a distinct intro. The anthropic chef's responses carry
    // markdown fences and chatter, exercising the loose extraction path.
    service.script_text(
        "openai/gpt-5-nano",
        intro_json("Jordan Reyes", "Pop-up chef from Austin."),
    );
    service.script_text(
        "anthropic/claude-3-haiku",
        format!(
            "Here is my intro!\n```json\n{}\n```",
            intro_json("Amara Diallo", "Dakar-born pastry obsessive.")
        ),
    );
    service.script_text(
        "google/gemini-2.5-flash-lite",
        intro_json("Kenji Mori", "Third-generation izakaya cook."),
    );
    service.script_text(
        "xai/grok-4.1-fast-reasoning",
        intro_json("Sasha Volkov", "Fire-cooking fanatic."),
    );

    // Round 1 dishes, again one per chef model.
    service.script_text("openai/gpt-5-nano", dish_json("Octopus Tteok", "charred octopus"));
    service.script_text(
        "anthropic/claude-3-haiku",
        format!("```json\n{}\n```", dish_json("Gochujang Glaze", "glazed skewers")),
    );
    service.script_text(
        "google/gemini-2.5-flash-lite",
        dish_json("Watermelon Crudo", "pink crudo"),
    );
    service.script_text(
        "xai/grok-4.1-fast-reasoning",
        dish_json("Rice Cake Chips", "crispy chips"),
    );

    // Rounds 2 and 3 fall back to the default text for surviving chefs.
    service.set_default_text(dish_json("Survivor Special", "a plated dish"));

    let mut engine = GameEngine::new(Arc::new(service), default_roster(), true);

    engine.generate_intros().unwrap();
    engine.run_intros().await;

    let amara = engine.chef(ChefProvider::Anthropic).unwrap();
    assert_eq!(amara.name, "Amara Diallo");
    assert_eq!(amara.bio.as_deref(), Some("Dakar-born pastry obsessive."));
    assert!(amara.portrait_ref.is_some());
    for chef in ChefProvider::all() {
        assert_eq!(engine.intro_status()[&chef], LoadingStatus::Done);
    }

    // Round 1: appetizer.
    engine.submit_basket(labels(APPETIZER_BASKET)).unwrap();
    engine.run_round().await;
    assert_eq!(engine.state().status, RoundStatus::Judging);
    assert_eq!(engine.state().round_number, 1);
    assert_eq!(
        engine.state().dishes[&ChefProvider::Anthropic].title,
        "Gochujang Glaze"
    );
    assert_eq!(
        engine.state().dishes[&ChefProvider::OpenAi]
            .ingredients_used,
        labels(APPETIZER_BASKET)
    );
    engine.eliminate(ChefProvider::Xai).unwrap();
    assert_eq!(engine.state().status, RoundStatus::Idle);

    // Round 2: entree, three chefs left.
    engine.submit_basket(labels(ENTREE_BASKET)).unwrap();
    engine.run_round().await;
    assert_eq!(engine.state().dishes.len(), 3);
    assert!(!engine.state().dishes.contains_key(&ChefProvider::Xai));
    engine.eliminate(ChefProvider::Google).unwrap();

    // Round 3: dessert, final two.
    engine.submit_basket(labels(DESSERT_BASKET)).unwrap();
    engine.run_round().await;
    assert_eq!(engine.state().dishes.len(), 2);
    engine.eliminate(ChefProvider::OpenAi).unwrap();

    assert_eq!(engine.state().status, RoundStatus::Completed);
    assert_eq!(engine.winner(), Some(ChefProvider::Anthropic));
    assert_eq!(engine.state().eliminated.len(), 3);

    // The winner cooked in all three rounds.
    assert_eq!(engine.history(ChefProvider::Anthropic).len(), 3);
    assert_eq!(engine.history(ChefProvider::Xai).len(), 1);
}

#[tokio::test]
async fn test_pipelines_target_expected_models() {
    let service = Arc::new(MockGenerationService::with_default_text(dish_json(
        "Dish", "a dish",
    )));
    let mut engine = GameEngine::new(service.clone(), default_roster(), true);

    engine.submit_basket(labels(APPETIZER_BASKET)).unwrap();
    engine.run_round().await;

    let text_models: Vec<String> = service
        .text_calls()
        .into_iter()
        .map(|r| r.model_id)
        .collect();
    assert_eq!(text_models.len(), 4);
    assert!(text_models.contains(&"openai/gpt-5-nano".to_string()));
    assert!(text_models.contains(&"anthropic/claude-3-haiku".to_string()));

    // Every dish photo goes through the one forced image model.
    let image_calls = service.image_calls();
    assert_eq!(image_calls.len(), 4);
    assert!(image_calls.iter().all(|r| r.model_id == FORCED_IMAGE_MODEL));

    // Basket labels and round course reach the prompt text.
    let openai_call = service
        .text_calls()
        .into_iter()
        .find(|r| r.model_id == "openai/gpt-5-nano")
        .unwrap();
    let system = openai_call.system.unwrap();
    assert!(system.contains("Octopus"));
    assert!(system.contains("Appetizer"));
}

#[tokio::test]
async fn test_failed_text_step_makes_no_image_call() {
    let service = Arc::new(MockGenerationService::with_default_text(dish_json(
        "Dish", "a dish",
    )));
    service.script_text_error("google/gemini-2.5-flash-lite", "offline");
    let mut engine = GameEngine::new(service.clone(), default_roster(), true);

    engine.submit_basket(labels(APPETIZER_BASKET)).unwrap();
    engine.run_round().await;

    assert_eq!(engine.state().status, RoundStatus::Judging);
    assert_eq!(engine.loading()[&ChefProvider::Google], LoadingStatus::Error);
    // Only the three surviving text steps proceed to an image step.
    assert_eq!(service.image_calls().len(), 3);
}

#[tokio::test]
async fn test_portraits_target_portrait_model() {
    let service = Arc::new(MockGenerationService::with_default_text(intro_json(
        "N", "B",
    )));
    let mut engine = GameEngine::new(service.clone(), default_roster(), true);

    engine.generate_intros().unwrap();
    engine.run_intros().await;

    let image_calls = service.image_calls();
    assert_eq!(image_calls.len(), 4);
    assert!(image_calls
        .iter()
        .all(|r| r.model_id == PORTRAIT_IMAGE_MODEL));
}

#[tokio::test]
async fn test_remote_url_image_surfaces_as_plain_ref() {
    let service = MockGenerationService::with_default_text(dish_json("Dish", "a dish"));
    service.set_default_image(ImageResult::RemoteUrl(
        "https://img.example/dish.png".to_string(),
    ));
    let mut engine = GameEngine::new(Arc::new(service), default_roster(), true);

    engine.submit_basket(labels(APPETIZER_BASKET)).unwrap();
    engine.run_round().await;

    for chef in ChefProvider::all() {
        assert_eq!(
            engine.state().dishes[&chef].image_ref.as_deref(),
            Some("https://img.example/dish.png")
        );
    }
}
