//! # Chopped
//!
//! A Chopped-style cooking competition driven by AI contestants. Four chefs,
//! each bound to a different provider's models, receive the same basket of
//! 4 mystery ingredients per round and present a dish (title, monologue,
//! image); a human operator chops one chef per round until a winner remains.
//!
//! ## Modules
//!
//! - `chef` - Contestant roster and model tables
//! - `extract` - Resilient extraction of structured records from model output
//! - `game` - Round state machine, turn/intro pipelines, operator actions
//! - `gateway` - Generation service abstraction and the AI gateway client
//! - `ingredients` - Ingredient catalog and random basket drawing
//! - `prompts` - Persona and course-aware prompt construction
//! - `rate_limit` - Bounded per-identifier rate limiting with injected clock
//! - `testing` - Scripted mock generation service for tests
pub mod chef;
pub mod error;
pub mod extract;
pub mod game;
pub mod gateway;
pub mod ingredients;
pub mod prompts;
pub mod rate_limit;

pub mod testing;
