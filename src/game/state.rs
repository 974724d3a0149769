//! Round state definitions and invariants

use crate::chef::ChefProvider;
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;

/// The four mystery ingredients for a round. Always exactly 4 distinct,
/// non-empty labels; enforced at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Basket(Vec<String>);

impl Basket {
    pub fn new(labels: Vec<String>) -> Result<Self> {
        let trimmed: Vec<String> = labels
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if trimmed.len() != 4 {
            return Err(Error::InvalidBasket(format!(
                "a basket needs exactly 4 ingredients, got {}",
                trimmed.len()
            )));
        }
        for (i, label) in trimmed.iter().enumerate() {
            if trimmed[..i].contains(label) {
                return Err(Error::InvalidBasket(format!(
                    "duplicate ingredient: {label}"
                )));
            }
        }
        Ok(Self(trimmed))
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }
}

/// Round progression status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Idle,
    Working,
    Judging,
    Completed,
}

/// Ephemeral per-chef progress within a round (or within intro generation).
/// Never persisted; exists to drive completion detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingStatus {
    Idle,
    Text,
    Image,
    Done,
    Error,
}

impl LoadingStatus {
    /// Done and Error both count as settled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadingStatus::Done | LoadingStatus::Error)
    }
}

/// One chef's dish for one round. Created when the text step resolves, image
/// set at most once afterwards, immutable beyond that.
#[derive(Debug, Clone, Serialize)]
pub struct Dish {
    pub round_number: u32,
    pub chef_id: ChefProvider,
    pub title: String,
    pub narrative: String,
    pub ingredients_used: Vec<String>,
    pub image_ref: Option<String>,
}

/// Full snapshot of the competition exposed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct RoundState {
    pub round_number: u32,
    pub status: RoundStatus,
    pub basket: Option<Basket>,
    pub dishes: HashMap<ChefProvider, Dish>,
    pub eliminated: Vec<ChefProvider>,
    pub active: Vec<ChefProvider>,
}

impl RoundState {
    pub fn new(roster: Vec<ChefProvider>) -> Self {
        Self {
            round_number: 0,
            status: RoundStatus::Idle,
            basket: None,
            dishes: HashMap::new(),
            eliminated: Vec::new(),
            active: roster,
        }
    }

    /// Active and eliminated partition the original roster: together they
    /// cover it, and they never overlap.
    pub fn partition_holds(&self, roster_size: usize) -> bool {
        self.active.len() + self.eliminated.len() == roster_size
            && self.active.iter().all(|id| !self.eliminated.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basket_requires_exactly_four() {
        assert!(Basket::new(vec!["a".into(), "b".into(), "c".into()]).is_err());
        assert!(Basket::new(vec![
            "a".into(),
            "b".into(),
            "c".into(),
            "d".into(),
            "e".into()
        ])
        .is_err());
        assert!(Basket::new(vec!["a".into(), "b".into(), "c".into(), "d".into()]).is_ok());
    }

    #[test]
    fn test_basket_rejects_blank_and_duplicate_labels() {
        assert!(Basket::new(vec!["a".into(), "  ".into(), "c".into(), "d".into()]).is_err());
        assert!(Basket::new(vec!["a".into(), "a".into(), "c".into(), "d".into()]).is_err());
        // Whitespace-padded duplicates collapse to the same label.
        assert!(Basket::new(vec![" a ".into(), "a".into(), "c".into(), "d".into()]).is_err());
    }

    #[test]
    fn test_loading_status_terminality() {
        assert!(LoadingStatus::Done.is_terminal());
        assert!(LoadingStatus::Error.is_terminal());
        assert!(!LoadingStatus::Idle.is_terminal());
        assert!(!LoadingStatus::Text.is_terminal());
        assert!(!LoadingStatus::Image.is_terminal());
    }

    #[test]
    fn test_partition_invariant_helper() {
        use crate::chef::ChefProvider;
        let mut state = RoundState::new(ChefProvider::all().to_vec());
        assert!(state.partition_holds(4));
        state.eliminated.push(state.active.remove(0));
        assert!(state.partition_holds(4));
        state.active.push(state.eliminated[0]);
        assert!(!state.partition_holds(4));
    }
}
