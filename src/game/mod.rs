//! Round orchestration engine
//!
//! The engine owns all game state and a single event channel. Operator
//! actions are validated synchronously and either mutate state or are
//! rejected leaving it untouched; pipelines run as independent tasks and
//! report back only through [`PipelineEvent`]s, which the engine applies one
//! at a time. Round completion is a level-triggered check re-run after every
//! status change, not a counted barrier.

pub mod events;
mod intro;
pub mod state;
mod turn;

use crate::chef::{Chef, ChefProvider};
use crate::error::{Error, Result};
use crate::extract::FALLBACK_BIO;
use crate::game::events::PipelineEvent;
use crate::game::state::{Basket, Dish, LoadingStatus, RoundState, RoundStatus};
use crate::gateway::GenerationService;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Single-operator game engine: one instance per competition.
pub struct GameEngine {
    service: Arc<dyn GenerationService>,
    chefs: HashMap<ChefProvider, Chef>,
    roster: Vec<ChefProvider>,
    state: RoundState,
    loading: HashMap<ChefProvider, LoadingStatus>,
    intro_status: HashMap<ChefProvider, LoadingStatus>,
    history: HashMap<ChefProvider, Vec<Dish>>,
    use_personas: bool,
    tx: mpsc::UnboundedSender<PipelineEvent>,
    rx: mpsc::UnboundedReceiver<PipelineEvent>,
}

impl GameEngine {
    pub fn new(
        service: Arc<dyn GenerationService>,
        roster: Vec<Chef>,
        use_personas: bool,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let ids: Vec<ChefProvider> = roster.iter().map(|c| c.id).collect();
        let chefs: HashMap<ChefProvider, Chef> =
            roster.into_iter().map(|c| (c.id, c)).collect();
        Self {
            service,
            chefs,
            roster: ids.clone(),
            state: RoundState::new(ids),
            loading: HashMap::new(),
            intro_status: HashMap::new(),
            history: HashMap::new(),
            use_personas,
            tx,
            rx,
        }
    }

    // --- Read access -------------------------------------------------------

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn loading(&self) -> &HashMap<ChefProvider, LoadingStatus> {
        &self.loading
    }

    pub fn intro_status(&self) -> &HashMap<ChefProvider, LoadingStatus> {
        &self.intro_status
    }

    /// Chefs in roster order.
    pub fn chefs(&self) -> Vec<&Chef> {
        self.roster
            .iter()
            .filter_map(|id| self.chefs.get(id))
            .collect()
    }

    pub fn chef(&self, id: ChefProvider) -> Option<&Chef> {
        self.chefs.get(&id)
    }

    /// Append-only dish ledger for one chef, oldest round first.
    pub fn history(&self, id: ChefProvider) -> &[Dish] {
        self.history.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn winner(&self) -> Option<ChefProvider> {
        if self.state.status == RoundStatus::Completed {
            self.state.active.first().copied()
        } else {
            None
        }
    }

    fn intros_pending(&self) -> bool {
        self.intro_status
            .values()
            .any(|s| matches!(s, LoadingStatus::Text | LoadingStatus::Image))
    }

    // --- Operator actions --------------------------------------------------

    /// Kick off the one-time intro pipelines. Only valid before round 1.
    pub fn generate_intros(&mut self) -> Result<()> {
        if self.state.status != RoundStatus::Idle || self.state.round_number != 0 {
            return Err(Error::InvalidAction(
                "intros can only be generated before round 1".to_string(),
            ));
        }
        if !self.intro_status.is_empty() {
            return Err(Error::InvalidAction(
                "intros have already been generated".to_string(),
            ));
        }

        info!("generating intros for {} chefs", self.state.active.len());
        for id in self.state.active.clone() {
            let Some(chef) = self.chefs.get(&id).cloned() else {
                continue;
            };
            self.intro_status.insert(id, LoadingStatus::Text);
            tokio::spawn(intro::run_intro(
                self.service.clone(),
                chef,
                self.tx.clone(),
            ));
        }
        Ok(())
    }

    /// Validate a basket and start the next round: one concurrent turn
    /// pipeline per active chef.
    pub fn submit_basket(&mut self, labels: Vec<String>) -> Result<()> {
        if self.state.status != RoundStatus::Idle {
            return Err(Error::InvalidAction(format!(
                "cannot start a round while {:?}",
                self.state.status
            )));
        }
        if self.intros_pending() {
            return Err(Error::InvalidAction(
                "intros are still generating".to_string(),
            ));
        }
        let basket = Basket::new(labels)?;

        self.state.round_number += 1;
        self.state.status = RoundStatus::Working;
        self.state.basket = Some(basket.clone());
        self.state.dishes.clear();

        let round_number = self.state.round_number;
        info!(round = round_number, basket = ?basket.labels(), "round started");

        for id in self.state.active.clone() {
            let Some(chef) = self.chefs.get(&id).cloned() else {
                continue;
            };
            self.loading.insert(id, LoadingStatus::Text);
            tokio::spawn(turn::run_turn(
                self.service.clone(),
                chef,
                basket.clone(),
                round_number,
                self.use_personas,
                self.tx.clone(),
            ));
        }
        Ok(())
    }

    /// The chop: move one active chef to the eliminated list. Requires the
    /// round to be in judging; the status change to idle/completed is what
    /// guards against a second chop in the same round.
    pub fn eliminate(&mut self, chef: ChefProvider) -> Result<()> {
        match self.state.status {
            RoundStatus::Judging => {}
            RoundStatus::Working => {
                return Err(Error::InvalidAction(
                    "cannot eliminate while pipelines are still working".to_string(),
                ))
            }
            _ => {
                return Err(Error::InvalidAction(
                    "no elimination is available right now".to_string(),
                ))
            }
        }
        let Some(pos) = self.state.active.iter().position(|id| *id == chef) else {
            return Err(Error::InvalidAction(format!(
                "{chef} is not an active contestant"
            )));
        };

        self.state.active.remove(pos);
        self.state.eliminated.push(chef);
        info!(chef = %chef, round = self.state.round_number, "chopped");

        if self.state.active.len() == 1 {
            self.state.status = RoundStatus::Completed;
            info!(winner = %self.state.active[0], "competition complete");
        } else {
            self.state.status = RoundStatus::Idle;
            self.state.basket = None;
        }
        debug_assert!(self.state.partition_holds(self.roster.len()));
        Ok(())
    }

    // --- Event application -------------------------------------------------

    /// Apply one pipeline event. Stale turn events (from a superseded round)
    /// are dropped.
    pub fn apply_event(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::DishReady {
                chef,
                round_number,
                dish,
            } => {
                if round_number != self.state.round_number {
                    warn!(chef = %chef, round = round_number, "dropping stale dish event");
                    return;
                }
                self.state.dishes.insert(chef, dish);
                self.loading.insert(chef, LoadingStatus::Image);
            }
            PipelineEvent::DishImage {
                chef,
                round_number,
                image,
            } => {
                if round_number != self.state.round_number {
                    warn!(chef = %chef, round = round_number, "dropping stale image event");
                    return;
                }
                if let Some(dish) = self.state.dishes.get_mut(&chef) {
                    dish.image_ref = image.image_ref();
                }
                self.loading.insert(chef, LoadingStatus::Done);
                self.check_round_complete();
            }
            PipelineEvent::TurnFailed {
                chef,
                round_number,
                reason,
            } => {
                if round_number != self.state.round_number {
                    warn!(chef = %chef, round = round_number, "dropping stale failure event");
                    return;
                }
                warn!(chef = %chef, "turn failed: {reason}");
                self.loading.insert(chef, LoadingStatus::Error);
                self.check_round_complete();
            }
            PipelineEvent::IntroReady { chef, intro } => {
                if let Some(entry) = self.chefs.get_mut(&chef) {
                    entry.name = intro.name;
                    entry.bio = Some(intro.bio);
                }
                self.intro_status.insert(chef, LoadingStatus::Image);
            }
            PipelineEvent::IntroPortrait { chef, image } => {
                if let Some(entry) = self.chefs.get_mut(&chef) {
                    entry.portrait_ref = image.image_ref();
                }
                self.intro_status.insert(chef, LoadingStatus::Done);
            }
            PipelineEvent::IntroFailed { chef, reason } => {
                warn!(chef = %chef, "intro failed: {reason}");
                if let Some(entry) = self.chefs.get_mut(&chef) {
                    if entry.bio.is_none() {
                        entry.bio = Some(FALLBACK_BIO.to_string());
                    }
                }
                self.intro_status.insert(chef, LoadingStatus::Error);
            }
        }
    }

    /// Level-triggered round completion: fires the working → judging
    /// transition once every active chef has settled. Idempotent and
    /// side-effect-free when the condition is not met.
    fn check_round_complete(&mut self) {
        if self.state.status != RoundStatus::Working {
            return;
        }
        let all_settled = self.state.active.iter().all(|id| {
            self.loading
                .get(id)
                .map(LoadingStatus::is_terminal)
                .unwrap_or(false)
        });
        if !all_settled {
            return;
        }

        self.state.status = RoundStatus::Judging;
        for id in &self.state.active {
            if let Some(dish) = self.state.dishes.get(id) {
                self.history.entry(*id).or_default().push(dish.clone());
            }
        }
        info!(round = self.state.round_number, "all turns settled, judging");
    }

    // --- Drivers -----------------------------------------------------------

    /// Apply whatever events have already arrived without blocking. For
    /// callers that poll state between redraws instead of awaiting a driver.
    pub fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.apply_event(event);
        }
    }

    /// Drive the event loop until every intro pipeline has settled.
    pub async fn run_intros(&mut self) {
        while self.intros_pending() {
            match self.rx.recv().await {
                Some(event) => self.apply_event(event),
                None => break,
            }
        }
    }

    /// Drive the event loop until the round leaves `Working`.
    pub async fn run_round(&mut self) {
        while self.state.status == RoundStatus::Working {
            match self.rx.recv().await {
                Some(event) => self.apply_event(event),
                None => break,
            }
        }
    }
}
