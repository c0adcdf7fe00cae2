//! Deterministic player driven by a canned script, for driver tests.
use crate::event::Event;
use crate::event::PlayRequest;
use crate::event::ReturnRequest;
use crate::event::TributeRequest;
use crate::player::Player;
use gd_cards::Card;
use gd_gameplay::Action;
use gd_gameplay::GameError;
use gd_gameplay::heuristic;
use std::collections::VecDeque;

/// Plays queued answers in order, falling back to the heuristic when
/// the script runs dry.
#[derive(Debug, Default)]
pub struct Scripted {
    plays: VecDeque<Action>,
    picks: VecDeque<Card>,
    returns: VecDeque<Card>,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn play(mut self, action: Action) -> Self {
        self.plays.push_back(action);
        self
    }
    pub fn pick_card(mut self, card: Card) -> Self {
        self.picks.push_back(card);
        self
    }
    pub fn return_card(mut self, card: Card) -> Self {
        self.returns.push_back(card);
        self
    }
}

#[async_trait::async_trait]
impl Player for Scripted {
    async fn decide(&mut self, request: &PlayRequest) -> Result<Action, GameError> {
        Ok(self.plays.pop_front().unwrap_or_else(|| {
            heuristic::select_play(&request.hand, request.lead.as_ref(), request.level)
        }))
    }
    async fn pick(&mut self, request: &TributeRequest) -> Result<Card, GameError> {
        match self.picks.pop_front() {
            Some(card) => Ok(card),
            None => heuristic::select_tribute(&request.pool, request.level)
                .ok_or_else(|| GameError::InternalInvariant("empty tribute pool".into())),
        }
    }
    async fn give_back(&mut self, request: &ReturnRequest) -> Result<Card, GameError> {
        match self.returns.pop_front() {
            Some(card) => Ok(card),
            None => heuristic::select_return(&request.hand, request.level)
                .ok_or_else(|| GameError::InternalInvariant("empty hand at return".into())),
        }
    }
    async fn notify(&mut self, _: &Event) {}
}
