//! Heuristic player used for vacated and computer-controlled seats.
use crate::event::Event;
use crate::event::PlayRequest;
use crate::event::ReturnRequest;
use crate::event::TributeRequest;
use crate::player::Player;
use gd_cards::Card;
use gd_gameplay::Action;
use gd_gameplay::GameError;
use gd_gameplay::heuristic;

/// Always-legal bot backed by the autoplay heuristic.
#[derive(Debug, Default)]
pub struct Robot;

impl Robot {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Player for Robot {
    async fn decide(&mut self, request: &PlayRequest) -> Result<Action, GameError> {
        Ok(heuristic::select_play(
            &request.hand,
            request.lead.as_ref(),
            request.level,
        ))
    }
    async fn pick(&mut self, request: &TributeRequest) -> Result<Card, GameError> {
        heuristic::select_tribute(&request.pool, request.level)
            .ok_or_else(|| GameError::InternalInvariant("empty tribute pool".into()))
    }
    async fn give_back(&mut self, request: &ReturnRequest) -> Result<Card, GameError> {
        heuristic::select_return(&request.hand, request.level)
            .ok_or_else(|| GameError::InternalInvariant("empty hand at return".into()))
    }
    async fn notify(&mut self, _: &Event) {}
}
