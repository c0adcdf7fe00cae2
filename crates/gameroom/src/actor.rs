use super::arbiter::Arbiter;
use super::channel::Channel;
use super::event::Event;
use super::player::Player;
use gd_core::*;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Wrapper that runs a Player in its own async task.
///
/// - The table delivers a request event addressed to this seat when
///   input is needed
/// - The actor calls the player and submits the answer to the arbiter;
///   a player failure is logged and the driver's deadline default
///   covers the seat
/// - Public events arrive on the same inbox and are forwarded to
///   [`Player::notify`]
pub struct Actor {
    seat: Seat,
    player: Box<dyn Player>,
    channel: Channel<Event>,
    inputs: Arc<Arbiter>,
}

impl Actor {
    pub fn spawn(seat: Seat, player: Box<dyn Player>, inputs: Arc<Arbiter>) -> UnboundedSender<Event> {
        let channel = Channel::default();
        let sender = channel.tx().clone();
        let actor = Self {
            seat,
            player,
            inputs,
            channel,
        };
        tokio::spawn(actor.run());
        sender
    }
    async fn run(mut self) {
        loop {
            let Some(event) = self.channel.rx().recv().await else {
                break;
            };
            match event {
                Event::PlayRequest(ref request) if request.seat == self.seat => {
                    self.player.notify(&event).await;
                    match self.player.decide(request).await {
                        Ok(action) => {
                            log::debug!("[actor P{}] decided {}", self.seat, action);
                            if let Err(e) = self.inputs.submit_play(self.seat, action) {
                                log::warn!("[actor P{}] play rejected: {}", self.seat, e);
                            }
                        }
                        // no submission: the deadline default covers the seat
                        Err(e) => log::warn!("[actor P{}] no decision: {}", self.seat, e),
                    }
                    if self.gone() {
                        break;
                    }
                }
                Event::TributeRequest(ref request) if request.seat == self.seat => {
                    self.player.notify(&event).await;
                    match self.player.pick(request).await {
                        Ok(card) => {
                            if let Err(e) = self.inputs.submit_pick(self.seat, card) {
                                log::warn!("[actor P{}] pool pick rejected: {}", self.seat, e);
                            }
                        }
                        Err(e) => log::warn!("[actor P{}] no pool pick: {}", self.seat, e),
                    }
                    if self.gone() {
                        break;
                    }
                }
                Event::ReturnRequest(ref request) if request.seat == self.seat => {
                    self.player.notify(&event).await;
                    match self.player.give_back(request).await {
                        Ok(card) => {
                            if let Err(e) = self.inputs.submit_back(self.seat, card) {
                                log::warn!("[actor P{}] return rejected: {}", self.seat, e);
                            }
                        }
                        Err(e) => log::warn!("[actor P{}] no return: {}", self.seat, e),
                    }
                    if self.gone() {
                        break;
                    }
                }
                ref event => self.player.notify(event).await,
            }
        }
    }
    fn gone(&self) -> bool {
        if self.player.alive() {
            return false;
        }
        log::info!("[actor P{}] player disconnected", self.seat);
        self.inputs.disconnect(self.seat);
        true
    }
}
