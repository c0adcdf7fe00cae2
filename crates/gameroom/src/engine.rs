use super::actor::Actor;
use super::arbiter::Arbiter;
use super::arbiter::Outcome;
use super::arbiter::Shared;
use super::bus::Bus;
use super::config::RoomConfig;
use super::event::Event;
use super::event::PlayRequest;
use super::event::ReturnRequest;
use super::event::TributeRequest;
use super::player::Player;
use super::table::Table;
use super::timer::Timer;
use super::timer::unix_deadline_ms;
use gd_cards::Card;
use gd_cards::Combo;
use gd_cards::Rank;
use gd_core::*;
use gd_gameplay::Action;
use gd_gameplay::DealStatus;
use gd_gameplay::GameError;
use gd_gameplay::Match;
use gd_gameplay::PlayerView;
use gd_gameplay::TributeStatus;
use gd_gameplay::TrickStatus;
use gd_gameplay::VictoryType;
use gd_gameplay::heuristic;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use tokio::time::Instant;

/// Phase: accepting players before the match starts.
pub struct Seating;
/// Phase: match in progress.
pub struct Playing;
/// Phase: match over.
pub struct Finished;

fn lock_read(shared: &Shared) -> Result<RwLockReadGuard<'_, Match>, GameError> {
    shared
        .read()
        .map_err(|_| GameError::InternalInvariant("state lock poisoned".into()))
}
fn lock_write(shared: &Shared) -> Result<RwLockWriteGuard<'_, Match>, GameError> {
    shared
        .write()
        .map_err(|_| GameError::InternalInvariant("state lock poisoned".into()))
}

/// Single-threaded match driver.
///
/// All state mutations run on this control flow under the match write
/// lock; events are emitted inside the same critical section, so
/// observers see them in mutation order. The driver suspends only at
/// the three arbitration points (play, pool pick, return) and never
/// holds the lock across a suspension.
///
/// Uses the typestate pattern to encode phase transitions at compile
/// time.
pub struct Engine<Phase> {
    shared: Shared,
    bus: Arc<Bus>,
    inputs: Arc<Arbiter>,
    table: Table,
    config: RoomConfig,
    timer: Timer,
    seed: u64,
    begun: Instant,
    phase: PhantomData<Phase>,
}

impl Engine<Seating> {
    pub fn new(shared: Shared, bus: Arc<Bus>, inputs: Arc<Arbiter>, config: RoomConfig) -> Self {
        Self {
            shared,
            bus,
            inputs,
            table: Table::default(),
            timer: Timer::new(config.timers),
            seed: config.rng_seed.unwrap_or_else(rand::random),
            config,
            begun: Instant::now(),
            phase: PhantomData,
        }
    }
    /// Seats a player: spawns its actor task and wires it to the table.
    pub fn sit(&mut self, seat: Seat, player: Box<dyn Player>) {
        let sender = Actor::spawn(seat, player, self.inputs.clone());
        self.table.sit(seat, sender);
    }
    /// Transition to the Playing phase.
    pub fn start(self) -> Engine<Playing> {
        Engine {
            shared: self.shared,
            bus: self.bus,
            inputs: self.inputs,
            table: self.table,
            config: self.config,
            timer: self.timer,
            seed: self.seed,
            begun: Instant::now(),
            phase: PhantomData,
        }
    }
}

impl Engine<Playing> {
    /// Drives the match to its end and transitions to Finished.
    pub async fn run(mut self) -> Engine<Finished> {
        match self.drive().await {
            Ok(()) => log::info!("[engine] match complete"),
            Err(error) => {
                log::warn!("[engine] match stopped: {}", error);
                if let Ok(mut game) = lock_write(&self.shared) {
                    game.abort();
                    self.publish(Event::MatchEnded {
                        winner: None,
                        aborted: true,
                    });
                }
            }
        }
        Engine {
            shared: self.shared,
            bus: self.bus,
            inputs: self.inputs,
            table: self.table,
            config: self.config,
            timer: self.timer,
            seed: self.seed,
            begun: self.begun,
            phase: PhantomData,
        }
    }

    async fn drive(&mut self) -> Result<(), GameError> {
        {
            let mut game = lock_write(&self.shared)?;
            game.begin()?;
            let usernames: [String; N] =
                std::array::from_fn(|s| game.participant(s).username.clone());
            self.publish(Event::MatchStarted {
                usernames,
                levels: game.levels().map(u8::from),
            });
        }
        loop {
            self.start_deal()?;
            self.run_tribute().await?;
            self.run_tricks().await?;
            if self.finish_deal()? {
                return Ok(());
            }
            if let Some(cap) = self.config.max_match_duration {
                if self.begun.elapsed() >= cap {
                    log::warn!("[engine] match duration cap reached");
                    return Err(GameError::Cancelled);
                }
            }
        }
    }

    /// Shuffle, deal, announce, and set up the tribute phase when a
    /// previous result exists.
    fn start_deal(&mut self) -> Result<(), GameError> {
        let mut game = lock_write(&self.shared)?;
        let number = game.deal_index();
        let seed = self.seed.wrapping_add(number as u64);
        let (level, counts, tribute) = {
            let deal = game.start_deal()?;
            deal.deal_cards(seed)?;
            let counts: [usize; N] = std::array::from_fn(|s| deal.hand(s).len());
            let tribute = deal.prior().is_some();
            (deal.level(), counts, tribute)
        };
        log::info!("[engine] deal #{} at level {}", number, level);
        self.publish(Event::DealStarted { number, level });
        self.publish(Event::CardsDealt { counts });
        if tribute {
            let (victory, map) = {
                let deal = game.deal_mut().ok_or(GameError::WrongPhase)?;
                let phase = deal.begin_tribute()?;
                let map = phase
                    .map()
                    .iter()
                    .map(|&(payer, to)| (payer, to.map(|s| s as i8).unwrap_or(-1)))
                    .collect();
                (phase.victory(), map)
            };
            self.publish(Event::TributeRulesSet { victory, map });
            self.publish(Event::TributePhase {
                status: TributeStatus::Waiting,
            });
        }
        self.push_views(&game);
        Ok(())
    }

    /// Runs the tribute phase: immunity short-circuit, the deterministic
    /// contributions, the pool pick, and the returns.
    async fn run_tribute(&mut self) -> Result<(), GameError> {
        enum Plan {
            Skip,
            Immune(Team),
            Run {
                victory: VictoryType,
                first: Seat,
                level: Rank,
            },
        }
        let plan = {
            let game = lock_read(&self.shared)?;
            let deal = game.deal().ok_or(GameError::WrongPhase)?;
            match (deal.tribute(), deal.prior()) {
                (None, _) => Plan::Skip,
                (Some(phase), Some(prior)) if phase.is_immune() => {
                    Plan::Immune(prior.losing_team())
                }
                (Some(phase), Some(prior)) => Plan::Run {
                    victory: phase.victory(),
                    first: prior.place(1),
                    level: deal.level(),
                },
                (Some(_), None) => {
                    return Err(GameError::InternalInvariant(
                        "tribute without a prior result".into(),
                    ));
                }
            }
        };
        match plan {
            Plan::Skip => Ok(()),
            Plan::Immune(team) => {
                let mut game = lock_write(&self.shared)?;
                game.deal_mut()
                    .ok_or(GameError::WrongPhase)?
                    .finish_tribute()?;
                self.publish(Event::TributeImmunity { team });
                self.publish(Event::TributePhase {
                    status: TributeStatus::Finished,
                });
                self.push_views(&game);
                Ok(())
            }
            Plan::Run {
                victory,
                first,
                level,
            } => {
                let pool = {
                    let mut game = lock_write(&self.shared)?;
                    let (status, pool, given) = {
                        let deal = game.deal_mut().ok_or(GameError::WrongPhase)?;
                        let phase = deal.tribute_mut()?;
                        let status = phase.begin(first)?;
                        let pool = phase.pool().to_vec();
                        let given = phase
                            .map()
                            .first()
                            .copied()
                            .and_then(|(payer, to)| to.map(|to| (payer, to)))
                            .zip(phase.contributions().first().map(|&(_, card)| card));
                        (status, pool, given)
                    };
                    self.publish(Event::TributeStarted);
                    match victory {
                        VictoryType::DoubleDown => {
                            self.publish(Event::TributePoolCreated { pool: pool.clone() });
                        }
                        _ => {
                            if let Some(((from, to), card)) = given {
                                self.publish(Event::TributeGiven { from, to, card });
                            }
                        }
                    }
                    self.publish(Event::TributePhase { status });
                    self.push_views(&game);
                    pool
                };
                if victory == VictoryType::DoubleDown {
                    let options: Vec<Card> = pool.iter().map(|&(_, card)| card).collect();
                    let pick = self.request_pick(first, options, level).await?;
                    let mut game = lock_write(&self.shared)?;
                    let picks = {
                        let deal = game.deal_mut().ok_or(GameError::WrongPhase)?;
                        deal.tribute_mut()?.select(first, pick)?
                    };
                    for (seat, donor, card) in picks {
                        self.publish(Event::TributeSelected { seat, donor, card });
                    }
                    self.publish(Event::TributePhase {
                        status: TributeStatus::Returning,
                    });
                    self.push_views(&game);
                }
                loop {
                    let next = {
                        let game = lock_read(&self.shared)?;
                        let deal = game.deal().ok_or(GameError::WrongPhase)?;
                        let phase = deal.tribute().ok_or(GameError::WrongPhase)?;
                        match phase.outstanding_returns().first().copied() {
                            Some((returner, _)) => Some((returner, deal.hand(returner).to_vec())),
                            None => None,
                        }
                    };
                    let Some((returner, hand)) = next else { break };
                    let card = self.request_return(returner, hand, level).await?;
                    let mut game = lock_write(&self.shared)?;
                    let to = {
                        let deal = game.deal_mut().ok_or(GameError::WrongPhase)?;
                        deal.give_return(returner, card)?
                    };
                    self.publish(Event::ReturnTribute {
                        from: returner,
                        to,
                        card,
                    });
                }
                let mut game = lock_write(&self.shared)?;
                game.deal_mut()
                    .ok_or(GameError::WrongPhase)?
                    .finish_tribute()?;
                self.publish(Event::TributeCompleted);
                self.publish(Event::TributePhase {
                    status: TributeStatus::Finished,
                });
                self.push_views(&game);
                Ok(())
            }
        }
    }

    /// Plays tricks until the deal finishes.
    async fn run_tricks(&mut self) -> Result<(), GameError> {
        enum Step {
            Begin,
            Start(Seat),
            Turn(Seat),
            Done,
        }
        loop {
            if self.inputs.is_cancelled() {
                return Err(GameError::Cancelled);
            }
            self.drain_connections()?;
            let step = {
                let game = lock_read(&self.shared)?;
                let deal = game.deal().ok_or(GameError::WrongPhase)?;
                match deal.status() {
                    DealStatus::Finished => Step::Done,
                    DealStatus::Dealing | DealStatus::Tribute => Step::Begin,
                    DealStatus::Playing => {
                        let trick = deal.trick().ok_or_else(|| {
                            GameError::InternalInvariant("playing deal without a trick".into())
                        })?;
                        match trick.status() {
                            TrickStatus::Waiting => Step::Start(trick.leader()),
                            _ => Step::Turn(trick.turn()),
                        }
                    }
                    DealStatus::Waiting => {
                        return Err(GameError::InternalInvariant("undealt deal".into()));
                    }
                }
            };
            match step {
                Step::Done => return Ok(()),
                Step::Begin => {
                    let mut game = lock_write(&self.shared)?;
                    let deal = game.deal_mut().ok_or(GameError::WrongPhase)?;
                    let leader = deal.first_leader();
                    deal.begin_play(leader)?;
                }
                Step::Start(leader) => {
                    let mut game = lock_write(&self.shared)?;
                    game.deal_mut().ok_or(GameError::WrongPhase)?.start_trick()?;
                    self.publish(Event::TrickStarted { leader });
                    self.push_views(&game);
                }
                Step::Turn(seat) => {
                    let action = self.request_play(seat).await?;
                    self.apply(seat, action)?;
                }
            }
        }
    }

    /// Requests one play decision, resolving autoplay, timeouts, and
    /// disconnects to a concrete action.
    async fn request_play(&mut self, seat: Seat) -> Result<Action, GameError> {
        let (auto, hand, high, level) = {
            let game = lock_read(&self.shared)?;
            let deal = game.deal().ok_or(GameError::WrongPhase)?;
            let trick = deal.trick().ok_or(GameError::WrongPhase)?;
            (
                game.participant(seat).auto_play,
                deal.hand(seat).to_vec(),
                trick.high().map(|(_, combo)| combo),
                deal.level(),
            )
        };
        if auto {
            return Ok(heuristic::select_play(&hand, high.as_ref(), level));
        }
        let deadline = self.timer.start_decision();
        let deadline_ms = unix_deadline_ms(self.config.timers.decision);
        {
            let mut game = lock_write(&self.shared)?;
            if let Some(trick) = game.deal_mut().and_then(|d| d.trick_mut()) {
                trick.set_deadline_ms(Some(deadline_ms));
            }
        }
        let pending = self.inputs.open_play(seat);
        self.table.deliver(Event::PlayRequest(PlayRequest {
            seat,
            hand: hand.clone(),
            lead: high,
            level,
            deadline_ms,
        }));
        let outcome = self.inputs.wait_play(seat, pending, deadline).await;
        self.timer.clear();
        {
            let mut game = lock_write(&self.shared)?;
            if let Some(trick) = game.deal_mut().and_then(|d| d.trick_mut()) {
                trick.set_deadline_ms(None);
            }
        }
        match outcome {
            Outcome::Input(action) => {
                self.table.clear_strikes(seat);
                Ok(action)
            }
            Outcome::TimedOut => {
                self.strike(seat)?;
                Ok(default_play(&hand, high.as_ref(), level))
            }
            Outcome::Disconnected => {
                self.mark_disconnect(seat)?;
                Ok(default_play(&hand, high.as_ref(), level))
            }
            Outcome::Cancelled => Err(GameError::Cancelled),
        }
    }

    async fn request_pick(
        &mut self,
        seat: Seat,
        pool: Vec<Card>,
        level: Rank,
    ) -> Result<Card, GameError> {
        let fallback = || {
            heuristic::select_tribute(&pool, level)
                .ok_or_else(|| GameError::InternalInvariant("empty tribute pool".into()))
        };
        let auto = lock_read(&self.shared)?.participant(seat).auto_play;
        if auto {
            return fallback();
        }
        let deadline = self.timer.start_selection();
        let deadline_ms = unix_deadline_ms(self.config.timers.selection);
        let pending = self.inputs.open_pick(seat);
        self.table.deliver(Event::TributeRequest(TributeRequest {
            seat,
            pool: pool.clone(),
            level,
            deadline_ms,
        }));
        let outcome = self.inputs.wait_pick(seat, pending, deadline).await;
        self.timer.clear();
        match outcome {
            Outcome::Input(card) => {
                self.table.clear_strikes(seat);
                Ok(card)
            }
            Outcome::TimedOut => {
                self.strike(seat)?;
                fallback()
            }
            Outcome::Disconnected => {
                self.mark_disconnect(seat)?;
                fallback()
            }
            Outcome::Cancelled => Err(GameError::Cancelled),
        }
    }

    async fn request_return(
        &mut self,
        seat: Seat,
        hand: Vec<Card>,
        level: Rank,
    ) -> Result<Card, GameError> {
        let fallback = || {
            heuristic::select_return(&hand, level)
                .ok_or_else(|| GameError::InternalInvariant("empty hand at return".into()))
        };
        let auto = lock_read(&self.shared)?.participant(seat).auto_play;
        if auto {
            return fallback();
        }
        let deadline = self.timer.start_returning();
        let deadline_ms = unix_deadline_ms(self.config.timers.returning);
        let pending = self.inputs.open_back(seat);
        self.table.deliver(Event::ReturnRequest(ReturnRequest {
            seat,
            hand: hand.clone(),
            level,
            deadline_ms,
        }));
        let outcome = self.inputs.wait_back(seat, pending, deadline).await;
        self.timer.clear();
        match outcome {
            Outcome::Input(card) => {
                self.table.clear_strikes(seat);
                Ok(card)
            }
            Outcome::TimedOut => {
                self.strike(seat)?;
                fallback()
            }
            Outcome::Disconnected => {
                self.mark_disconnect(seat)?;
                fallback()
            }
            Outcome::Cancelled => Err(GameError::Cancelled),
        }
    }

    /// Applies a resolved decision, emitting play/pass, trick and deal
    /// transitions inside one critical section.
    fn apply(&mut self, seat: Seat, action: Action) -> Result<(), GameError> {
        let mut game = lock_write(&self.shared)?;
        {
            let deal = game.deal_mut().ok_or(GameError::WrongPhase)?;
            match action {
                Action::Pass => {
                    let finished = deal.pass(seat)?;
                    self.publish(Event::PlayerPassed { seat });
                    if finished {
                        let (winner, next_leader) = crowned(deal.trick())?;
                        self.publish(Event::TrickEnded {
                            winner,
                            next_leader,
                        });
                        deal.rotate_trick()?;
                    }
                }
                Action::Play(cards) => {
                    let outcome = deal.play(seat, cards.clone())?;
                    self.publish(Event::PlayerPlayed {
                        seat,
                        cards,
                        combo: outcome.combo,
                    });
                    if outcome.trick_finished {
                        let trick = if outcome.deal_finished {
                            deal.history().last()
                        } else {
                            deal.trick()
                        };
                        let (winner, next_leader) = crowned(trick)?;
                        self.publish(Event::TrickEnded {
                            winner,
                            next_leader,
                        });
                        if !outcome.deal_finished {
                            deal.rotate_trick()?;
                        }
                    }
                }
            }
        }
        self.push_views(&game);
        Ok(())
    }

    /// Concludes the deal, applies level progression, and emits the
    /// match end when a team won from level A. Returns true when the
    /// match is over.
    fn finish_deal(&mut self) -> Result<bool, GameError> {
        let mut game = lock_write(&self.shared)?;
        let (result, over) = game.conclude_deal()?;
        self.publish(Event::DealEnded { result });
        self.push_views(&game);
        if over {
            self.publish(Event::MatchEnded {
                winner: game.winner(),
                aborted: false,
            });
        }
        Ok(over)
    }

    /// Two consecutive timeouts switch the seat to autoplay.
    fn strike(&mut self, seat: Seat) -> Result<(), GameError> {
        let strikes = self.table.strike(seat);
        let mut game = lock_write(&self.shared)?;
        if strikes >= self.config.autoplay_after {
            game.set_auto_play(seat, true);
            log::info!("[engine] P{} switched to autoplay", seat);
        }
        self.publish(Event::PlayerTimeout { seat });
        Ok(())
    }

    fn mark_disconnect(&mut self, seat: Seat) -> Result<(), GameError> {
        let mut game = lock_write(&self.shared)?;
        if game.participant(seat).online {
            game.set_online(seat, false);
            game.set_auto_play(seat, true);
            self.table.disconnect(seat);
            self.publish(Event::PlayerDisconnect { seat });
        }
        Ok(())
    }

    /// Applies queued connection changes from the arbiter.
    fn drain_connections(&mut self) -> Result<(), GameError> {
        let gone = self.inputs.drain_disconnects();
        let back = self.inputs.drain_reconnects();
        if gone.is_empty() && back.is_empty() {
            return Ok(());
        }
        for seat in gone {
            self.mark_disconnect(seat)?;
        }
        let mut game = lock_write(&self.shared)?;
        for seat in back {
            if !game.participant(seat).online {
                game.set_online(seat, true);
                game.set_auto_play(seat, false);
                self.table.reconnect(seat);
                self.publish(Event::PlayerReconnect { seat });
            }
        }
        Ok(())
    }

    fn publish(&self, event: Event) {
        if event.is_public() {
            self.bus.emit(&event);
        }
        self.table.deliver(event);
    }

    fn push_views(&self, game: &Match) {
        for seat in 0..N {
            self.table
                .deliver(Event::StateSync(PlayerView::project(game, seat)));
        }
    }
}

impl Engine<Finished> {
    /// Winning team, if the match ended normally.
    pub fn winner(&self) -> Option<Team> {
        lock_read(&self.shared).ok().and_then(|game| game.winner())
    }
}

/// Winner and next leader of a finished trick.
fn crowned(trick: Option<&gd_gameplay::Trick>) -> Result<(Seat, Seat), GameError> {
    let trick = trick.ok_or_else(|| {
        GameError::InternalInvariant("finished trick missing".into())
    })?;
    let winner = trick
        .winner()
        .ok_or_else(|| GameError::InternalInvariant("finished trick without winner".into()))?;
    let next_leader = trick
        .next_leader()
        .ok_or_else(|| GameError::InternalInvariant("finished trick without next leader".into()))?;
    Ok((winner, next_leader))
}

/// Timeout default: pass when following, smallest single on the lead.
fn default_play(hand: &[Card], high: Option<&Combo>, level: Rank) -> Action {
    match high {
        Some(_) => Action::Pass,
        None => heuristic::smallest_single(hand, level)
            .map(Action::Play)
            .unwrap_or(Action::Pass),
    }
}
