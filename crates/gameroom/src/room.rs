use super::arbiter::Arbiter;
use super::arbiter::Shared;
use super::bus::Bus;
use super::bus::Observer;
use super::config::RoomConfig;
use super::engine::Engine;
use super::engine::Seating;
use super::player::Player;
use super::protocol::Protocol;
use gd_core::*;
use gd_gameplay::Action;
use gd_gameplay::DealResult;
use gd_gameplay::DealStatus;
use gd_gameplay::DealView;
use gd_gameplay::GameError;
use gd_gameplay::Match;
use gd_gameplay::MatchStatus;
use gd_gameplay::PlayerView;
use serde::Serialize;
use std::sync::Arc;
use std::sync::RwLock;

/// Live match coordinator: imperative shell that owns the engine
/// (functional core), the observer bus, and the input arbitration, and
/// hands out read-only query handles.
pub struct Room {
    id: ID<Self>,
    shared: Shared,
    inputs: Arc<Arbiter>,
    engine: Engine<Seating>,
}

impl Room {
    pub fn new(
        usernames: [String; N],
        config: RoomConfig,
        observers: Vec<Box<dyn Observer>>,
    ) -> Self {
        let shared: Shared = Arc::new(RwLock::new(Match::new(usernames)));
        let bus = Arc::new(Bus::new(observers));
        let inputs = Arc::new(Arbiter::new(shared.clone()));
        let engine = Engine::new(shared.clone(), bus, inputs.clone(), config);
        Self {
            id: ID::default(),
            shared,
            inputs,
            engine,
        }
    }
    /// Seats a player implementation.
    pub fn sit<P>(&mut self, seat: Seat, player: P)
    where
        P: Player + 'static,
    {
        self.engine.sit(seat, Box::new(player));
    }
    /// Query and submission facade for transports and tooling.
    pub fn handle(&self) -> RoomHandle {
        RoomHandle {
            shared: self.shared.clone(),
            inputs: self.inputs.clone(),
        }
    }
    /// Runs the match: waits for the start signal, drives the engine to
    /// the end, then reports on the done channel.
    pub async fn run(
        self,
        start: tokio::sync::oneshot::Receiver<()>,
        done: tokio::sync::oneshot::Sender<()>,
    ) {
        log::debug!("[room {}] waiting for start", self.id);
        let _ = start.await;
        log::debug!("[room {}] starting match", self.id);
        let finished = self.engine.start().run().await;
        match finished.winner() {
            Some(team) => log::info!("[room {}] team {} wins", self.id, team),
            None => log::info!("[room {}] match ended without a winner", self.id),
        }
        let _ = done.send(());
    }
}

impl Unique for Room {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

/// Full public state of a match, for operators and tests.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub status: String,
    pub levels: [u8; TEAMS],
    /// Winning team, -1 while undecided.
    pub winner: i8,
    pub history: Vec<DealResult>,
    pub deal: Option<DealView>,
}

/// Cloneable facade over a running room: submissions, projections, and
/// lifecycle controls. Readers take a shared lock; the driver keeps the
/// exclusive lock for mutations.
#[derive(Clone)]
pub struct RoomHandle {
    shared: Shared,
    inputs: Arc<Arbiter>,
}

impl RoomHandle {
    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Match>, GameError> {
        self.shared
            .read()
            .map_err(|_| GameError::InternalInvariant("state lock poisoned".into()))
    }
    /// Submits a play: `pass` or whitespace-separated card ids.
    pub fn submit_play(&self, seat: Seat, input: &str) -> Result<(), GameError> {
        self.inputs.submit_play(seat, Protocol::decode_action(input)?)
    }
    pub fn submit_pass(&self, seat: Seat) -> Result<(), GameError> {
        self.inputs.submit_play(seat, Action::Pass)
    }
    /// Submits a tribute pool pick by card id.
    pub fn submit_tribute(&self, seat: Seat, card: &str) -> Result<(), GameError> {
        self.inputs.submit_pick(seat, Protocol::decode_card(card)?)
    }
    /// Submits a tribute return by card id.
    pub fn submit_return(&self, seat: Seat, card: &str) -> Result<(), GameError> {
        self.inputs.submit_back(seat, Protocol::decode_card(card)?)
    }
    /// The per-seat projection of the current state.
    pub fn player_view(&self, seat: Seat) -> Result<PlayerView, GameError> {
        Ok(PlayerView::project(&*self.read()?, seat))
    }
    /// The public match state.
    pub fn game_state(&self) -> Result<MatchSummary, GameError> {
        let game = self.read()?;
        Ok(MatchSummary {
            status: match game.status() {
                MatchStatus::Waiting => "waiting".into(),
                MatchStatus::Playing => "playing".into(),
                MatchStatus::Finished => "finished".into(),
            },
            levels: game.levels().map(u8::from),
            winner: game.winner().map(|t| t as i8).unwrap_or(-1),
            history: game.history().to_vec(),
            deal: game.deal().map(DealView::project),
        })
    }
    /// Status of the deal in progress, if any.
    pub fn deal_status(&self) -> Result<Option<DealStatus>, GameError> {
        Ok(self.read()?.deal().map(|d| d.status()))
    }
    /// Marks a seat disconnected: any pending request resolves with its
    /// default and the seat switches to autoplay.
    pub fn disconnect(&self, seat: Seat) {
        self.inputs.disconnect(seat);
    }
    /// Brings a seat back under player control.
    pub fn reconnect(&self, seat: Seat) {
        self.inputs.reconnect(seat);
    }
    /// Stops the match; pending requests resolve with `Cancelled` and
    /// the driver exits cleanly.
    pub fn cancel(&self) {
        self.inputs.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Collector;
    use crate::event::Event;
    use crate::players::Robot;
    use crate::timer::TimerConfig;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn names() -> [String; N] {
        ["p0", "p1", "p2", "p3"].map(String::from)
    }

    fn fast_config(seed: u64, decision_ms: u64) -> RoomConfig {
        RoomConfig {
            timers: TimerConfig {
                decision: Duration::from_millis(decision_ms),
                selection: Duration::from_millis(decision_ms),
                returning: Duration::from_millis(decision_ms),
            },
            rng_seed: Some(seed),
            ..RoomConfig::default()
        }
    }

    async fn run_to_completion(room: Room) {
        let (start_tx, start_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();
        tokio::spawn(room.run(start_rx, done_tx));
        start_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(120), done_rx)
            .await
            .expect("match completes")
            .expect("done signal");
    }

    #[tokio::test]
    async fn robots_play_a_full_match() {
        let collector = Collector::new();
        let mut room = Room::new(names(), fast_config(1, 2000), vec![Box::new(collector.clone())]);
        for seat in 0..N {
            room.sit(seat, Robot::new());
        }
        let handle = room.handle();
        run_to_completion(room).await;

        let kinds = collector.kinds();
        assert_eq!(kinds[0], "match_started");
        assert_eq!(kinds[1], "deal_started");
        assert_eq!(kinds[2], "cards_dealt");
        assert_eq!(kinds.last(), Some(&"match_ended"));
        // no timeouts with robots answering instantly
        assert_eq!(collector.count("player_timeout"), 0);
        // all 108 cards went out on every deal
        for event in collector.events() {
            if let Event::CardsDealt { counts } = event {
                assert_eq!(counts.iter().sum::<usize>(), DECK);
            }
            if let Event::DealEnded { result } = event {
                assert!((1..=3).contains(&result.upgrade));
            }
        }
        // at least one deal beyond the first means tribute activity
        assert!(collector.count("deal_ended") >= 2);
        assert!(
            collector.count("tribute_started") + collector.count("tribute_immunity") >= 1
        );
        let state = handle.game_state().unwrap();
        assert_eq!(state.status, "finished");
        assert!(state.winner >= 0);
        assert_eq!(state.levels[state.winner as usize], 14);
    }

    #[tokio::test]
    async fn timeout_cascade_crowns_the_leader() {
        let collector = Collector::new();
        // nobody seated: every request times out, defaults apply
        let room = Room::new(names(), fast_config(7, 100), vec![Box::new(collector.clone())]);
        run_to_completion(room).await;

        let events = collector.events();
        let first_trick_end = events
            .iter()
            .position(|e| matches!(e, Event::TrickEnded { .. }))
            .expect("a trick ends");
        let leader = events
            .iter()
            .find_map(|e| match e {
                Event::TrickStarted { leader } => Some(*leader),
                _ => None,
            })
            .expect("a trick starts");
        let opening = &events[..first_trick_end];
        let timeouts = opening
            .iter()
            .filter(|e| matches!(e, Event::PlayerTimeout { .. }))
            .count();
        let passes = opening
            .iter()
            .filter(|e| matches!(e, Event::PlayerPassed { .. }))
            .count();
        // the leader timed out into a default single, the three
        // followers timed out into passes
        assert_eq!(timeouts, 4);
        assert_eq!(passes, 3);
        match &events[first_trick_end] {
            Event::TrickEnded { winner, .. } => assert_eq!(*winner, leader),
            _ => unreachable!(),
        }
        // two strikes flipped every seat to autoplay: exactly 8 timeouts
        assert_eq!(collector.count("player_timeout"), 2 * N);
        assert_eq!(collector.kinds().last(), Some(&"match_ended"));
    }

    #[tokio::test]
    async fn cancel_aborts_the_match() {
        let collector = Collector::new();
        let room = Room::new(names(), fast_config(3, 30_000), vec![Box::new(collector.clone())]);
        let handle = room.handle();
        let (start_tx, start_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();
        tokio::spawn(room.run(start_rx, done_tx));
        start_tx.send(()).unwrap();
        // wait until the driver is suspended on the first decision
        wait_for(&handle, |view| {
            view.deal.as_ref().is_some_and(|d| d.trick.is_some())
        })
        .await;
        handle.cancel();
        tokio::time::timeout(Duration::from_secs(5), done_rx)
            .await
            .expect("driver exits")
            .expect("done signal");
        let events = collector.events();
        match events.last() {
            Some(Event::MatchEnded { winner, aborted }) => {
                assert_eq!(*winner, None);
                assert!(*aborted);
            }
            other => panic!("expected an aborted match end, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn handle_validates_submissions() {
        let collector = Collector::new();
        let room = Room::new(names(), fast_config(5, 30_000), vec![Box::new(collector.clone())]);
        let handle = room.handle();
        let (start_tx, start_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();
        tokio::spawn(room.run(start_rx, done_tx));
        start_tx.send(()).unwrap();
        // the deadline marks the driver suspended on the lead decision
        wait_for(&handle, |view| {
            view.deal.as_ref().is_some_and(|d| {
                d.trick
                    .as_ref()
                    .is_some_and(|t| t.plays.is_empty() && t.deadline_ms.is_some())
            })
        })
        .await;

        let turn = handle
            .player_view(0)
            .unwrap()
            .deal
            .unwrap()
            .trick
            .unwrap()
            .turn;
        // the leader may not pass
        assert_eq!(handle.submit_pass(turn), Err(GameError::MustLead));
        // nor may anyone else act
        assert_eq!(
            handle.submit_pass(clockwise(turn)),
            Err(GameError::NotYourTurn(clockwise(turn)))
        );
        // malformed ids are rejected
        assert!(matches!(
            handle.submit_play(turn, "Gold_99"),
            Err(GameError::InvalidCardID(_))
        ));
        // a card the seat does not hold is rejected
        let held = handle.player_view(turn).unwrap().hand;
        let absent = ["Spade", "Heart", "Club", "Diamond"]
            .iter()
            .flat_map(|suit| (2..=14).map(move |n| format!("{}_{}", suit, n)))
            .find(|id| !held.contains(id))
            .expect("27 cards cannot cover 52 ids");
        assert!(matches!(
            handle.submit_play(turn, &absent),
            Err(GameError::NotInHand(_))
        ));
        // the smallest card in hand leads fine
        let own = held.last().unwrap().clone();
        assert_eq!(handle.submit_play(turn, &own), Ok(()));
        wait_for(&handle, |view| {
            view.deal
                .as_ref()
                .is_some_and(|d| d.trick.as_ref().is_some_and(|t| !t.plays.is_empty()))
        })
        .await;
        assert_eq!(collector.count("player_played"), 1);
        handle.cancel();
        let _ = tokio::time::timeout(Duration::from_secs(5), done_rx).await;
    }

    async fn wait_for(handle: &RoomHandle, ready: impl Fn(&PlayerView) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Ok(view) = handle.player_view(0) {
                    if ready(&view) {
                        return;
                    }
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("state becomes ready");
    }
}
