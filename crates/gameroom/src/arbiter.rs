use gd_cards::Card;
use gd_core::*;
use gd_gameplay::Action;
use gd_gameplay::GameError;
use gd_gameplay::Match;
use gd_gameplay::TributeStatus;
use gd_gameplay::validate_pass;
use gd_gameplay::validate_play;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::time::Instant;

/// Match state shared between the driver (exclusive writer) and
/// read-only queries.
pub type Shared = Arc<RwLock<Match>>;

/// How a pending request resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Input(T),
    TimedOut,
    Disconnected,
    Cancelled,
}

enum Signal<T> {
    Input(T),
    Disconnected,
}

/// An opened request slot awaiting one submission.
pub struct Pending<T>(oneshot::Receiver<Signal<T>>);

#[derive(Default)]
struct Slots {
    play: Option<oneshot::Sender<Signal<Action>>>,
    pick: Option<oneshot::Sender<Signal<Card>>>,
    back: Option<oneshot::Sender<Signal<Card>>>,
}

/// Per-room input arbitration: one single-slot pending request per seat
/// and action kind.
///
/// The driver suspends on [`Arbiter::wait_play`] (and friends) with a
/// per-request deadline. Submissions validate against the shared state
/// first and report failures to the submitter without consuming the
/// slot, so the original deadline keeps running. Disconnects resolve a
/// pending request immediately; cancellation resolves every wait with
/// [`Outcome::Cancelled`].
pub struct Arbiter {
    shared: Shared,
    slots: Mutex<[Slots; N]>,
    cancel: watch::Sender<bool>,
    disconnects: Mutex<Vec<Seat>>,
    reconnects: Mutex<Vec<Seat>>,
}

impl Arbiter {
    pub fn new(shared: Shared) -> Self {
        Self {
            shared,
            slots: Mutex::new(std::array::from_fn(|_| Slots::default())),
            cancel: watch::Sender::new(false),
            disconnects: Mutex::new(Vec::new()),
            reconnects: Mutex::new(Vec::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Match>, GameError> {
        self.shared
            .read()
            .map_err(|_| GameError::InternalInvariant("state lock poisoned".into()))
    }
    fn slots(&self) -> std::sync::MutexGuard<'_, [Slots; N]> {
        self.slots.lock().expect("slots lock")
    }

    // ------------------------------------------------------------------
    // Driver side: open a single-slot request, then suspend on it.
    // The slot must exist before the prompt goes out, so a submission
    // racing the prompt still lands.
    // ------------------------------------------------------------------
    pub fn open_play(&self, seat: Seat) -> Pending<Action> {
        let (tx, rx) = oneshot::channel();
        self.slots()[seat].play = Some(tx);
        Pending(rx)
    }
    pub fn open_pick(&self, seat: Seat) -> Pending<Card> {
        let (tx, rx) = oneshot::channel();
        self.slots()[seat].pick = Some(tx);
        Pending(rx)
    }
    pub fn open_back(&self, seat: Seat) -> Pending<Card> {
        let (tx, rx) = oneshot::channel();
        self.slots()[seat].back = Some(tx);
        Pending(rx)
    }
    pub async fn wait_play(
        &self,
        seat: Seat,
        pending: Pending<Action>,
        deadline: Instant,
    ) -> Outcome<Action> {
        let outcome = self.wait(pending.0, deadline).await;
        self.slots()[seat].play = None;
        outcome
    }
    pub async fn wait_pick(
        &self,
        seat: Seat,
        pending: Pending<Card>,
        deadline: Instant,
    ) -> Outcome<Card> {
        let outcome = self.wait(pending.0, deadline).await;
        self.slots()[seat].pick = None;
        outcome
    }
    pub async fn wait_back(
        &self,
        seat: Seat,
        pending: Pending<Card>,
        deadline: Instant,
    ) -> Outcome<Card> {
        let outcome = self.wait(pending.0, deadline).await;
        self.slots()[seat].back = None;
        outcome
    }
    async fn wait<T>(&self, rx: oneshot::Receiver<Signal<T>>, deadline: Instant) -> Outcome<T> {
        let mut cancel = self.cancel.subscribe();
        if *cancel.borrow() {
            return Outcome::Cancelled;
        }
        tokio::select! {
            biased;
            _ = cancel.changed() => Outcome::Cancelled,
            result = rx => match result {
                Ok(Signal::Input(value)) => Outcome::Input(value),
                Ok(Signal::Disconnected) => Outcome::Disconnected,
                Err(_) => Outcome::TimedOut,
            },
            _ = tokio::time::sleep_until(deadline) => Outcome::TimedOut,
        }
    }

    // ------------------------------------------------------------------
    // Player side: validate, then fill the pending slot.
    // ------------------------------------------------------------------
    pub fn submit_play(&self, seat: Seat, action: Action) -> Result<(), GameError> {
        {
            let game = self.read()?;
            let deal = game.deal().ok_or(GameError::WrongPhase)?;
            let trick = deal.trick().ok_or(GameError::WrongPhase)?;
            match &action {
                Action::Pass => validate_pass(seat, trick)?,
                Action::Play(cards) => {
                    validate_play(seat, cards, deal.hand(seat), trick, deal.level()).map(|_| ())?
                }
            }
        }
        let mut slots = self.slots();
        let pending_elsewhere = slots.iter().any(|s| s.play.is_some());
        match slots[seat].play.take() {
            Some(tx) => tx
                .send(Signal::Input(action))
                .map_err(|_| GameError::NoPendingInput),
            None if pending_elsewhere => Err(GameError::InvalidInput(format!(
                "no play pending for seat {}",
                seat
            ))),
            None => Err(GameError::NoPendingInput),
        }
    }

    pub fn submit_pick(&self, seat: Seat, card: Card) -> Result<(), GameError> {
        {
            let game = self.read()?;
            let phase = game
                .deal()
                .and_then(|d| d.tribute())
                .ok_or(GameError::WrongPhase)?;
            if phase.status() != TributeStatus::Selecting {
                return Err(GameError::WrongPhase);
            }
            if !phase.pool().iter().any(|(_, c)| *c == card) {
                return Err(GameError::InvalidTributeSelection(card.id()));
            }
        }
        let mut slots = self.slots();
        let pending_elsewhere = slots.iter().any(|s| s.pick.is_some());
        match slots[seat].pick.take() {
            Some(tx) => tx
                .send(Signal::Input(card))
                .map_err(|_| GameError::NoPendingInput),
            None if pending_elsewhere => Err(GameError::InvalidInput(format!(
                "no pool pick pending for seat {}",
                seat
            ))),
            None => Err(GameError::NoPendingInput),
        }
    }

    pub fn submit_back(&self, seat: Seat, card: Card) -> Result<(), GameError> {
        {
            let game = self.read()?;
            let deal = game.deal().ok_or(GameError::WrongPhase)?;
            let phase = deal.tribute().ok_or(GameError::WrongPhase)?;
            if phase.status() != TributeStatus::Returning {
                return Err(GameError::WrongPhase);
            }
            if !deal.hand(seat).contains(&card) {
                return Err(GameError::InvalidTributeSelection(card.id()));
            }
        }
        let mut slots = self.slots();
        let pending_elsewhere = slots.iter().any(|s| s.back.is_some());
        match slots[seat].back.take() {
            Some(tx) => tx
                .send(Signal::Input(card))
                .map_err(|_| GameError::NoPendingInput),
            None if pending_elsewhere => Err(GameError::InvalidInput(format!(
                "no return pending for seat {}",
                seat
            ))),
            None => Err(GameError::NoPendingInput),
        }
    }

    // ------------------------------------------------------------------
    // Connection lifecycle.
    // ------------------------------------------------------------------
    /// Resolves any pending request for the seat and queues the
    /// disconnect for the driver.
    pub fn disconnect(&self, seat: Seat) {
        let mut slots = self.slots();
        if let Some(tx) = slots[seat].play.take() {
            let _ = tx.send(Signal::Disconnected);
        }
        if let Some(tx) = slots[seat].pick.take() {
            let _ = tx.send(Signal::Disconnected);
        }
        if let Some(tx) = slots[seat].back.take() {
            let _ = tx.send(Signal::Disconnected);
        }
        drop(slots);
        self.disconnects.lock().expect("disconnects lock").push(seat);
    }
    pub fn reconnect(&self, seat: Seat) {
        self.reconnects.lock().expect("reconnects lock").push(seat);
    }
    pub fn drain_disconnects(&self) -> Vec<Seat> {
        std::mem::take(&mut *self.disconnects.lock().expect("disconnects lock"))
    }
    pub fn drain_reconnects(&self) -> Vec<Seat> {
        std::mem::take(&mut *self.reconnects.lock().expect("reconnects lock"))
    }

    /// Stops the match: every pending and future wait resolves with
    /// [`Outcome::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn arbiter() -> Arbiter {
        let game = Match::new(["p0", "p1", "p2", "p3"].map(String::from));
        Arbiter::new(Arc::new(RwLock::new(game)))
    }

    #[tokio::test]
    async fn submission_without_request_is_rejected() {
        let arbiter = arbiter();
        // no deal in progress: phase error before slot bookkeeping
        assert_eq!(
            arbiter.submit_play(0, Action::Pass),
            Err(GameError::WrongPhase)
        );
    }

    #[tokio::test]
    async fn wait_times_out() {
        let arbiter = arbiter();
        let pending = arbiter.open_play(0);
        let deadline = Instant::now() + Duration::from_millis(10);
        let outcome = arbiter.wait_play(0, pending, deadline).await;
        assert_eq!(outcome, Outcome::TimedOut);
    }

    #[tokio::test]
    async fn cancel_resolves_waits() {
        let arbiter = Arc::new(arbiter());
        let waiter = arbiter.clone();
        let pending = arbiter.open_play(0);
        let task = tokio::spawn(async move {
            let deadline = Instant::now() + Duration::from_secs(30);
            waiter.wait_play(0, pending, deadline).await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        arbiter.cancel();
        assert_eq!(task.await.unwrap(), Outcome::Cancelled);
    }

    #[tokio::test]
    async fn disconnect_resolves_pending_wait() {
        let arbiter = Arc::new(arbiter());
        let waiter = arbiter.clone();
        let pending = arbiter.open_play(2);
        let task = tokio::spawn(async move {
            let deadline = Instant::now() + Duration::from_secs(30);
            waiter.wait_play(2, pending, deadline).await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        arbiter.disconnect(2);
        assert_eq!(task.await.unwrap(), Outcome::<Action>::Disconnected);
        assert_eq!(arbiter.drain_disconnects(), vec![2]);
        assert!(arbiter.drain_disconnects().is_empty());
    }
}
