use super::error::GameError;
use gd_cards::Card;
use gd_cards::Combo;
use gd_core::*;

/// Trick lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrickStatus {
    Waiting,
    Playing,
    Finished,
}

/// One lead and up to three follow decisions.
///
/// The turn advances clockwise, skipping seats that have already
/// finished the deal. The trick closes when the walk would return to
/// the seat holding the current high play: everyone still in has either
/// passed or finished, crowning that play's seat.
#[derive(Debug, Clone)]
pub struct Trick {
    leader: Seat,
    turn: Seat,
    lead: Option<Combo>,
    high: Option<(Seat, Combo)>,
    plays: Vec<(Seat, Option<Vec<Card>>)>,
    status: TrickStatus,
    winner: Option<Seat>,
    next_leader: Option<Seat>,
    deadline_ms: Option<u64>,
}

impl Trick {
    pub fn new(leader: Seat) -> Self {
        Self {
            leader,
            turn: leader,
            lead: None,
            high: None,
            plays: Vec::new(),
            status: TrickStatus::Waiting,
            winner: None,
            next_leader: None,
            deadline_ms: None,
        }
    }
    pub fn leader(&self) -> Seat {
        self.leader
    }
    pub fn turn(&self) -> Seat {
        self.turn
    }
    /// The combination opening the trick; None while waiting for the lead.
    pub fn lead(&self) -> Option<&Combo> {
        self.lead.as_ref()
    }
    /// Seat and combination currently winning the trick.
    pub fn high(&self) -> Option<(Seat, Combo)> {
        self.high
    }
    pub fn plays(&self) -> &[(Seat, Option<Vec<Card>>)] {
        &self.plays
    }
    pub fn status(&self) -> TrickStatus {
        self.status
    }
    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }
    /// Leader of the next trick, set when this one finishes.
    pub fn next_leader(&self) -> Option<Seat> {
        self.next_leader
    }
    pub fn is_finished(&self) -> bool {
        self.status == TrickStatus::Finished
    }
    /// Public turn deadline in unix milliseconds, set by the driver.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }
    pub fn set_deadline_ms(&mut self, deadline: Option<u64>) {
        self.deadline_ms = deadline;
    }

    /// Waiting → Playing. The orchestrator calls this before the lead.
    pub fn start(&mut self) -> Result<(), GameError> {
        match self.status {
            TrickStatus::Waiting => {
                self.status = TrickStatus::Playing;
                Ok(())
            }
            _ => Err(GameError::WrongPhase),
        }
    }

    /// Records a validated play and advances the turn.
    /// `ranked` must already include `seat` if this play emptied their hand.
    pub fn play(
        &mut self,
        seat: Seat,
        cards: Vec<Card>,
        combo: Combo,
        ranked: &[Seat],
    ) -> Result<(), GameError> {
        if self.status != TrickStatus::Playing {
            return Err(GameError::WrongPhase);
        }
        if seat != self.turn {
            return Err(GameError::NotYourTurn(seat));
        }
        debug_assert!(combo.beats(self.high.as_ref().map(|(_, c)| c)));
        if self.lead.is_none() {
            self.lead = Some(combo);
        }
        self.high = Some((seat, combo));
        self.plays.push((seat, Some(cards)));
        self.advance(ranked);
        Ok(())
    }

    /// Records a pass and advances the turn.
    pub fn pass(&mut self, seat: Seat, ranked: &[Seat]) -> Result<(), GameError> {
        if self.status != TrickStatus::Playing {
            return Err(GameError::WrongPhase);
        }
        if seat != self.turn {
            return Err(GameError::NotYourTurn(seat));
        }
        if self.lead.is_none() {
            return Err(GameError::MustLead);
        }
        self.plays.push((seat, None));
        self.advance(ranked);
        Ok(())
    }

    /// Clockwise walk to the next unfinished seat; reaching the high
    /// play's seat instead closes the trick.
    fn advance(&mut self, ranked: &[Seat]) {
        let holder = match self.high {
            Some((seat, _)) => seat,
            None => return,
        };
        let mut seat = self.turn;
        for _ in 0..N {
            seat = clockwise(seat);
            if seat == holder {
                return self.finish(ranked);
            }
            if !ranked.contains(&seat) {
                self.turn = seat;
                return;
            }
        }
        self.finish(ranked)
    }

    /// Crowns the high play. The winner leads next unless they have
    /// finished, then their teammate, then the next unfinished seat
    /// clockwise.
    fn finish(&mut self, ranked: &[Seat]) {
        let winner = match self.high {
            Some((seat, _)) => seat,
            None => return,
        };
        self.status = TrickStatus::Finished;
        self.winner = Some(winner);
        self.deadline_ms = None;
        self.next_leader = if !ranked.contains(&winner) {
            Some(winner)
        } else if !ranked.contains(&teammate(winner)) {
            Some(teammate(winner))
        } else {
            let mut seat = winner;
            (0..N)
                .map(|_| {
                    seat = clockwise(seat);
                    seat
                })
                .find(|s| !ranked.contains(s))
        };
    }
}
