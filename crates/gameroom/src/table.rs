use super::event::Event;
use gd_core::*;

/// Seat-indexed delivery and presence ledger for one match.
///
/// Routes driver events to the player actors by addressing: request and
/// state-sync events reach only the seat they concern, public events
/// reach every occupied seat. Also keeps the per-seat timeout strikes
/// and disconnection marks the driver consults when deciding whether a
/// seat has forfeited control.
#[derive(Debug)]
pub struct Table {
    outboxes: [Option<tokio::sync::mpsc::UnboundedSender<Event>>; N],
    strikes: [u32; N],
    gone: [bool; N],
}

impl Table {
    pub fn new() -> Self {
        Self {
            outboxes: std::array::from_fn(|_| None),
            strikes: [0; N],
            gone: [false; N],
        }
    }
    /// Wires a player actor's inbox to a seat.
    pub fn sit(&mut self, seat: Seat, outbox: tokio::sync::mpsc::UnboundedSender<Event>) {
        self.outboxes[seat] = Some(outbox);
    }
    /// Number of seats with a live actor attached.
    pub fn occupied(&self) -> usize {
        self.outboxes.iter().filter(|o| o.is_some()).count()
    }

    /// Routes one event: an addressed event goes to its seat alone,
    /// a public event to every seat.
    pub fn deliver(&self, event: Event) {
        match event.audience() {
            Some(seat) => self.send(seat, event),
            None => {
                for seat in 0..N {
                    self.send(seat, event.clone());
                }
            }
        }
    }
    fn send(&self, seat: Seat, event: Event) {
        let Some(outbox) = self.outboxes.get(seat).and_then(|o| o.as_ref()) else {
            log::trace!("[table] P{} vacant, dropping {}", seat, event.kind());
            return;
        };
        if outbox.send(event).is_err() {
            log::warn!("[table] P{} inbox closed", seat);
        }
    }

    /// One more missed deadline for the seat; returns the running count.
    pub fn strike(&mut self, seat: Seat) -> u32 {
        self.strikes[seat] += 1;
        log::debug!("[table] P{} strike {}", seat, self.strikes[seat]);
        self.strikes[seat]
    }
    /// An accepted input wipes the seat's strikes.
    pub fn clear_strikes(&mut self, seat: Seat) {
        self.strikes[seat] = 0;
    }
    pub fn strikes(&self, seat: Seat) -> u32 {
        self.strikes[seat]
    }
    pub fn disconnect(&mut self, seat: Seat) {
        self.gone[seat] = true;
    }
    /// A returning seat comes back with a clean strike record.
    pub fn reconnect(&mut self, seat: Seat) {
        self.gone[seat] = false;
        self.strikes[seat] = 0;
    }
    pub fn is_disconnected(&self, seat: Seat) -> bool {
        self.gone[seat]
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}
