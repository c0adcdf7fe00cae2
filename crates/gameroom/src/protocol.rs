use super::event::Event;
use super::message::PoolCard;
use super::message::ServerMessage;
use gd_cards::Card;
use gd_gameplay::Action;
use gd_gameplay::GameError;

/// The protocol layer between internal events and the wire format.
/// Encodes typed events into [`ServerMessage`]s and parses inbound
/// client strings into validated inputs.
pub struct Protocol;

impl Protocol {
    /// Converts an internal event to a wire message.
    pub fn encode(event: &Event) -> ServerMessage {
        match event {
            Event::MatchStarted { usernames, levels } => ServerMessage::MatchStarted {
                usernames: usernames.to_vec(),
                levels: *levels,
            },
            Event::MatchEnded { winner, aborted } => ServerMessage::MatchEnded {
                winner: winner.map(|t| t as i8).unwrap_or(-1),
                aborted: *aborted,
            },
            Event::DealStarted { number, level } => ServerMessage::DealStarted {
                number: *number,
                level: u8::from(*level),
            },
            Event::CardsDealt { counts } => ServerMessage::CardsDealt { counts: *counts },
            Event::TributePhase { status } => ServerMessage::TributePhase {
                status: format!("{:?}", status).to_lowercase(),
            },
            Event::TributeRulesSet { victory, map } => ServerMessage::TributeRulesSet {
                victory: victory.to_string(),
                map: map.clone(),
            },
            Event::TributeImmunity { team } => ServerMessage::TributeImmunity { team: *team },
            Event::TributePoolCreated { pool } => ServerMessage::TributePoolCreated {
                pool: pool
                    .iter()
                    .map(|(seat, card)| PoolCard {
                        seat: *seat,
                        card: card.id(),
                    })
                    .collect(),
            },
            Event::TributeStarted => ServerMessage::TributeStarted,
            Event::TributeGiven { from, to, card } => ServerMessage::TributeGiven {
                from: *from,
                to: *to,
                card: card.id(),
            },
            Event::TributeSelected { seat, donor, card } => ServerMessage::TributeSelected {
                seat: *seat,
                donor: *donor,
                card: card.id(),
            },
            Event::ReturnTribute { from, to, card } => ServerMessage::ReturnTribute {
                from: *from,
                to: *to,
                card: card.id(),
            },
            Event::TributeCompleted => ServerMessage::TributeCompleted,
            Event::TrickStarted { leader } => ServerMessage::TrickStarted { leader: *leader },
            Event::PlayerPlayed { seat, cards, combo } => ServerMessage::PlayerPlayed {
                seat: *seat,
                cards: cards.iter().map(|c| c.id()).collect(),
                combo: combo.to_string(),
            },
            Event::PlayerPassed { seat } => ServerMessage::PlayerPassed { seat: *seat },
            Event::TrickEnded {
                winner,
                next_leader,
            } => ServerMessage::TrickEnded {
                winner: *winner,
                next_leader: *next_leader,
            },
            Event::DealEnded { result } => ServerMessage::DealEnded { result: *result },
            Event::PlayerTimeout { seat } => ServerMessage::PlayerTimeout { seat: *seat },
            Event::PlayerDisconnect { seat } => ServerMessage::PlayerDisconnect { seat: *seat },
            Event::PlayerReconnect { seat } => ServerMessage::PlayerReconnect { seat: *seat },
            Event::PlayRequest(req) => ServerMessage::PlayRequest {
                seat: req.seat,
                hand: req.hand.iter().map(|c| c.id()).collect(),
                lead: req.lead.as_ref().map(|c| c.to_string()),
                deadline_ms: req.deadline_ms,
            },
            Event::TributeRequest(req) => ServerMessage::TributeRequest {
                seat: req.seat,
                pool: req.pool.iter().map(|c| c.id()).collect(),
                deadline_ms: req.deadline_ms,
            },
            Event::ReturnRequest(req) => ServerMessage::ReturnRequest {
                seat: req.seat,
                hand: req.hand.iter().map(|c| c.id()).collect(),
                deadline_ms: req.deadline_ms,
            },
            Event::StateSync(view) => ServerMessage::State { view: view.clone() },
        }
    }
    /// Parses a client play string: `pass` or whitespace-separated
    /// card ids.
    pub fn decode_action(s: &str) -> Result<Action, GameError> {
        Action::try_from(s)
    }
    /// Parses a single card id.
    pub fn decode_card(s: &str) -> Result<Card, GameError> {
        Card::try_from(s).map_err(GameError::InvalidCardID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_valid_inputs() {
        assert_eq!(Protocol::decode_action("pass").unwrap(), Action::Pass);
        assert!(Protocol::decode_action("Heart_5 Spade_5").is_ok());
        assert!(Protocol::decode_card("Joker_16").is_ok());
    }

    #[test]
    fn decode_invalid_inputs() {
        assert!(matches!(
            Protocol::decode_action("Heart_99"),
            Err(GameError::InvalidCardID(_))
        ));
        assert!(matches!(
            Protocol::decode_card("not a card"),
            Err(GameError::InvalidCardID(_))
        ));
    }

    #[test]
    fn encode_keeps_wire_kind() {
        let event = Event::PlayerPassed { seat: 3 };
        let json = Protocol::encode(&event).to_json();
        assert!(json.contains("\"type\":\"player_passed\""));
        assert_eq!(event.kind(), "player_passed");
    }
}
