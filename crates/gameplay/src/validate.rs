use super::error::GameError;
use super::trick::Trick;
use super::trick::TrickStatus;
use gd_cards::Card;
use gd_cards::Combo;
use gd_cards::Rank;
use gd_core::Seat;

/// True when `cards` is a sub-multiset of `hand`.
pub fn contains(hand: &[Card], cards: &[Card]) -> bool {
    missing(hand, cards).is_none()
}

/// First card of `cards` not available in `hand`, multiset-wise.
pub fn missing(hand: &[Card], cards: &[Card]) -> Option<Card> {
    let mut pool = hand.to_vec();
    for card in cards {
        match pool.iter().position(|c| c == card) {
            Some(i) => {
                pool.swap_remove(i);
            }
            None => return Some(*card),
        }
    }
    None
}

/// Full play legality: ownership, turn, recognition, and beat against
/// the lead. Returns the recognized combination; state is untouched.
pub fn validate_play(
    seat: Seat,
    cards: &[Card],
    hand: &[Card],
    trick: &Trick,
    level: Rank,
) -> Result<Combo, GameError> {
    if trick.status() != TrickStatus::Playing {
        return Err(GameError::WrongPhase);
    }
    if let Some(card) = missing(hand, cards) {
        return Err(GameError::NotInHand(card.id()));
    }
    if seat != trick.turn() {
        return Err(GameError::NotYourTurn(seat));
    }
    let combo = Combo::identify(cards, level).ok_or(GameError::InvalidCombo)?;
    let high = trick.high().map(|(_, c)| c);
    if !combo.beats(high.as_ref()) {
        return Err(GameError::IllegalBeat);
    }
    Ok(combo)
}

/// Pass legality: right seat, and only ever against an open lead.
pub fn validate_pass(seat: Seat, trick: &Trick) -> Result<(), GameError> {
    if trick.status() != TrickStatus::Playing {
        return Err(GameError::WrongPhase);
    }
    if seat != trick.turn() {
        return Err(GameError::NotYourTurn(seat));
    }
    if trick.lead().is_none() {
        return Err(GameError::MustLead);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: Rank = Rank::Two;

    fn hand(s: &str) -> Vec<Card> {
        Card::parse(s).unwrap()
    }

    #[test]
    fn multiset_containment() {
        let hand = hand("Spade_3 Spade_3 Club_4");
        assert!(contains(&hand, &Card::parse("Spade_3 Spade_3").unwrap()));
        assert!(!contains(&hand, &Card::parse("Spade_3 Spade_3 Spade_3").unwrap()));
        assert!(!contains(&hand, &Card::parse("Heart_9").unwrap()));
    }

    #[test]
    fn ownership_checked_first() {
        let mut trick = Trick::new(0);
        trick.start().unwrap();
        let hand = hand("Spade_3 Club_4");
        let err = validate_play(0, &Card::parse("Heart_9").unwrap(), &hand, &trick, LEVEL);
        assert_eq!(err, Err(GameError::NotInHand("Heart_9".into())));
    }

    #[test]
    fn follow_must_beat() {
        let mut trick = Trick::new(0);
        trick.start().unwrap();
        let cards = Card::parse("Spade_9 Club_9").unwrap();
        let combo = Combo::identify(&cards, LEVEL).unwrap();
        trick.play(0, cards, combo, &[]).unwrap();
        // equal pair refused for the next player
        let cards = Card::parse("Diamond_9 Heart_9").unwrap();
        let err = validate_play(1, &cards, &cards.clone(), &trick, LEVEL);
        assert_eq!(err, Err(GameError::IllegalBeat));
        // higher pair accepted
        let cards = Card::parse("Spade_13 Club_13").unwrap();
        assert!(validate_play(1, &cards, &cards.clone(), &trick, LEVEL).is_ok());
        // bomb accepted over a pair
        let cards = Card::parse("Spade_7 Club_7 Diamond_7 Heart_7").unwrap();
        assert!(validate_play(1, &cards, &cards.clone(), &trick, LEVEL).is_ok());
    }
}
