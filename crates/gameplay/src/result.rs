use super::error::GameError;
use gd_core::*;

/// How decisively a deal was won, by the finishing position of the
/// winner's partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryType {
    /// Partner finished 2nd: both losers hold 3rd and 4th.
    DoubleDown,
    /// Partner finished 3rd: only the 4th is the opposing team.
    SingleLast,
    /// Partner finished 4th.
    PartnerLast,
}

impl VictoryType {
    /// Level upgrade earned by the winning team.
    pub const fn upgrade(&self) -> u8 {
        match self {
            VictoryType::DoubleDown => 3,
            VictoryType::SingleLast => 2,
            VictoryType::PartnerLast => 1,
        }
    }
}

impl std::fmt::Display for VictoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            VictoryType::DoubleDown => write!(f, "double-down"),
            VictoryType::SingleLast => write!(f, "single-last"),
            VictoryType::PartnerLast => write!(f, "partner-last"),
        }
    }
}

/// Outcome of a finished deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DealResult {
    /// Seats in finishing order, 1st through 4th.
    pub rankings: [Seat; N],
    pub winning_team: Team,
    pub victory: VictoryType,
    pub upgrade: u8,
}

impl DealResult {
    /// Classifies a complete finishing order.
    pub fn from_rankings(rankings: &[Seat]) -> Result<Self, GameError> {
        let rankings: [Seat; N] = rankings
            .try_into()
            .map_err(|_| GameError::InternalInvariant("incomplete rankings".into()))?;
        let first = rankings[0];
        let partner = rankings
            .iter()
            .position(|&s| s == teammate(first))
            .ok_or_else(|| GameError::InternalInvariant("partner missing from rankings".into()))?;
        let victory = match partner {
            1 => VictoryType::DoubleDown,
            2 => VictoryType::SingleLast,
            3 => VictoryType::PartnerLast,
            _ => return Err(GameError::InternalInvariant("duplicate first place".into())),
        };
        Ok(Self {
            rankings,
            winning_team: team_of(first),
            victory,
            upgrade: victory.upgrade(),
        })
    }
    /// Seat that finished in the given 1-indexed place.
    pub fn place(&self, place: usize) -> Seat {
        self.rankings[place - 1]
    }
    pub fn losing_team(&self) -> Team {
        1 - self.winning_team
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_down() {
        let result = DealResult::from_rankings(&[0, 2, 1, 3]).unwrap();
        assert_eq!(result.victory, VictoryType::DoubleDown);
        assert_eq!(result.winning_team, 0);
        assert_eq!(result.upgrade, 3);
        assert_eq!(result.losing_team(), 1);
    }

    #[test]
    fn single_last() {
        let result = DealResult::from_rankings(&[1, 0, 3, 2]).unwrap();
        assert_eq!(result.victory, VictoryType::SingleLast);
        assert_eq!(result.winning_team, 1);
        assert_eq!(result.upgrade, 2);
    }

    #[test]
    fn partner_last() {
        let result = DealResult::from_rankings(&[0, 1, 3, 2]).unwrap();
        assert_eq!(result.victory, VictoryType::PartnerLast);
        assert_eq!(result.winning_team, 0);
        assert_eq!(result.upgrade, 1);
    }

    #[test]
    fn incomplete_rankings_rejected() {
        assert!(DealResult::from_rankings(&[0, 2]).is_err());
    }
}
