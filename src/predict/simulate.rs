//! Monte Carlo resampling of a scalar win probability into discrete
//! win/loss tallies.
//!
//! The empirical rate converges back to the model probability as the run
//! count grows, but the caller is deliberately shown tournament-style
//! simulated counts rather than the raw model output. The two-stage shape
//! (deterministic probability, then stochastic resampling) is product
//! behavior; do not collapse it into returning the probability directly.

use rand::Rng;

use crate::error::ApiError;

/// Outcome of one simulation batch. The two rates are 4-decimal values and
/// exact complements of each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationResult {
    pub team1_wins: u32,
    pub runs: u32,
    pub team1_win_prob: f64,
    pub team2_win_prob: f64,
}

/// Draw `runs` independent uniforms from [0, 1) and count how many fall at
/// or below `p`; those are team1's wins, and team2 takes the remainder.
///
/// `runs == 0` is rejected: there is no meaningful win rate over zero games.
pub fn simulate<R: Rng>(p: f64, runs: u32, rng: &mut R) -> Result<SimulationResult, ApiError> {
    if runs == 0 {
        return Err(ApiError::InvalidSimulations);
    }

    let mut team1_wins = 0u32;
    for _ in 0..runs {
        if rng.gen::<f64>() <= p {
            team1_wins += 1;
        }
    }

    // Round in integer ten-thousandths so the pair of rates always sums to
    // exactly 1.0 after 4-decimal rounding.
    let bps = ((team1_wins as f64 / runs as f64) * 10_000.0).round() as u32;
    Ok(SimulationResult {
        team1_wins,
        runs,
        team1_win_prob: bps as f64 / 10_000.0,
        team2_win_prob: (10_000 - bps) as f64 / 10_000.0,
    })
}
