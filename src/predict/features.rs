//! Pairwise feature differencing.
//!
//! The model was trained on *differences* between two teams' season stat
//! lines rather than on both raw lines concatenated: only relative strength
//! matters to the outcome, and differencing halves the feature count.
//!
//! `FEATURE_COLUMNS` is the single declarative schema shared by record
//! validation and differencing. Its order is the order the model was trained
//! with; reordering or editing it without retraining silently corrupts every
//! prediction, so it is the one list in the codebase that must track the
//! training pipeline exactly.

use crate::error::ApiError;
use crate::store::TeamSeasonRecord;

/// Store column names, in model training order: the four-factor shooting and
/// possession splits, per-player box ratings (up to 8 rotation players),
/// play-type frequency/efficiency pairs, and per-player shot-quality stats.
pub const FEATURE_COLUMNS: [&str; 77] = [
    "EFG_O",
    "EFG_D",
    "FTR",
    "FTRD",
    "ORB",
    "DRB",
    "TOR",
    "TORD",
    "X2P_O",
    "X3P_O",
    "X2P_D",
    "X3P_D",
    "dbpr_Player 1",
    "dbpr_Player 2",
    "dbpr_Player 3",
    "dbpr_Player 4",
    "dbpr_Player 5",
    "dbpr_Player 6",
    "dbpr_Player 7",
    "dbpr_Player 8",
    "obpr_Player 1",
    "obpr_Player 2",
    "obpr_Player 3",
    "obpr_Player 4",
    "obpr_Player 5",
    "obpr_Player 6",
    "obpr_Player 7",
    "obpr_Player 8",
    "Rim_and_3_rate",
    "X3PT.Frequency",
    "X3PT.SQ.PPP",
    "Catch...Shoot.3PT.Frequency",
    "Catch...Shoot.3PT.SQ.PPP",
    "Cut.Frequency",
    "Cut.SQ.PPP",
    "Finishing.at.the.Rim.Frequency",
    "Finishing.at.the.Rim.SQ.PPP",
    "Half.Court.Frequency",
    "Half.Court.SQ.PPP",
    "Isolation.Frequency",
    "Isolation.SQ.PPP",
    "Midrange.Frequency",
    "Midrange.SQ.PPP",
    "Off.the.Dribble.3PT.Frequency",
    "Off.the.Dribble.3PT.SQ.PPP",
    "Off.Screen.Frequency",
    "Off.Screen.SQ.PPP",
    "P.R.Ball.Screen.Frequency",
    "P.R.Ball.Screen.SQ.PPP",
    "Post.Up.Frequency",
    "Post.Up.SQ.PPP",
    "Transition.Frequency",
    "Transition.SQ.PPP",
    "SQ.PPP_Player 1",
    "SQ.PPP_Player 2",
    "SQ.PPP_Player 3",
    "SQ.PPP_Player 4",
    "SQ.PPP_Player 5",
    "SQ.PPP_Player 6",
    "SQ.PPP_Player 7",
    "SQ.PPP_Player 8",
    "Good_Possession_Rate_Player 1",
    "Good_Possession_Rate_Player 2",
    "Good_Possession_Rate_Player 3",
    "Good_Possession_Rate_Player 4",
    "Good_Possession_Rate_Player 5",
    "Good_Possession_Rate_Player 6",
    "Good_Possession_Rate_Player 7",
    "Good_Possession_Rate_Player 8",
    "Shot.Making_Player 1",
    "Shot.Making_Player 2",
    "Shot.Making_Player 3",
    "Shot.Making_Player 4",
    "Shot.Making_Player 5",
    "Shot.Making_Player 6",
    "Shot.Making_Player 7",
    "Shot.Making_Player 8",
];

/// Build the model input vector: team1's stat minus team2's, per column, in
/// `FEATURE_COLUMNS` order. Pure; antisymmetric in its arguments.
///
/// A column absent from either record is a schema mismatch between the store
/// and the model, reported with the offending column name.
pub fn feature_vector(
    team1: &TeamSeasonRecord,
    team2: &TeamSeasonRecord,
) -> Result<Vec<f32>, ApiError> {
    let mut features = Vec::with_capacity(FEATURE_COLUMNS.len());
    for column in FEATURE_COLUMNS {
        features.push((team1.stat(column)? - team2.stat(column)?) as f32);
    }
    Ok(features)
}
