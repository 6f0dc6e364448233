//! Winner selection across concurrently-queried classifiers.

use crate::interpretation::Interpretation;

/// The single best interpretation for one turn, with the registration-order
/// index of the classifier that produced it.
#[derive(Debug, Clone)]
pub struct Winner {
    pub classifier: usize,
    pub interpretation: Interpretation,
}

/// Select the overall winner across per-classifier result sets.
///
/// `results` is ordered by classifier registration; that order is the
/// priority rank used to break confidence ties.
///
/// Each classifier's local winner is its highest-confidence interpretation
/// (earlier entries win ties). Classifiers whose local winner carries the
/// none sentinel are discarded. Among the surviving local winners the
/// highest confidence wins, ties going to the earliest-registered
/// classifier. Returns `None` when no classifier produced a non-none local
/// winner.
pub fn select_winner(results: &[Vec<Interpretation>]) -> Option<Winner> {
    let mut winner: Option<Winner> = None;

    for (rank, interpretations) in results.iter().enumerate() {
        let Some(local) = local_winner(interpretations) else {
            continue;
        };
        if local.is_none_intent() {
            continue;
        }
        let beats_current = match &winner {
            Some(current) => local.confidence > current.interpretation.confidence,
            None => true,
        };
        if beats_current {
            winner = Some(Winner {
                classifier: rank,
                interpretation: local.clone(),
            });
        }
    }

    winner
}

/// A classifier's own best interpretation: highest confidence, declaration
/// order breaking ties.
fn local_winner(interpretations: &[Interpretation]) -> Option<&Interpretation> {
    let mut best: Option<&Interpretation> = None;
    for interpretation in interpretations {
        let beats_current = match best {
            Some(current) => interpretation.confidence > current.confidence,
            None => true,
        };
        if beats_current {
            best = Some(interpretation);
        }
    }
    best
}
