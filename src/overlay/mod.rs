//! Derived view data layered over stored matches.

mod winner;

pub use winner::{compute_loser, compute_winner, ImpliedTeams, WinnerPropagator};
