//! Bracket and schedule generation, plus the first-round editing helpers.

pub mod editing;
pub mod knockout;
pub mod round_robin;
pub mod seeding;

pub use editing::{
    assign_team, auto_seed_and_pair, clear_first_round, seed_options, swap_pair, EditIntent,
    FirstRoundAssignment, SeedOption,
};
pub use knockout::{Entrant, GroupPairing, KnockoutBracket, KnockoutBuilder, KnockoutOptions};
pub use round_robin::{schedule_groups, RoundRobinScheduler};
pub use seeding::{bracket_size_for, round_count, seed_order};
