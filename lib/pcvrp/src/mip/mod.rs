pub mod geometry;
pub mod build;
pub mod solve;
pub mod check;

pub use build::{build_model, Vars};
pub use solve::{solve, Outcome, Solution, SolveStatus};
