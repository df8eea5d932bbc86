pub mod problem;
pub mod trace;
