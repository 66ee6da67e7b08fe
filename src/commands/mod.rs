// Command implementations for epsagon-wrap

pub mod clean;
pub mod run;
