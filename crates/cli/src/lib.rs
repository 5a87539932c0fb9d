pub mod bootstrap;
pub mod cli;
