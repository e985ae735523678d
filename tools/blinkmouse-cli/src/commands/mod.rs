pub mod config;
pub mod curve;
pub mod replay;
pub mod run;
