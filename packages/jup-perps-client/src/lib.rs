#![allow(clippy::result_large_err)]

pub mod compute_budget;
pub mod config;
pub mod counter;
pub mod errors;
pub mod flows;
pub mod instructions;
pub mod submit;

pub use jup_perp_itf;

pub use crate::{
    config::{Cli, Command, Config},
    counter::RequestCounter,
    errors::{PerpsError, PerpsResult},
    flows::PerpsClient,
};
