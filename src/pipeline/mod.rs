//! Pipeline entry points for harvester operations.
//!
//! - `collect_inputs`: Gather raw URLs from arguments and list files
//! - `run_harvest`: Classify, expand, extract and export

pub mod harvest;
pub mod inputs;

pub use harvest::{HarvestRequest, Harvester, merge_targets, run_harvest};
pub use inputs::{collect_inputs, parse_lines};
