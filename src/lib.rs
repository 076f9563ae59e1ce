// Public library interface for flow-tracker-back-end
pub mod action_router;
pub mod aggregators;
pub mod api;
pub mod cli_helper;
pub mod cli_utils;
pub mod errors;
pub mod flows;
pub mod result_cache;
pub mod utils;
