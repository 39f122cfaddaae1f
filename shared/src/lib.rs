pub mod constants;
pub mod error;
pub mod flag_store;
pub mod outcome;
pub mod shared_wheel_game;
pub mod validation;
pub mod wheel_config;
pub mod wheel_geometry;
