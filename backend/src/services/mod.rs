pub mod flag_store;
pub mod lead_service;
