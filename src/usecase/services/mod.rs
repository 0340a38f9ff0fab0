pub mod content_service;
pub mod export_service;
pub mod flag_service;
