pub mod collection;
pub mod flag;
pub mod record;
