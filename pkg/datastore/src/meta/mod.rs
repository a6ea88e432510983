mod key_ranges;
mod state_machine;
mod state_machine_db;
pub mod store;
mod table_key;
mod test_store;
mod transaction;
mod watchers;

#[cfg(test)]
mod tests;

pub use test_store::*;
