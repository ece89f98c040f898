//! Keeps a list of people together with the day you last talked to them and ranks them by how
//! long it has been. The [store] owns and persists the records, [metrics] turns them into a
//! ranked, colour-bucketed view for a given moment, and [cli] is the terminal front end.
//!

pub mod cli;
pub mod metrics;
pub mod storage;
pub mod store;
pub mod utils;
