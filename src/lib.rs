//! Find who has the most acquaintances in a log of calls.
//!
//! Two people are friends once either has called the other. An acquaintance
//! is someone who is not a friend but shares a friend. A source is streamed
//! into a [`friends::FriendGraph`], frozen, and every person's acquaintances
//! are counted over it before [`maximum::max_acquaintances`] picks the winners.

pub mod acquaintances;
pub mod batch;
pub mod config;
pub mod friends;
pub mod generate;
pub mod ingest;
pub mod maximum;
pub mod persons;
pub mod report;

pub use acquaintances::{count_acquaintances, count_acquaintances_parallel, AcquaintanceCounts};
pub use batch::{run_batch, run_source, SourceOutcome, SourceReport};
pub use config::RunSettings;
pub use friends::{FriendGraph, FriendShard};
pub use ingest::SourceError;
pub use maximum::{max_acquaintances, MaxResult};
pub use persons::{ContactRecord, IngestStats, Person};
