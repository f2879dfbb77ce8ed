#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod ledger_processor;
pub mod model;
pub mod ports;
pub mod update_policy;

pub use error::{LedgerError, SnapshotError, UpdateCheckError};
pub use ledger_processor::LedgerProcessor;
pub use model::{GroupSnapshot, LedgerView, SettleUpCommit};
pub use ports::{LedgerSnapshotSource, UpdateChecker};
pub use update_policy::{RemoteVersionConfig, UpdateInfo, UpdatePolicy};
