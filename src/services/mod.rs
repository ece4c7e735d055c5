pub mod enumerator;
pub mod ledger;
pub mod result_writer;
pub mod retry;

pub use enumerator::{ScanPlan, WorkEnumerator};
pub use ledger::CompletionLedger;
pub use result_writer::ResultWriter;
pub use retry::RetryPolicy;
