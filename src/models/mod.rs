pub mod prompt;
pub mod result_record;
pub mod work_item;

pub use prompt::Prompt;
pub use result_record::ResultRecord;
pub use work_item::{ImagePayload, WorkItem};
