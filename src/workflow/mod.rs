pub mod item_flow;

pub use item_flow::{ItemFlow, ProcessResult};
