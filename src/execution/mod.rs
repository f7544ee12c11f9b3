//! Execution module - order submission throttling and fill classification

pub mod controller;
pub mod fill;

pub use controller::{
    OrderSubmissionController, SubmitFailReason, SubmitReceipt, SubmitSkipReason,
};
pub use fill::{extract_fill_info, fok_killed};
