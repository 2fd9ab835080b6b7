pub mod response;

pub use response::{ApiResponse, FieldRules, UploadReceipt};
