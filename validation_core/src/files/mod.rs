pub mod models;
pub mod multipart;

pub use models::{FileLookup, FormFile, FormFileMetadata, RequestFiles, UploadedFile};
pub use multipart::{read_multipart, BoundForm};
