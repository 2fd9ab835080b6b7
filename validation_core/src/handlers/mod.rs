pub mod routes;
pub mod uploads;

pub use routes::create_routes;
pub use uploads::{bind_value, validate_form, UploadField};
