pub mod id;
pub mod unicode;

pub use id::generate_id;
