pub mod id;
pub mod text;

pub use id::PrefixedId;
