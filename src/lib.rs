pub mod libs;

pub use libs::error::NetError;
pub use libs::io::{format_g, reader, writer};
