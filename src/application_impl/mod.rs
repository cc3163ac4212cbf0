mod header_writer;
mod rotation_policy;
mod session_broker;
mod token_extractor;

pub use header_writer::*;
pub use rotation_policy::*;
pub use session_broker::*;
pub use token_extractor::*;
