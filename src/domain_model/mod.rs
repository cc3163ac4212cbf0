mod headers;
mod ticket;
mod token;

pub use headers::*;
pub use ticket::*;
pub use token::*;
