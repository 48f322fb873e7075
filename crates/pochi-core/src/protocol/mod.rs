//! Wire protocol: text frames in, text frames out.
//!
//! Inbound frames carry a small JSON envelope
//! (`{"type":"command","command":"Next","clientId":"phone-1"}`) which
//! [`parser::parse`] turns into a [`crate::CommandRequest`].  Outbound frames
//! are the plain-text markers rendered by [`reply::Reply`].

pub mod parser;
pub mod reply;

pub use parser::{parse, CommandEnvelope, ParseError, ParseResult};
pub use reply::Reply;
