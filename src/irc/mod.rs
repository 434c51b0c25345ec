//! IRC protocol output.
//!
//! The redirector only ever speaks, it never listens: each accepted client
//! receives two messages (a numeric bounce and a terminal `ERROR`) and is
//! then disconnected. Only the encode direction of the wire format exists
//! here.

pub mod message;

pub use message::Message;
