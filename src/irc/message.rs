use bytes::{BufMut, Bytes, BytesMut};

/// Numeric reply telling a client to try another server (RPL_BOUNCE).
pub const RPL_BOUNCE: &str = "010";

/// Terminal message sent before the server closes the connection.
pub const ERROR: &str = "ERROR";

/// An outbound IRC message: a command followed by its parameters.
///
/// No prefix is ever attached; the redirector identifies itself only through
/// the reason text it sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub command: String,
    pub params: Vec<String>,
}

impl Message {
    pub fn new(command: &str, params: &[&str]) -> Self {
        Self {
            command: command.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Serializes the message into its wire form.
    ///
    /// Parameters are space-separated; the final parameter gets a `:` prefix
    /// when it is empty, contains a space, or itself starts with `:`. The
    /// line is terminated with CRLF.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(64);
        buf.put_slice(self.command.as_bytes());

        for (i, param) in self.params.iter().enumerate() {
            buf.put_u8(b' ');
            if i + 1 == self.params.len() && needs_trailing(param) {
                buf.put_u8(b':');
            }
            buf.put_slice(param.as_bytes());
        }

        buf.put_slice(b"\r\n");
        buf.freeze()
    }
}

fn needs_trailing(param: &str) -> bool {
    param.is_empty() || param.starts_with(':') || param.contains(' ')
}
