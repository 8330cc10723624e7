/// Outgoing message construction
///
/// Builds the header block and HTML body sent through the Gmail API and
/// encodes it as unpadded base64url.

pub mod encoder;
pub mod types;

pub use encoder::MessageEncoder;
pub use types::{Alias, EncodedMessage, Recipients};
