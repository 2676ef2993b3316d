//! Public library API for decoding, validating, and re-encoding Apple property lists.

/// Binary and XML plist decoding, XML encoding, validation, and the document façade.
pub mod plist;
