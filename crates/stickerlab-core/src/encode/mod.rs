//! PNG encoding for crops and stickers.
//!
//! PNG keeps the alpha channel, so the transparent corners of a circular crop
//! survive the trip to the display layer.

mod png;

pub use png::{encode_png, EncodeError};
