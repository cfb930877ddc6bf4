//! Wire protocol for Fadeline.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`Snapshot`], [`Seat`],
//!   [`Difficulty`], [`ConnectionId`]) — everything that travels on the wire
//!   plus the identity newtype every other layer keys on.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer sits below everything else: it doesn't know about
//! connections, the board engine, or the room — it only knows message shapes.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, ConnectionId, Difficulty, Scores, Seat, SeatView,
    ServerEvent, Snapshot,
};
