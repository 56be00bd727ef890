//! Game coordinator packet layer.
//!
//! Game coordinator (GC) traffic travels inside `ClientToGC` / `ClientFromGC`
//! client messages as a `CMsgGcClient` envelope. [`GameCoordinator`] unwraps
//! incoming envelopes into [`GcPacket`]s for registered handlers and wraps
//! outgoing [`GcMessage`]s for the connection.

pub mod coordinator;
pub mod messages;
pub mod packet;

pub use coordinator::{ClientConnection, GameCoordinator, GcPacketHandler, Packet};
pub use messages::{CMsgClientGamesPlayed, CMsgGcClient, CMsgProtoBufHeader, EMsg, GamePlayed};
pub use packet::{
    GcMessage, GcMsg, GcPacket, GcProtoMsg, NO_JOB, PROTO_MASK, PacketDecodeError, is_proto,
};
