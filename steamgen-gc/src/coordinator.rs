//! Game coordinator dispatch over a Steam client connection.

use crate::messages::{CMsgClientGamesPlayed, CMsgGcClient, EMsg, GamePlayed};
use crate::packet::{GcMessage, GcPacket, PROTO_MASK, PacketDecodeError};
use bytes::{Bytes, BytesMut};
use prost::Message;
use tracing::{debug, warn};

/// Client message as seen by the game coordinator layer.
///
/// `body` is the message body after the client header, which the connection
/// has already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub emsg: EMsg,
    pub body: Bytes,
}

impl Packet {
    pub fn new(emsg: EMsg, body: impl Into<Bytes>) -> Self {
        Self {
            emsg,
            body: body.into(),
        }
    }

    /// Encode a protobuf client message.
    pub fn protobuf<M: Message>(emsg: EMsg, message: &M) -> Self {
        Self::new(emsg, message.encode_to_vec())
    }
}

/// Outgoing side of a Steam client connection.
pub trait ClientConnection {
    fn write(&self, packet: Packet) -> anyhow::Result<()>;
}

/// Receives every decoded game coordinator packet.
pub trait GcPacketHandler {
    fn handle_gc_packet(&self, packet: &GcPacket);
}

pub struct GameCoordinator<C: ClientConnection> {
    client: C,
    handlers: Vec<Box<dyn GcPacketHandler>>,
}

impl<C: ClientConnection> GameCoordinator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            handlers: Vec::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Handlers are invoked in registration order.
    pub fn register_packet_handler(&mut self, handler: Box<dyn GcPacketHandler>) {
        self.handlers.push(handler);
    }

    /// Dispatch an incoming client message. Anything other than
    /// `ClientFromGC` is ignored; undecodable messages are logged and dropped.
    pub fn handle_packet(&self, packet: &Packet) {
        if packet.emsg != EMsg::CLIENT_FROM_GC {
            return;
        }

        let gc_packet = match decode(&packet.body) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Error reading GC message");
                return;
            }
        };
        debug!(
            app_id = gc_packet.app_id,
            msg_type = gc_packet.msg_type,
            is_proto = gc_packet.is_proto,
            handlers = self.handlers.len(),
            "dispatching GC packet"
        );

        for handler in &self.handlers {
            handler.handle_gc_packet(&gc_packet);
        }
    }

    /// Send a message to the game coordinator of `msg.app_id()`.
    pub fn write(&self, msg: &dyn GcMessage) -> anyhow::Result<()> {
        let mut payload = BytesMut::new();
        msg.serialize(&mut payload);

        let mut msg_type = msg.msg_type();
        if msg.is_proto() {
            msg_type |= PROTO_MASK;
        }

        let envelope = CMsgGcClient {
            msgtype: Some(msg_type),
            appid: Some(msg.app_id()),
            payload: Some(payload.freeze()),
            ..CMsgGcClient::default()
        };
        self.client
            .write(Packet::protobuf(EMsg::CLIENT_TO_GC, &envelope))
    }

    /// Set the games being played. An empty list quits all games.
    pub fn set_games_played(&self, app_ids: &[u64]) -> anyhow::Result<()> {
        let message = CMsgClientGamesPlayed {
            games_played: app_ids
                .iter()
                .map(|id| GamePlayed {
                    game_id: Some(*id),
                    ..GamePlayed::default()
                })
                .collect(),
            ..CMsgClientGamesPlayed::default()
        };
        self.client
            .write(Packet::protobuf(EMsg::CLIENT_GAMES_PLAYED, &message))
    }
}

fn decode(body: &Bytes) -> Result<GcPacket, PacketDecodeError> {
    let envelope = CMsgGcClient::decode(body.clone()).map_err(PacketDecodeError::Envelope)?;
    GcPacket::from_envelope(&envelope)
}
