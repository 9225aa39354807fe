#![allow(dead_code)]

use basalt_common::constants::PROTOCOL_VERSION;
use basalt_protocol::handshake::HandshakePacket;
use basalt_protocol::login::{
    EncryptionRequestPacket, EncryptionResponsePacket, LoginStartPacket, LoginSuccessPacket,
    SetCompressionPacket,
};
use basalt_protocol::{FrameCodec, Packet, RawPacket};
use basalt_server::{Server, ServerConfig};
use futures::{SinkExt, StreamExt};
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};
use tokio_util::codec::Framed;

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Offline, uncompressed, with a small view.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        encryption: false,
        compression_threshold: -1,
        view_distance: 2,
        ..ServerConfig::default()
    }
}

/// Starts a server on an ephemeral local port.
pub async fn start_server(config: ServerConfig) -> (Arc<Server>, SocketAddr) {
    let server = Server::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(Arc::clone(&server).serve(listener));
    (server, address)
}

/// Waits until `count` players are online.
pub async fn wait_for_players(server: &Server, count: usize) {
    timeout(RECEIVE_TIMEOUT, async {
        while server.sessions().read().await.count() != count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("player count never settled");
}

/// A minimal client speaking through the same frame codec as the server.
pub struct TestClient {
    framed: Framed<TcpStream, FrameCodec>,
}

impl TestClient {
    pub async fn connect(address: SocketAddr) -> Self {
        let socket = TcpStream::connect(address).await.unwrap();
        Self {
            framed: Framed::new(socket, FrameCodec::new()),
        }
    }

    pub async fn send<P: Packet>(&mut self, packet: &P) {
        self.framed
            .send(RawPacket::from_packet(packet).unwrap())
            .await
            .unwrap();
    }

    pub async fn send_raw(&mut self, packet: RawPacket) {
        self.framed.send(packet).await.unwrap();
    }

    /// The next frame, or `None` once the server closed the socket.
    pub async fn next_raw(&mut self) -> Option<RawPacket> {
        timeout(RECEIVE_TIMEOUT, self.framed.next())
            .await
            .expect("timed out waiting for a packet")
            .map(|frame| frame.unwrap())
    }

    pub async fn receive<P: Packet>(&mut self) -> P {
        let raw = self.next_raw().await.expect("connection closed");
        raw.decode::<P>().unwrap()
    }

    /// Skips frames until one with `P`'s id arrives.
    pub async fn receive_until<P: Packet>(&mut self) -> P {
        loop {
            let raw = self.next_raw().await.expect("connection closed");
            if raw.id == P::packet_id() {
                return raw.decode::<P>().unwrap();
            }
        }
    }

    pub async fn is_closed(&mut self) -> bool {
        loop {
            match timeout(RECEIVE_TIMEOUT, self.framed.next()).await {
                Ok(None) | Ok(Some(Err(_))) => return true,
                Ok(Some(Ok(_))) => continue,
                Err(_) => return false,
            }
        }
    }

    pub fn codec_mut(&mut self) -> &mut FrameCodec {
        self.framed.codec_mut()
    }

    pub async fn handshake(&mut self, protocol_version: i32, next_state: i32) {
        self.send(&HandshakePacket {
            protocol_version,
            server_address: "localhost".to_owned(),
            server_port: 25565,
            next_state,
        })
        .await;
    }

    /// Logs in as `username`, answering encryption and compression as the
    /// server asks, and stops after Login Success.
    pub async fn login(address: SocketAddr, username: &str) -> (Self, LoginSuccessPacket) {
        let mut client = Self::connect(address).await;
        client.handshake(PROTOCOL_VERSION, 2).await;
        client
            .send(&LoginStartPacket {
                username: username.to_owned(),
            })
            .await;

        loop {
            let raw = client.next_raw().await.expect("connection closed during login");
            match raw.id {
                0x01 => {
                    let request: EncryptionRequestPacket = raw.decode().unwrap();
                    client.answer_encryption(&request).await;
                }
                0x02 => {
                    let success: LoginSuccessPacket = raw.decode().unwrap();
                    return (client, success);
                }
                0x03 => {
                    let packet: SetCompressionPacket = raw.decode().unwrap();
                    client
                        .codec_mut()
                        .enable_compression(packet.threshold as usize)
                        .unwrap();
                }
                other => panic!("unexpected login packet 0x{:02X}", other),
            }
        }
    }

    async fn answer_encryption(&mut self, request: &EncryptionRequestPacket) {
        let public_key = RsaPublicKey::from_public_key_der(&request.public_key).unwrap();
        let shared_secret: [u8; 16] = rand::random();
        let response = {
            let mut rng = rand::thread_rng();
            EncryptionResponsePacket {
                shared_secret: public_key
                    .encrypt(&mut rng, Pkcs1v15Encrypt, &shared_secret)
                    .unwrap(),
                verify_token: public_key
                    .encrypt(&mut rng, Pkcs1v15Encrypt, &request.verify_token)
                    .unwrap(),
            }
        };
        self.send(&response).await;
        self.codec_mut().enable_encryption(&shared_secret).unwrap();
    }
}
