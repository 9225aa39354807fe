pub mod buffer;
pub mod chat;
pub mod constants;
pub mod error;
pub mod state;
pub mod types;

pub use buffer::PacketBuffer;
pub use chat::Chat;
pub use error::BasaltError;
pub use state::ConnectionState;
pub use types::{BlockPosition, Position, Result, Rotation};
