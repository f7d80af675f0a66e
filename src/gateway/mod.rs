//! Hardware command gateway.
//!
//! Turns logical commands (sensor reads, LED, LCD text, emoticons) into
//! send/settle/read cycles on the single serial channel, and keeps the last
//! known sensor readings.

pub mod cache;
pub mod channel;
pub mod command;
mod command_gateway;
pub mod emoticon;
pub mod lcd;

pub use cache::{ReadingCache, ReadingField, Readings};
pub use channel::ChannelHandle;
pub use command::{
    CommandOutcome, CommandRequest, EmoticonAck, LcdAck, LedAck, LedCommand, SensorQuery,
    SensorRead,
};
pub use command_gateway::{ChannelHealth, CommandGateway, GatewayOptions, SettleDelays};
