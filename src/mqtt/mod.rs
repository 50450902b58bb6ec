//! # MQTT Device Layer
//!
//! Connects the widget core to covers exposed over MQTT, using the topic
//! layout of Home Assistant's MQTT cover: for a cover with base topic `B`
//! the device publishes `B/state` and `B/position` and listens on `B/set`
//! and `B/set_position`.
//!
//! ```text
//! mqtt/
//! ├── config.rs    - broker settings and per-cover topics
//! ├── messages.rs  - payload parsing and outgoing commands
//! ├── state.rs     - latest report per cover, turned into snapshots
//! ├── sink.rs      - CoverCommandSink feeding the link task
//! └── link.rs      - connection state machine running in tokio
//! ```
//!
//! Only `link.rs` touches the network. Everything the UI thread uses is
//! non-blocking: updates and commands cross over bounded channels.

pub mod config;
pub mod link;
pub mod messages;
pub mod sink;
pub mod state;
