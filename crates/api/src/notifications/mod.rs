//! Event bus consumers that push to browsers.
//!
//! The [`StockFeed`] subscribes to the event bus and forwards every
//! inventory event to all connected WebSocket clients.

pub mod stock_feed;

pub use stock_feed::StockFeed;
