//! WebSocket handlers

pub mod events;
