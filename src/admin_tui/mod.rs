//! Sneaker store admin terminal UI
//!
//! A ratatui application with one screen per route, a navigation panel that
//! collapses on narrow terminals, and request results delivered back to the
//! event loop over a channel.

pub mod app;
pub mod components;
pub mod events;
pub mod screens;
pub mod traits;
pub mod ui;

pub use app::{App, Route};
