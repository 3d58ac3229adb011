/// Shared modules for the Mandi client
pub mod banner;
pub mod chart;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod engine;
pub mod router;
pub mod state;
pub mod view;
pub mod widget;
