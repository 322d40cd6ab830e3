pub mod actions;
pub mod api;
pub mod app;
pub mod auth;
pub mod chat;
pub mod components;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod event_loop;
pub mod keybindings;
pub mod layout;
pub mod prefs;
pub mod session;
pub mod storage;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod widget;
