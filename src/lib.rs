//! # WorldFood Telegram Bot
//!
//! A Telegram bot that routes a menu-driven dialogue into calls against the
//! Hyperbolic generation endpoints: detailed recipes, food imagery and
//! world-cuisine exploration, keyed by a per-user API key held in a
//! Postgres-backed session store.

pub mod bot;
pub mod config;
pub mod dialogue;
pub mod errors;
pub mod generation;
pub mod prompts;
pub mod session;
