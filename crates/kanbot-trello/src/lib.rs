//! # Kanbot Trello
//! Trello REST adapter — implements the `BoardService` seam over reqwest.

pub mod client;

pub use client::TrelloClient;
