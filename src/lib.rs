//! Todo Assist — AI-assisted to-do list service.

pub mod annotator;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod store;
pub mod todos;
