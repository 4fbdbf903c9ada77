//! Career Coach — scripted resume-coaching protocol core.

pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod protocol;
