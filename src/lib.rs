//! Quiz Coach - Conversational Training Bot
//!
//! This crate implements a webhook-driven training assistant that quizzes
//! users with multiple-choice questions synthesized by a language model,
//! tracking per-user progress through difficulty levels.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
