// src/lib.rs

//! feedwatch: change detection and sync for tracked blogs and feeds.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
