//! Hardware-independent core of the folio e-paper reader.
//!
//! Everything in here runs on the host: storage, display, buttons and sleep
//! are reached through the traits in [`storage`], [`render`], [`input`] and
//! [`power`], and the board crate supplies the real implementations.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod app;
pub mod battery;
pub mod book;
pub mod buffer;
pub mod config;
pub mod input;
pub mod menu;
pub mod pagination;
pub mod power;
pub mod progress;
pub mod render;
pub mod storage;

#[cfg(test)]
mod testing;
