// src/printer/mod.rs

//! Console output: colored banners and error messages, byte-oriented
//! echoing of processed lines.

pub mod printers;
