//! Reporting front ends over a chanlog snapshot: an interactive prompt and a
//! small HTML viewer. Both only call the read-only query layer.

pub mod commands;
pub mod web;
