//! Flutter bridge crate for ThoughtPad core.

pub mod api;
