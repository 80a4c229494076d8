//! The individual table handlers.
//!
//! Each module owns one table format: its parsed representation, its
//! validation rules, and its re-serialization. All of them follow the
//! same contract (parse with borrowed access to already-parsed siblings,
//! opt in or out of serialization, re-emit); the table registry wires
//! them together.

pub mod glyf;
pub mod hdmx;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod maxp;
