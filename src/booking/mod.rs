//! Seat-reservation core: the seat ledger enforces per-trip seat range and
//! uniqueness, the order coordinator wraps multi-ticket orders in one
//! transaction so they commit or roll back as a unit.

pub mod orders;
pub mod seats;
