/// Decimal conversion helpers.
///
/// This module provides safe functions for converting decimals into the machine
/// integers used for positions, calendar fields and scales. Use these helpers
/// whenever a FEEL number has to become an `i64`, `i32` or `u32` in a way that
/// refuses fractional or out-of-range values instead of silently truncating.
pub mod num;
