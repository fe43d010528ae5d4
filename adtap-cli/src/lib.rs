//! Library surface for the adtap CLI.

pub mod check;
