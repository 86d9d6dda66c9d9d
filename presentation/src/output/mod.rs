//! Console output: formatting and live stream printing

pub mod console;
pub mod printer;
