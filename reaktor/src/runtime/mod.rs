//! Thread hosting for polled nuklei.

mod runner;

pub use runner::NukleusRunner;
