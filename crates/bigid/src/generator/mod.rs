mod atomic;

pub use atomic::*;
