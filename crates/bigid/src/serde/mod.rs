mod bigid;

pub use bigid::*;
