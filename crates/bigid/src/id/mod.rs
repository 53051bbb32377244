mod bigid;
mod text;

pub use bigid::*;
pub use text::*;
