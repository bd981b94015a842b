pub mod message;
pub mod trace;
pub mod turn;

pub use message::*;
pub use trace::*;
pub use turn::*;
