//! Plain data types shared by the engines. No actor or transport concerns here.

pub mod cart;
pub mod comment;
pub mod engagement;
pub mod reel;
pub mod search;

pub use cart::*;
pub use comment::*;
pub use engagement::*;
pub use reel::*;
pub use search::*;
