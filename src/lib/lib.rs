//!
//! memegen  -- Meme templates, captions & compositing
//!

#[macro_use] extern crate lazy_static;
#[macro_use] extern crate log;
#[macro_use] extern crate serde_derive;

#[cfg(test)] #[macro_use] extern crate maplit;
#[cfg(test)] #[macro_use] extern crate spectral;


mod compose;
mod editor;
mod fetch;
mod model;
mod resources;
mod util;


pub use compose::*;
pub use editor::*;
pub use fetch::*;
pub use model::*;
pub use resources::*;
pub use util::cache::*;
