//! Terminal presentation: theme handling and rendering of the reading card.
//!
//! Nothing here holds global state; the resolved `Palette` is passed to every
//! render call.

mod render;
mod theme;

pub use render::*;
pub use theme::*;
