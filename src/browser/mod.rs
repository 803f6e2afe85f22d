pub mod contract;
pub mod events;
pub mod search;
pub mod subscriptions;
pub mod synchronizer;
pub mod urls;

pub use contract::{Directive, Navigator, Renderer, TabDisplay, UiConfiguration};
pub use synchronizer::Synchronizer;
