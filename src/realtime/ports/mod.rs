//! Port definitions for event publication.

mod dispatcher;

pub use dispatcher::EventDispatcher;
