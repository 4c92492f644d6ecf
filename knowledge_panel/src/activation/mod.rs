//! Activation - surfaces knowledge the conversation is currently about.
//!
//! 1. **Signals**: Lowercase tokens supplied by the conversation UI
//! 2. **Matching**: Bidirectional substring containment against entity names
//! 3. **Filtering**: Subjects and related entities that are active, per kind

mod matcher;
mod signals;

pub use matcher::*;
pub use signals::*;
