pub mod classifier;
pub mod dispatcher;
pub mod fallback;
pub mod selector;
pub mod synthesizer;

pub use classifier::Classifier;
pub use dispatcher::Dispatcher;
pub use selector::Selector;
pub use synthesizer::Synthesizer;
