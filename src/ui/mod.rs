mod progress;
mod theme;

pub use progress::TranslationProgress;
pub use theme::Style;
