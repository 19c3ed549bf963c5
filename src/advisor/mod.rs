pub mod engine;
pub mod image;
pub mod prompts;
pub mod reply;
pub mod request;

pub use engine::PopupAdvisor;
pub use reply::{ElementMetadata, Recommendation};
pub use request::{InvokeRequest, ScreenInput};
