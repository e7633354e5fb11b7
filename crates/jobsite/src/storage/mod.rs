pub mod filesystem;
pub mod preview;

pub use filesystem::{PhotoStore, DEFAULT_PHOTO_EXTENSIONS};
pub use preview::{preview, PhotoPreview};
