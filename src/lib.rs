pub mod config;
pub mod error;
pub mod types {
    pub mod caption_data;
}
pub mod parsing;
pub mod markup;
pub mod document;
pub mod targeting;
pub mod highlight;
pub mod sequencing;
pub mod translation;
pub mod interaction;
pub mod player;

pub use config::Config;
pub use document::{CaptionDocument, CaptionSurface};
pub use interaction::OverlaySession;
