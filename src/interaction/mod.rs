pub mod clicks;
pub mod controller;
pub mod session;
pub mod tooltip;

pub use clicks::ClickGate;
pub use controller::{transition, Effect, Event, InteractionController, Phase, Selection};
pub use session::OverlaySession;
pub use tooltip::{Tooltip, TooltipBody, TooltipSlot};
