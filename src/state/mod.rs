//! State Module - runtime state of text blocks
//!
//! - **Capability** - memoized native truncation support per surface property
//! - **Clipboard** - clipboard writers (in-memory, OSC 52, system)
//! - **Focus** - focused control signal, focus restoration
//! - **Interaction** - edit / copy / expand state machine

pub mod capability;
pub mod clipboard;
pub mod focus;
pub mod interaction;

pub use capability::{capability_flags, reset_capability_cache, supports, CapabilityFlags};
pub use clipboard::{osc52_sequence, BufferClipboard, ClipboardWriter, Osc52Clipboard};
#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
pub use focus::{blur, focus, get_focused, is_focused, reset_focus_state};
pub use interaction::{Interaction, InteractionState, Mode, COPIED_DURATION};
