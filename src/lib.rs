//! # spark-typography
//!
//! Typography block for terminal UIs: a text block with measured ellipsis,
//! inline edit, copy-to-clipboard and expand affordances.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! interaction state.
//!
//! ## Architecture
//!
//! ```text
//! TextBlockProps → resolve → TruncationController ─┬─ NativeStyle (StyleHint)
//!                                                  └─ Measurer (binary search)
//!                          → Interaction (edit / copied / expanded)
//!                          → Composer → Vec<Span> → renderer (ANSI)
//! ```
//!
//! Measurement runs on the next frame of a [`Scheduler`]; a burst of
//! resizes or content changes costs one measurement.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Attr, Size, TruncationResult, ControlId)
//! - [`config`] - Boolean-or-object toggles and option structs
//! - [`layout`] - Unicode width and word wrapping
//! - [`surface`] - Render surfaces and resize notification
//! - [`measure`] - Measurement-based truncation
//! - [`controller`] - Native vs. measured truncation
//! - [`state`] - Capability cache, clipboard, focus, interaction state
//! - [`compose`] - Output assembly
//! - [`renderer`] - Terminal output
//! - [`text_block`] - The assembled component

pub mod compose;
pub mod config;
pub mod controller;
pub mod error;
pub mod layout;
pub mod locale;
pub mod measure;
pub mod renderer;
pub mod scheduler;
pub mod state;
pub mod surface;
pub mod text_block;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{Result, TypographyError};

pub use config::{
    resolve, AutoSize, Callback, ChangeCallback, CopyConfig, EditConfig, EditTrigger,
    EllipsisCallback, EllipsisConfig, Merge, Toggle,
};

pub use layout::{measure_text_height, string_width, wrap_text_word};

pub use surface::{
    CellSurface, Constraints, Fit, HeadlessSurface, RenderSurface, ResizeHub, ResizeNotifier,
    StyleProperty,
};

pub use measure::Measurer;

pub use scheduler::{FrameHandle, LocalScheduler, Scheduler, TimerHandle};

pub use controller::{ControllerState, NativeBlockers, TruncationController, TruncationView};

pub use state::{
    // Capability
    capability_flags, supports, reset_capability_cache, CapabilityFlags,
    // Clipboard
    osc52_sequence, BufferClipboard, ClipboardWriter, Osc52Clipboard,
    // Focus
    focus, blur, get_focused, is_focused, reset_focus_state,
    // Interaction
    Interaction, InteractionState, Mode, COPIED_DURATION,
};

#[cfg(feature = "system-clipboard")]
pub use state::SystemClipboard;

pub use locale::{LocaleStrings, LocaleTable};

pub use compose::{Composer, EditSurfaceProps, Span};

pub use renderer::{plain_text, write_spans};

pub use text_block::{Host, TextBlock, TextBlockProps};
