//! TextBlock - a block of text with ellipsis, edit, copy and expand.
//!
//! Wires the collaborators together:
//!
//! ```text
//! TextBlockProps ──resolve──► EllipsisConfig / EditConfig / CopyConfig
//!                                 │             │            │
//!                    TruncationController ◄──── Interaction ─┘
//!                                 │   decorations, bypass    │
//!                                 └────────► Composer ◄──────┘
//!                                              │
//!                                          Vec<Span>
//! ```
//!
//! Every interaction change re-syncs the controller: editing or expanding
//! turns truncation off, and the current affordance atoms (including the
//! copied glyph) become the decorations to measure against.
//!
//! # Example
//!
//! ```ignore
//! use spark_typography::*;
//!
//! let scheduler = LocalScheduler::new();
//! let block = TextBlock::new(
//!     TextBlockProps {
//!         content: "The quick brown fox jumps".into(),
//!         ellipsis: Some(Toggle::Flag(true)),
//!         copyable: Some(Toggle::Flag(true)),
//!         ..Default::default()
//!     },
//!     Host::new(Box::new(CellSurface::new()), Rc::new(scheduler.clone())),
//! );
//! block.resize(20);
//! scheduler.run_frame();
//! let spans = block.render();
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use spark_signals::effect;
use tracing::debug;

use crate::compose::{
    Composer, CopySlot, EditSlot, ExpandSlot, Span, COPIED_GLYPH, COPY_GLYPH, EDIT_GLYPH,
};
use crate::config::{clamp_rows, resolve, CopyConfig, EditConfig, EllipsisConfig, Toggle};
use crate::controller::{NativeBlockers, TruncationController, TruncationView};
use crate::locale::{LocaleStrings, LocaleTable};
use crate::measure::Measurer;
use crate::scheduler::Scheduler;
use crate::state::clipboard::{BufferClipboard, ClipboardWriter};
use crate::state::focus;
use crate::state::interaction::{Interaction, InteractionState};
use crate::surface::{RenderSurface, ResizeNotifier};
use crate::types::{Affordance, Attr, ControlId, DecorationFlags};

// =============================================================================
// Props + Host
// =============================================================================

/// Configuration of a text block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBlockProps {
    pub content: String,
    #[serde(flatten)]
    pub decorations: DecorationFlags,
    pub editable: Option<Toggle<EditConfig>>,
    pub copyable: Option<Toggle<CopyConfig>>,
    pub ellipsis: Option<Toggle<EllipsisConfig>>,
}

/// Host collaborators.
pub struct Host {
    pub surface: Box<dyn RenderSurface>,
    pub scheduler: Rc<dyn Scheduler>,
    pub clipboard: Rc<dyn ClipboardWriter>,
    pub locale: Rc<dyn LocaleStrings>,
}

impl Host {
    /// Host with an in-memory clipboard and English labels.
    pub fn new(surface: Box<dyn RenderSurface>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            surface,
            scheduler,
            clipboard: Rc::new(BufferClipboard::new()),
            locale: Rc::new(LocaleTable::default()),
        }
    }

    pub fn with_clipboard(mut self, clipboard: Rc<dyn ClipboardWriter>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_locale(mut self, locale: Rc<dyn LocaleStrings>) -> Self {
        self.locale = locale;
        self
    }
}

// =============================================================================
// TextBlock
// =============================================================================

/// The assembled component.
pub struct TextBlock {
    id: ControlId,
    content: Rc<RefCell<String>>,
    edit_text: Option<String>,
    text_activates: bool,
    composer: Rc<Composer>,
    interaction: Rc<Interaction>,
    controller: Rc<TruncationController>,
    editing_effect: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl TextBlock {
    pub fn new(props: TextBlockProps, host: Host) -> Self {
        let (ellipsis_on, ellipsis) = resolve(props.ellipsis.as_ref(), &EllipsisConfig::default());
        let (edit_on, edit) = resolve(props.editable.as_ref(), &EditConfig::default());
        let (copy_on, copy) = resolve(props.copyable.as_ref(), &CopyConfig::default());

        let composer = Rc::new(build_composer(
            &props,
            ellipsis_on.then_some(&ellipsis),
            edit_on.then_some(&edit),
            copy_on.then_some(&copy),
            host.locale.as_ref(),
        ));

        let id = ControlId::next();
        let return_focus = composer
            .edit
            .as_ref()
            .filter(|slot| slot.show_icon)
            .map_or(id, |slot| slot.control);

        let interaction = Rc::new(Interaction::new(
            host.scheduler.clone(),
            host.clipboard.clone(),
            if edit_on { edit.clone() } else { EditConfig::default() },
            copy.clone(),
            ellipsis.on_expand.clone(),
            return_focus,
        ));

        let controller = Rc::new(TruncationController::new(
            Measurer::new(host.surface),
            host.scheduler.clone(),
            ellipsis_on,
            &ellipsis,
            NativeBlockers::from_config(&ellipsis, edit_on, copy_on),
            &props.content,
        ));

        let block = Self {
            id,
            content: Rc::new(RefCell::new(props.content)),
            edit_text: edit.text.clone(),
            text_activates: edit_on && edit.trigger().text_activates(),
            composer,
            interaction,
            controller,
            editing_effect: RefCell::new(None),
        };

        let weak_interaction = Rc::downgrade(&block.interaction);
        let weak_controller = Rc::downgrade(&block.controller);
        let composer = block.composer.clone();
        block.interaction.set_listener(Rc::new(move || {
            sync(&weak_interaction, &weak_controller, &composer);
        }));
        block.sync();

        // Controlled editing changes outside any transition; follow it.
        if let Some(controlled) = edit.editing.clone().filter(|_| edit_on) {
            let weak_interaction = Rc::downgrade(&block.interaction);
            let weak_controller = Rc::downgrade(&block.controller);
            let composer = block.composer.clone();
            let stop = effect(move || {
                let _ = controlled.get();
                sync(&weak_interaction, &weak_controller, &composer);
            });
            *block.editing_effect.borrow_mut() = Some(Box::new(stop));
        }

        debug!(id = block.id.0, ellipsis_on, edit_on, copy_on, "text block created");
        block
    }

    /// Identifier of the block itself, used as its resize target.
    pub fn id(&self) -> ControlId {
        self.id
    }

    fn sync(&self) {
        sync(
            &Rc::downgrade(&self.interaction),
            &Rc::downgrade(&self.controller),
            &self.composer,
        );
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    pub fn content(&self) -> String {
        self.content.borrow().clone()
    }

    /// Replace the text. Re-measures.
    pub fn set_content(&self, content: &str) {
        *self.content.borrow_mut() = content.to_string();
        self.controller.set_text(content);
    }

    /// Change the line budget. Non-positive values clamp to 1.
    pub fn set_rows(&self, rows: i64) {
        self.controller.set_rows(clamp_rows(rows));
    }

    /// Container width in cells.
    pub fn resize(&self, width: usize) {
        self.controller.set_width(width);
    }

    /// Follow resizes of this block's container.
    pub fn attach(&self, notifier: &dyn ResizeNotifier) {
        self.controller.attach(notifier, self.id);
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    /// Activate an affordance (click / Enter). Returns true if a transition
    /// happened.
    pub fn activate(&self, control: ControlId) -> bool {
        let Some(kind) = self.composer.affordance_of(control) else {
            return false;
        };
        focus::focus(control);
        debug!(?kind, "affordance activated");
        match kind {
            Affordance::Expand => self.expand(),
            Affordance::Edit => self.start_edit(),
            Affordance::Copy => self.copy(),
        }
    }

    /// Activate the text itself. Starts editing when the edit trigger
    /// includes the text.
    pub fn activate_text(&self) -> bool {
        self.text_activates && self.start_edit()
    }

    pub fn start_edit(&self) -> bool {
        self.composer.edit.is_some() && self.interaction.start_edit()
    }

    /// Commit the edit surface value.
    pub fn save(&self, value: &str) {
        if self.interaction.is_editing() {
            self.interaction.save(value);
        }
    }

    /// Discard the edit.
    pub fn cancel(&self) {
        if self.interaction.is_editing() {
            self.interaction.cancel_edit();
        }
    }

    pub fn copy(&self) -> bool {
        if self.composer.copy.is_none() {
            return false;
        }
        let content = self.content();
        self.interaction.copy(&content)
    }

    pub fn expand(&self) -> bool {
        self.composer.expand.is_some() && self.interaction.expand()
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    /// Compose the current output.
    pub fn render(&self) -> Vec<Span> {
        self.sync();
        let view = self.controller.view();
        let state = self.interaction.state();
        let edit_value = self.edit_text.clone().unwrap_or_else(|| self.content());
        self.composer.compose(&view, state, &edit_value)
    }

    pub fn view(&self) -> TruncationView {
        self.sync();
        self.controller.view()
    }

    /// Whether the text is currently truncated. `None` under native
    /// truncation or before the first measurement.
    pub fn is_truncated(&self) -> Option<bool> {
        self.view().is_truncated
    }

    pub fn state(&self) -> InteractionState {
        self.sync();
        self.interaction.state()
    }

    pub fn controller(&self) -> &TruncationController {
        &self.controller
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Control id of an affordance, if that affordance is enabled.
    pub fn control(&self, kind: Affordance) -> Option<ControlId> {
        match kind {
            Affordance::Expand => self.composer.expand.as_ref().map(|s| s.control),
            Affordance::Edit => self.composer.edit.as_ref().map(|s| s.control),
            Affordance::Copy => self.composer.copy.as_ref().map(|s| s.control),
        }
    }

    /// Cancel pending frames and timers and stop following resizes.
    pub fn teardown(&self) {
        if let Some(stop) = self.editing_effect.borrow_mut().take() {
            stop();
        }
        self.interaction.teardown();
        self.controller.teardown();
    }
}

impl Drop for TextBlock {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn sync(interaction: &Weak<Interaction>, controller: &Weak<TruncationController>, composer: &Composer) {
    let (Some(interaction), Some(controller)) = (interaction.upgrade(), controller.upgrade()) else {
        return;
    };
    let state = interaction.state();
    controller.set_bypassed(state.is_editing() || state.expanded);
    controller.set_decorations(composer.decorations(state));
}

fn build_composer(
    props: &TextBlockProps,
    ellipsis: Option<&EllipsisConfig>,
    edit: Option<&EditConfig>,
    copy: Option<&CopyConfig>,
    locale: &dyn LocaleStrings,
) -> Composer {
    Composer {
        attr: Attr::from_flags(&props.decorations),
        suffix: ellipsis.and_then(|e| e.suffix.clone()),
        expand: ellipsis.filter(|e| e.is_expandable()).map(|e| ExpandSlot {
            control: ControlId::next(),
            label: e.symbol.clone().unwrap_or_default(),
        }),
        edit: edit.map(|e| EditSlot {
            control: ControlId::next(),
            glyph: e.icon.clone().unwrap_or_else(|| EDIT_GLYPH.to_string()),
            label: e.tooltip.clone().unwrap_or_default(),
            show_icon: e.trigger().shows_icon(),
            max_length: e.max_length,
            auto_size: e.auto_size,
        }),
        copy: copy.map(|c| CopySlot {
            control: ControlId::next(),
            glyph: c.icon.clone().unwrap_or_else(|| COPY_GLYPH.to_string()),
            copied_glyph: c.copied_icon.clone().unwrap_or_else(|| COPIED_GLYPH.to_string()),
            label: String::new(),
            copied_label: String::new(),
            tooltips: c.tooltips.unwrap_or(true),
        }),
    }
    .with_locale(locale)
}

// =============================================================================
// Tests
// =============================================================================
