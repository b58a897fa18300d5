//! Interaction guards between the embedded renderer and the host.
//!
//! - External links: plain clicks on `_top` anchors go to the host's URL opener
//! - Save/print shortcuts: deferred to the host's keybindings
//! - Print: rerouted to the host's print command (see `ViewerSession::on_print`)

/// Keyboard modifier state of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub fn any(self) -> bool {
        self.ctrl || self.shift || self.alt || self.meta
    }

    /// Ctrl on Linux/Windows, Cmd on macOS.
    fn primary(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A click inside the renderer.
#[derive(Debug, Clone, Default)]
pub struct LinkClick {
    /// Pointer button, `0` = primary.
    pub button: u16,
    pub modifiers: Modifiers,
    /// Tag name of the clicked element.
    pub tag_name: String,
    /// The element's `target` attribute.
    pub target: Option<String>,
    pub href: Option<String>,
}

/// URL to open externally, if the click is a plain click on a `_top` link.
pub fn external_link(click: &LinkClick) -> Option<&str> {
    let plain = click.button == 0 && !click.modifiers.any();
    let anchor = click.tag_name.eq_ignore_ascii_case("a");
    let top = click.target.as_deref() == Some("_top");
    if plain && anchor && top {
        click.href.as_deref().filter(|href| !href.is_empty())
    } else {
        None
    }
}

/// A key press inside the renderer.
#[derive(Debug, Clone, Default)]
pub struct KeyChord {
    /// Logical key value, e.g. `"s"` or `"ArrowDown"`.
    pub key: String,
    pub modifiers: Modifiers,
}

/// Who handles a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Let the renderer handle it.
    PassThrough,
    /// Stop it at capture phase so the host keybinding fires.
    DeferToHost,
}

/// Save (`s`) and print (`p`) with the primary modifier belong to the host.
pub fn arbitrate_key(chord: &KeyChord) -> KeyDisposition {
    let host_key = chord.key.eq_ignore_ascii_case("s") || chord.key.eq_ignore_ascii_case("p");
    if host_key && chord.modifiers.primary() && !chord.modifiers.alt {
        KeyDisposition::DeferToHost
    } else {
        KeyDisposition::PassThrough
    }
}
