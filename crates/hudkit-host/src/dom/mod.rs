//! UI element abstraction the host exposes to plugins
//!
//! Plugins never hold element references directly; they hold [`NodeId`]s and
//! go through a [`Dom`] for every read and write. A browser host implements
//! this over real elements, [`HeadlessDom`] implements it in memory.

mod headless;

pub use headless::HeadlessDom;

use hudkit_events::InteractionKind;

/// Handle to an element owned by a [`Dom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

/// Handle to a registered interaction listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// Where a top-level element is placed once attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UiScope {
    /// Anchored to the client window, above the game canvas
    ClientRelative,
    /// Inside the client's own UI layer
    ClientInternal,
    /// Inside the game screen mask, moving with game UI
    GameRelative,
}

/// Options for interaction listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerOptions {
    /// Receive the event during the capture phase
    pub capture: bool,
    /// Listener never cancels the event, so input is not held up waiting on it
    pub passive: bool,
}

impl ListenerOptions {
    pub const PASSIVE_CAPTURE: ListenerOptions = ListenerOptions {
        capture: true,
        passive: true,
    };
}

/// Element tree operations available to plugins
///
/// Writes to unknown or removed nodes are ignored; handlers must never fail
/// because an element disappeared underneath them.
pub trait Dom: Send {
    /// Create a detached top-level element for `scope`. `None` means the host
    /// could not provide one.
    fn create_element(&mut self, scope: UiScope) -> Option<NodeId>;

    /// Create an element with `tag` appended under `parent`
    fn create_child(&mut self, parent: NodeId, tag: &str) -> Option<NodeId>;

    /// Mount a top-level element under its scope root
    fn attach(&mut self, node: NodeId) -> bool;

    /// Remove a node and its whole subtree; `false` if it did not exist
    fn remove(&mut self, node: NodeId) -> bool;

    fn set_text(&mut self, node: NodeId, text: &str);

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn add_class(&mut self, node: NodeId, class: &str);

    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    fn set_hidden(&mut self, node: NodeId, hidden: bool);

    /// Current value of a root-level CSS custom property, e.g. `--theme-danger`
    fn css_variable(&self, name: &str) -> Option<String>;

    /// Add a stylesheet once per `key`; returns `false` if already present
    fn inject_stylesheet(&mut self, key: &str, css: &str) -> bool;

    fn add_event_listener(&mut self, kind: InteractionKind, options: ListenerOptions)
    -> ListenerId;

    fn remove_event_listener(&mut self, listener: ListenerId) -> bool;
}
