//! Overlay widgets and the two-state lifecycle that owns them

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::dom::{Dom, NodeId, UiScope};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error("host returned no element for the {0:?} scope")]
    CreationFailed(UiScope),

    #[error("host refused to create a <{tag}> child element")]
    ChildCreationFailed { tag: String },

    #[error("host refused to mount the element in the {0:?} scope")]
    AttachFailed(UiScope),
}

/// One overlay element tree, exclusively owned by whoever created it
///
/// Named fields let feature code update individual nodes without querying the
/// DOM. `destroy` consumes the widget so a handle can never be removed twice.
#[derive(Debug)]
pub struct Widget {
    root: NodeId,
    scope: UiScope,
    attached: bool,
    fields: HashMap<&'static str, NodeId>,
}

impl Widget {
    /// Allocate a detached top-level element
    pub fn create(dom: &mut dyn Dom, scope: UiScope) -> Result<Self, OverlayError> {
        let root = dom
            .create_element(scope)
            .ok_or(OverlayError::CreationFailed(scope))?;

        Ok(Self {
            root,
            scope,
            attached: false,
            fields: HashMap::new(),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn scope(&self) -> UiScope {
        self.scope
    }

    /// Whether the widget is currently mounted under its scope root
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Append a `tag` element under `parent` (the root when `None`)
    pub fn append(
        &mut self,
        dom: &mut dyn Dom,
        parent: Option<NodeId>,
        tag: &str,
        class: Option<&str>,
    ) -> Result<NodeId, OverlayError> {
        let node = dom
            .create_child(parent.unwrap_or(self.root), tag)
            .ok_or_else(|| OverlayError::ChildCreationFailed {
                tag: tag.to_string(),
            })?;
        if let Some(class) = class {
            dom.add_class(node, class);
        }
        Ok(node)
    }

    /// Append a text element and remember it as `field`
    pub fn append_field(
        &mut self,
        dom: &mut dyn Dom,
        parent: Option<NodeId>,
        tag: &str,
        field: &'static str,
        text: &str,
    ) -> Result<NodeId, OverlayError> {
        let node = self.append(dom, parent, tag, None)?;
        dom.set_text(node, text);
        self.fields.insert(field, node);
        Ok(node)
    }

    pub fn field(&self, field: &str) -> Option<NodeId> {
        self.fields.get(field).copied()
    }

    /// Set the text of a named field; `false` if the widget has no such field
    pub fn set_text(&self, dom: &mut dyn Dom, field: &str, text: &str) -> bool {
        match self.field(field) {
            Some(node) => {
                dom.set_text(node, text);
                true
            }
            None => false,
        }
    }

    pub fn set_style(&self, dom: &mut dyn Dom, property: &str, value: &str) {
        dom.set_style(self.root, property, value);
    }

    pub fn set_hidden(&self, dom: &mut dyn Dom, hidden: bool) {
        dom.set_hidden(self.root, hidden);
    }

    pub fn attach(&mut self, dom: &mut dyn Dom) -> Result<(), OverlayError> {
        self.attached = dom.attach(self.root);
        if self.attached {
            Ok(())
        } else {
            Err(OverlayError::AttachFailed(self.scope))
        }
    }

    /// Remove the whole tree from the DOM
    pub fn destroy(self, dom: &mut dyn Dom) {
        dom.remove(self.root);
    }
}

/// `Absent`, or `Live` with exactly one widget
#[derive(Debug, Default)]
pub enum OverlayState {
    #[default]
    Absent,
    Live(Widget),
}

impl OverlayState {
    pub fn is_live(&self) -> bool {
        matches!(self, OverlayState::Live(_))
    }

    pub fn widget(&self) -> Option<&Widget> {
        match self {
            OverlayState::Live(widget) => Some(widget),
            OverlayState::Absent => None,
        }
    }

    pub fn widget_mut(&mut self) -> Option<&mut Widget> {
        match self {
            OverlayState::Live(widget) => Some(widget),
            OverlayState::Absent => None,
        }
    }

    /// Live -> Absent. Returns whether a widget was destroyed.
    pub fn destroy(&mut self, dom: &mut dyn Dom) -> bool {
        match std::mem::take(self) {
            OverlayState::Live(widget) => {
                debug!(target: "overlay", "Destroying widget {:?}", widget.root());
                widget.destroy(dom);
                true
            }
            OverlayState::Absent => false,
        }
    }

    /// Replace any live widget with a freshly built one
    ///
    /// The old widget is removed before the new one is allocated, so two
    /// widgets never coexist. If creation, `build` or mounting fails the state is left
    /// `Absent` and nothing of the new widget remains in the DOM.
    pub fn create_with<F>(
        &mut self,
        dom: &mut dyn Dom,
        scope: UiScope,
        build: F,
    ) -> Result<(), OverlayError>
    where
        F: FnOnce(&mut Widget, &mut dyn Dom) -> Result<(), OverlayError>,
    {
        self.destroy(dom);

        let mut widget = Widget::create(dom, scope)?;
        if let Err(err) = build(&mut widget, dom).and_then(|()| widget.attach(dom)) {
            widget.destroy(dom);
            return Err(err);
        }
        debug!(target: "overlay", "Widget {:?} live in {:?}", widget.root(), scope);

        *self = OverlayState::Live(widget);
        Ok(())
    }
}
