use pickscene_common::PickTag;
use std::collections::HashMap;

/// Outcome of a click.
///
/// Hosts consume actions, never raw pointer events, so the desktop window
/// and the headless CLI share the same dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A bound object was clicked.
    Activate { tag: PickTag, label: String },
    /// An object without a binding was clicked.
    Unbound(PickTag),
    /// The click hit nothing.
    NoSelection,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Activate { label, .. } => write!(f, "{label}"),
            Action::Unbound(tag) => write!(f, "click on unbound object {tag}"),
            Action::NoSelection => write!(f, "no selection"),
        }
    }
}

/// Tag to click label mapping.
#[derive(Debug, Clone, Default)]
pub struct ActionMap {
    bindings: HashMap<PickTag, String>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `tag`; rebinding replaces the previous label.
    pub fn bind(&mut self, tag: impl Into<PickTag>, label: impl Into<String>) {
        self.bindings.insert(tag.into(), label.into());
    }

    pub fn label(&self, tag: &PickTag) -> Option<&str> {
        self.bindings.get(tag).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolve a click on the currently hovered tag, if any.
    pub fn dispatch(&self, hovered: Option<&PickTag>) -> Action {
        let action = match hovered {
            None => Action::NoSelection,
            Some(tag) => match self.bindings.get(tag) {
                Some(label) => Action::Activate {
                    tag: tag.clone(),
                    label: label.clone(),
                },
                None => Action::Unbound(tag.clone()),
            },
        };
        tracing::info!(%action, "click");
        action
    }
}

impl<T: Into<PickTag>, L: Into<String>> FromIterator<(T, L)> for ActionMap {
    fn from_iter<I: IntoIterator<Item = (T, L)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (tag, label) in iter {
            map.bind(tag, label);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_map() -> ActionMap {
        (1..=3)
            .map(|n| (format!("object-{n}"), format!("click on object {n}")))
            .map(|(tag, label)| (PickTag::new(tag), label))
            .collect()
    }

    #[test]
    fn each_object_dispatches_its_own_label() {
        let map = demo_map();
        for n in 1..=3 {
            let tag = PickTag::new(format!("object-{n}"));
            assert_eq!(
                map.dispatch(Some(&tag)),
                Action::Activate {
                    tag: tag.clone(),
                    label: format!("click on object {n}"),
                }
            );
        }
    }

    #[test]
    fn no_hover_is_no_selection() {
        assert_eq!(demo_map().dispatch(None), Action::NoSelection);
    }

    #[test]
    fn unknown_tag_is_unbound() {
        let tag = PickTag::from("model/chip");
        assert_eq!(demo_map().dispatch(Some(&tag)), Action::Unbound(tag));
    }

    #[test]
    fn rebinding_replaces_label() {
        let mut map = demo_map();
        map.bind("object-1", "open");
        assert_eq!(map.label(&PickTag::from("object-1")), Some("open"));
        assert_eq!(map.len(), 3);
    }
}
