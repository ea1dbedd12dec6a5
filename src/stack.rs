//! The container stack: an explicit LIFO of open object/array frames over a
//! live value tree.
//!
//! Every frame points at an aggregate that is already linked into its parent
//! at the moment the frame is pushed, so the entity's root value can be read
//! mid-construction without any reconstruction step. The pointer discipline
//! follows a zipper: mutations go only through the top frame, and a node an
//! ancestor frame points at is never moved while the frame is live (inserting
//! into the top aggregate can only relocate that aggregate's own children,
//! which no frame references).

use std::ptr::NonNull;

use crate::value::{Map, Value};

/// The kind of an open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContainerKind {
    Object,
    Array,
}

/// A key or index linking a frame's aggregate into its parent.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PathComponent {
    Key(String),
    Index(usize),
}

#[derive(Debug)]
struct Frame {
    kind: ContainerKind,
    node: NonNull<Value>,
    /// How this aggregate is reachable from its parent. `None` for the root
    /// frame.
    link: Option<PathComponent>,
}

/// Push/pop only; no search. Depth is unbounded except by memory.
#[derive(Debug, Default)]
pub(crate) struct ContainerStack {
    root: Option<Box<Value>>,
    frames: Vec<Frame>,
}

impl ContainerStack {
    fn empty_aggregate(kind: ContainerKind) -> Value {
        match kind {
            ContainerKind::Object => Value::Object(Map::new()),
            ContainerKind::Array => Value::Array(Vec::new()),
        }
    }

    /// Creates the entity root and pushes the first frame.
    pub(crate) fn open_root(&mut self, kind: ContainerKind) {
        debug_assert!(self.frames.is_empty());
        let mut root = Box::new(Self::empty_aggregate(kind));
        let node = NonNull::from(root.as_mut());
        self.root = Some(root);
        self.frames.push(Frame {
            kind,
            node,
            link: None,
        });
    }

    /// Inserts a fresh aggregate into the top container and pushes a frame
    /// for it. `key` is consumed when the top container is an object and
    /// ignored otherwise.
    pub(crate) fn open_child(&mut self, kind: ContainerKind, key: Option<String>) {
        let child = Self::empty_aggregate(kind);
        let Some(top) = self.frames.last_mut() else {
            return;
        };
        // SAFETY: `node` points into the tree owned by `self.root`; only the
        // top frame is dereferenced and no other reference to the tree is
        // live during this call.
        let aggregate = unsafe { top.node.as_mut() };
        let (node, link) = match aggregate {
            Value::Object(map) => {
                let key = key.unwrap_or_default();
                map.insert(key.clone(), child);
                let Some(node) = map.get_mut(&key) else {
                    return;
                };
                (NonNull::from(node), PathComponent::Key(key))
            }
            Value::Array(items) => {
                items.push(child);
                let index = items.len() - 1;
                (NonNull::from(&mut items[index]), PathComponent::Index(index))
            }
            _ => return,
        };
        self.frames.push(Frame {
            kind,
            node,
            link: Some(link),
        });
    }

    /// Stores a scalar in the top container: under `key` for an object,
    /// appended for an array.
    pub(crate) fn commit(&mut self, key: Option<String>, value: Value) {
        let Some(top) = self.frames.last_mut() else {
            return;
        };
        // SAFETY: as in `open_child`.
        let aggregate = unsafe { top.node.as_mut() };
        match aggregate {
            Value::Object(map) => {
                map.insert(key.unwrap_or_default(), value);
            }
            Value::Array(items) => items.push(value),
            _ => {}
        }
    }

    /// Pops the top frame. Returns `true` when the stack is now empty, i.e.
    /// the entity root has been closed.
    pub(crate) fn pop(&mut self) -> bool {
        self.frames.pop();
        self.frames.is_empty()
    }

    pub(crate) fn top_kind(&self) -> Option<ContainerKind> {
        self.frames.last().map(|f| f.kind)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The live in-construction root, if any.
    pub(crate) fn root_ref(&self) -> Option<&Value> {
        self.root.as_deref()
    }

    /// Takes the root out, discarding any remaining frames.
    pub(crate) fn take_root(&mut self) -> Option<Value> {
        self.frames.clear();
        self.root.take().map(|b| *b)
    }

    pub(crate) fn clear(&mut self) {
        self.frames.clear();
        self.root = None;
    }

    /// Links of every frame below the root, outermost first. Walking these
    /// components from the root reaches the innermost open container.
    pub(crate) fn open_path(&self) -> impl Iterator<Item = &PathComponent> {
        self.frames.iter().filter_map(|f| f.link.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_linkage_exposes_root_mid_construction() {
        let mut stack = ContainerStack::default();
        stack.open_root(ContainerKind::Object);
        stack.open_child(ContainerKind::Array, Some("items".to_string()));
        stack.commit(None, Value::Number(1.0));

        // The nested array is visible from the root while still open.
        let root = stack.root_ref().unwrap();
        assert_eq!(
            root.get("items").and_then(Value::as_array).map(Vec::len),
            Some(1)
        );

        assert!(!stack.pop());
        assert!(stack.pop());
        let root = stack.take_root().unwrap();
        assert_eq!(
            root.get("items").unwrap().index(0),
            Some(&Value::Number(1.0))
        );
    }

    #[test]
    fn open_path_tracks_nesting() {
        let mut stack = ContainerStack::default();
        stack.open_root(ContainerKind::Object);
        stack.open_child(ContainerKind::Object, Some("a".to_string()));
        stack.open_child(ContainerKind::Array, Some("b".to_string()));
        stack.commit(None, Value::Null);
        stack.open_child(ContainerKind::Object, None);

        let path: Vec<_> = stack.open_path().cloned().collect();
        assert_eq!(
            path,
            vec![
                PathComponent::Key("a".to_string()),
                PathComponent::Key("b".to_string()),
                PathComponent::Index(1),
            ]
        );
    }

    #[test]
    fn duplicate_keys_overwrite_in_place() {
        let mut stack = ContainerStack::default();
        stack.open_root(ContainerKind::Object);
        stack.commit(Some("k".to_string()), Value::Number(1.0));
        stack.commit(Some("k".to_string()), Value::Number(2.0));
        assert!(stack.pop());
        let root = stack.take_root().unwrap();
        assert_eq!(root.get("k"), Some(&Value::Number(2.0)));
        assert_eq!(root.as_object().unwrap().len(), 1);
    }
}
