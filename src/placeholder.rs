//! Placeholder resolution.
//!
//! Decorator and annotation placeholders are unwound into marks on the spans
//! below them. Resolution works purely on [`TypedObject`] trees; it never
//! touches the DOM.

use rustc_hash::FxHashSet;

use crate::transform::is_blank;
use crate::types::{Block, MarkDef, TypedObject};

// =============================================================================
// MarkDefAccumulator
// =============================================================================

/// Mark definitions registered during one conversion.
///
/// Owned by a single invocation; never shared between conversions.
#[derive(Debug, Default)]
pub struct MarkDefAccumulator {
    defs: Vec<MarkDef>,
    keys: FxHashSet<String>,
}

impl MarkDefAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition; later registrations of the same key are ignored
    pub fn register(&mut self, def: MarkDef) {
        if self.keys.insert(def.key.clone()) {
            self.defs.push(def);
        }
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions whose key one of the block's spans references
    pub fn referenced_by<'a>(&'a self, block: &'a Block) -> impl Iterator<Item = &'a MarkDef> + 'a {
        self.defs
            .iter()
            .filter(move |def| block.spans().any(|s| s.marks.iter().any(|m| *m == def.key)))
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve every placeholder in `object`, innermost first.
///
/// A placeholder is replaced by its (resolved, marked) children, so the
/// result may hold any number of objects.
pub fn resolve(object: TypedObject, mark_defs: &mut MarkDefAccumulator) -> Vec<TypedObject> {
    match object {
        TypedObject::Decorator(decorator) => {
            let mut children = resolve_all(decorator.children, mark_defs);
            apply_mark(&mut children, &decorator.mark_name, MarkPosition::Front);
            children
        }
        TypedObject::Annotation(annotation) => {
            let key = annotation.mark_def.key.clone();
            mark_defs.register(annotation.mark_def);
            let mut children = resolve_all(annotation.children, mark_defs);
            apply_mark(&mut children, &key, MarkPosition::Back);
            children
        }
        mut other => {
            if let Some(children) = other.children_mut() {
                let taken = std::mem::take(children);
                *children = resolve_all(taken, mark_defs);
            }
            vec![other]
        }
    }
}

/// Resolve a list of objects, flattening placeholder results
pub fn resolve_all(objects: Vec<TypedObject>, mark_defs: &mut MarkDefAccumulator) -> Vec<TypedObject> {
    let mut out = Vec::with_capacity(objects.len());
    for object in objects {
        if object.is_placeholder() || has_nested_placeholder(&object) {
            out.extend(resolve(object, mark_defs));
        } else {
            out.push(object);
        }
    }
    out
}

fn has_nested_placeholder(object: &TypedObject) -> bool {
    let children = match object {
        TypedObject::Block(b) => &b.children,
        TypedObject::Hoisted(b) => &b.children,
        _ => return false,
    };
    children
        .iter()
        .any(|c| c.is_placeholder() || has_nested_placeholder(c))
}

#[derive(Clone, Copy)]
enum MarkPosition {
    Front,
    Back,
}

/// Add `mark` to every non-blank span below `objects`
fn apply_mark(objects: &mut [TypedObject], mark: &str, position: MarkPosition) {
    for object in objects {
        if let TypedObject::Span(span) = object {
            if is_blank(&span.text) {
                continue;
            }
            match position {
                MarkPosition::Front => span.marks.insert(0, mark.to_string()),
                MarkPosition::Back => span.marks.push(mark.to_string()),
            }
        } else if let Some(children) = object.children_mut() {
            apply_mark(children, mark, position);
        }
    }
}
