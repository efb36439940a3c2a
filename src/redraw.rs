//! Page redraw notifications
//!
//! Callbacks are registered per page element and fired every time that page
//! is laid out again (scroll, zoom, reflow). Each registration gets a
//! [`RedrawHandle`] so its owner can cancel it.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::dom::NodeId;

pub type RedrawCallback = Rc<dyn Fn()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RedrawHandle(pub u64);

pub trait RedrawHandler {
    fn register(&self, page_element: NodeId, callback: RedrawCallback) -> RedrawHandle;

    /// Cancel a registration. Returns `false` if it was already gone.
    fn cancel(&self, handle: RedrawHandle) -> bool;
}

struct Registration {
    page_element: NodeId,
    callback: RedrawCallback,
}

/// Redraw handler that fires callbacks on demand
#[derive(Default)]
pub struct PageRedrawRegistry {
    // BTreeMap keeps firing order equal to registration order
    registrations: RefCell<BTreeMap<RedrawHandle, Registration>>,
    next_handle: Cell<u64>,
}

impl std::fmt::Debug for PageRedrawRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRedrawRegistry")
            .field("registrations", &self.registrations.borrow().len())
            .finish()
    }
}

impl PageRedrawRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every callback registered for `page_element`
    ///
    /// Returns the number of callbacks fired. Callbacks may register or
    /// cancel while firing; only registrations present at the start run.
    pub fn redraw(&self, page_element: NodeId) -> usize {
        let callbacks: Vec<RedrawCallback> = self
            .registrations
            .borrow()
            .values()
            .filter(|r| r.page_element == page_element)
            .map(|r| Rc::clone(&r.callback))
            .collect();
        tracing::trace!(target: "redraw", ?page_element, count = callbacks.len(), "redraw");
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    /// Fire every callback of every page, e.g. after a zoom change
    pub fn redraw_all(&self) -> usize {
        let mut pages: Vec<NodeId> = self
            .registrations
            .borrow()
            .values()
            .map(|r| r.page_element)
            .collect();
        pages.sort();
        pages.dedup();
        pages.into_iter().map(|page| self.redraw(page)).sum()
    }

    pub fn len(&self) -> usize {
        self.registrations.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.borrow().is_empty()
    }

    pub fn count_for(&self, page_element: NodeId) -> usize {
        self.registrations
            .borrow()
            .values()
            .filter(|r| r.page_element == page_element)
            .count()
    }
}

impl RedrawHandler for PageRedrawRegistry {
    fn register(&self, page_element: NodeId, callback: RedrawCallback) -> RedrawHandle {
        let handle = RedrawHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.registrations.borrow_mut().insert(
            handle,
            Registration {
                page_element,
                callback,
            },
        );
        handle
    }

    fn cancel(&self, handle: RedrawHandle) -> bool {
        self.registrations.borrow_mut().remove(&handle).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<usize>>, RedrawCallback) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, Rc::new(move || inner.set(inner.get() + 1)))
    }

    #[test]
    fn test_redraw_fires_only_matching_page() {
        let registry = PageRedrawRegistry::new();
        let (a_count, a) = counter();
        let (b_count, b) = counter();
        registry.register(NodeId(1), a);
        registry.register(NodeId(2), b);

        assert_eq!(registry.redraw(NodeId(1)), 1);
        assert_eq!(a_count.get(), 1);
        assert_eq!(b_count.get(), 0);
    }

    #[test]
    fn test_cancel_stops_callback() {
        let registry = PageRedrawRegistry::new();
        let (count, callback) = counter();
        let handle = registry.register(NodeId(1), callback);

        assert!(registry.cancel(handle));
        assert!(!registry.cancel(handle));
        assert_eq!(registry.redraw(NodeId(1)), 0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_redraw_all_visits_every_page_once() {
        let registry = PageRedrawRegistry::new();
        let (count, callback) = counter();
        registry.register(NodeId(1), Rc::clone(&callback));
        registry.register(NodeId(2), Rc::clone(&callback));
        registry.register(NodeId(2), callback);

        assert_eq!(registry.redraw_all(), 3);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_callback_may_cancel_while_firing() {
        let registry = Rc::new(PageRedrawRegistry::new());
        let handle = Rc::new(Cell::new(None));
        let reg = Rc::clone(&registry);
        let slot = Rc::clone(&handle);
        let h = registry.register(
            NodeId(1),
            Rc::new(move || {
                if let Some(h) = slot.get() {
                    reg.cancel(h);
                }
            }),
        );
        handle.set(Some(h));

        assert_eq!(registry.redraw(NodeId(1)), 1);
        assert!(registry.is_empty());
    }
}
