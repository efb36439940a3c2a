//! Highlight reconciler
//!
//! Keeps the overlays on screen in step with the highlight model for a loaded
//! document. PRESENT events render one overlay per rect right away and
//! register a redraw callback that renders again on every layout change;
//! ABSENT events remove the highlight's overlays and cancel its callbacks.
//!
//! Ownership is explicit: the reconciler indexes every overlay node and every
//! redraw registration by highlight id. The class-name selector is only used
//! as a fallback for overlays the index does not know about.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::config::UpdatePolicy;
use crate::dom::NodeId;
use crate::error::{OverlayError, Result};
use crate::model::{
    DocumentLoadedEvent, Highlight, HighlightId, HighlightModel, MutationEvent, MutationListener,
};
use crate::mutation::MutationState;
use crate::redraw::{RedrawCallback, RedrawHandle, RedrawHandler};
use crate::render::{highlight_selector, OverlayRenderer, OverlayTarget};

/// Everything the reconciler owns for one highlight
#[derive(Debug, Default, Clone)]
struct HighlightSlot {
    elements: Vec<NodeId>,
    registrations: Vec<RedrawHandle>,
}

type OverlayIndex = HashMap<HighlightId, HighlightSlot>;

struct Inner {
    model: Rc<HighlightModel>,
    renderer: Rc<OverlayRenderer>,
    redraw: Rc<dyn RedrawHandler>,
    policy: Cell<UpdatePolicy>,
    index: Rc<RefCell<OverlayIndex>>,
    subscriptions: RefCell<Vec<String>>,
}

/// Per-document controller reconciling highlight events with overlays
///
/// Listeners registered with the model hold only a weak reference: dropping
/// the reconciler silences them.
pub struct HighlightReconciler {
    inner: Rc<Inner>,
}

impl std::fmt::Debug for HighlightReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightReconciler")
            .field("policy", &self.inner.policy.get())
            .field("tracked", &self.inner.index.borrow().len())
            .field("subscriptions", &self.inner.subscriptions.borrow())
            .finish()
    }
}

impl HighlightReconciler {
    pub fn new(
        model: Rc<HighlightModel>,
        renderer: OverlayRenderer,
        redraw: Rc<dyn RedrawHandler>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                model,
                renderer: Rc::new(renderer),
                redraw,
                policy: Cell::new(UpdatePolicy::default()),
                index: Rc::new(RefCell::new(HashMap::new())),
                subscriptions: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Set how repeated PRESENT events for one highlight are handled (builder pattern)
    pub fn with_update_policy(self, policy: UpdatePolicy) -> Self {
        self.inner.policy.set(policy);
        self
    }

    /// Listen for document loads on the model
    ///
    /// Not guarded: calling this twice subscribes twice.
    pub fn start(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner
            .model
            .register_listener_for_document_loaded(Rc::new(
                move |event: &DocumentLoadedEvent| -> Result<()> {
                    match weak.upgrade() {
                        Some(inner) => inner.on_document_loaded(event),
                        None => Ok(()),
                    }
                },
            ));
    }

    /// Subscribe to the loaded document's highlight changes
    pub fn on_document_loaded(&self, event: &DocumentLoadedEvent) -> Result<()> {
        self.inner.on_document_loaded(event)
    }

    /// Reconcile one highlight change with the overlays on screen
    pub fn on_highlight_changed(&self, event: &MutationEvent) -> Result<()> {
        self.inner.on_highlight_changed(event)
    }

    pub fn renderer(&self) -> &OverlayRenderer {
        &self.inner.renderer
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.inner.policy.get()
    }

    /// Overlay nodes currently owned for `id`
    pub fn overlays(&self, id: &HighlightId) -> Vec<NodeId> {
        let dom = self.inner.renderer.dom().borrow();
        self.inner
            .index
            .borrow()
            .get(id)
            .map(|slot| {
                slot.elements
                    .iter()
                    .copied()
                    .filter(|n| dom.contains(*n))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn overlay_count(&self, id: &HighlightId) -> usize {
        self.overlays(id).len()
    }

    /// Live redraw registrations for `id`
    pub fn registration_count(&self, id: &HighlightId) -> usize {
        self.inner
            .index
            .borrow()
            .get(id)
            .map_or(0, |slot| slot.registrations.len())
    }

    /// Highlights with overlays or registrations, ordered by id
    pub fn tracked_highlights(&self) -> Vec<HighlightId> {
        let mut ids: Vec<HighlightId> = self.inner.index.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn total_overlays(&self) -> usize {
        let dom = self.inner.renderer.dom().borrow();
        self.inner
            .index
            .borrow()
            .values()
            .flat_map(|slot| slot.elements.iter())
            .filter(|n| dom.contains(**n))
            .count()
    }

    /// Fingerprints this reconciler has subscribed to, in load order
    pub fn subscriptions(&self) -> Vec<String> {
        self.inner.subscriptions.borrow().clone()
    }
}

impl Inner {
    fn on_document_loaded(self: &Rc<Self>, event: &DocumentLoadedEvent) -> Result<()> {
        let fingerprint = event.doc_info.fingerprint.clone();
        tracing::info!(%fingerprint, pages = event.page_count, "subscribing to text highlights");

        self.subscriptions.borrow_mut().push(fingerprint.clone());

        let weak: Weak<Self> = Rc::downgrade(self);
        let listener: MutationListener = Rc::new(move |event: &MutationEvent| -> Result<()> {
            match weak.upgrade() {
                Some(inner) => inner.on_highlight_changed(event),
                None => Ok(()),
            }
        });
        self.model.register_listener(&fingerprint, listener)
    }

    fn on_highlight_changed(&self, event: &MutationEvent) -> Result<()> {
        let highlight = event.subject()?;
        tracing::debug!(
            target: "reconcile",
            id = %highlight.id,
            page = event.page_num(),
            state = %event.mutation_state,
            "text highlight event"
        );

        match event.mutation_state {
            MutationState::Present => self.show(event, highlight),
            MutationState::Absent => {
                self.hide(event, &highlight.id);
                Ok(())
            }
        }
    }

    fn show(&self, event: &MutationEvent, highlight: &Highlight) -> Result<()> {
        let page_num = event.page_num();
        let page_element = self
            .renderer
            .doc_format()
            .page_element(page_num)
            .ok_or(OverlayError::PageNotFound(page_num))?;

        // One registration slot per rect: drop whatever an earlier event left
        let previous = self
            .index
            .borrow_mut()
            .get_mut(&highlight.id)
            .map(|slot| {
                let registrations = std::mem::take(&mut slot.registrations);
                let elements = match self.policy.get() {
                    UpdatePolicy::Replace => std::mem::take(&mut slot.elements),
                    UpdatePolicy::Duplicate => Vec::new(),
                };
                (registrations, elements)
            });
        if let Some((registrations, elements)) = previous {
            self.cancel_all(registrations);
            self.remove_nodes(elements);
        }

        let target = OverlayTarget {
            highlight_id: highlight.id.clone(),
            fingerprint: event.doc_info.fingerprint.clone(),
            page_num,
        };

        for rect in highlight.rects.values() {
            let callback: RedrawCallback = {
                let renderer = Rc::clone(&self.renderer);
                let index = Rc::clone(&self.index);
                let page_highlights = event.page_meta.text_highlights.clone();
                let target = target.clone();
                let rect = *rect;
                Rc::new(move || {
                    // Soft-deleted since this callback was registered
                    if !page_highlights.contains(&target.highlight_id) {
                        tracing::trace!(target: "reconcile", id = %target.highlight_id, "stale render skipped");
                        return;
                    }
                    let node = renderer.render(page_element, &rect, &target);
                    let dom = renderer.dom().borrow();
                    let mut index = index.borrow_mut();
                    let elements = &mut index
                        .entry(target.highlight_id.clone())
                        .or_default()
                        .elements;
                    // Forget nodes removed from the DOM behind our back
                    elements.retain(|n| dom.contains(*n));
                    elements.push(node);
                })
            };

            // Render now, then again on every redraw of this page
            callback();
            let handle = self.redraw.register(page_element, callback);
            self.index
                .borrow_mut()
                .entry(highlight.id.clone())
                .or_default()
                .registrations
                .push(handle);
        }
        Ok(())
    }

    fn hide(&self, event: &MutationEvent, id: &HighlightId) {
        let slot = self.index.borrow_mut().remove(id).unwrap_or_default();
        self.cancel_all(slot.registrations);
        let mut removed = self.remove_nodes(slot.elements);

        // Overlays rendered outside this reconciler's index
        let selector = highlight_selector(id);
        let fingerprint = event.doc_info.fingerprint.as_str();
        let mut dom = self.renderer.dom().borrow_mut();
        let stragglers: Vec<NodeId> = dom
            .query_selector_all(&selector)
            .into_iter()
            .filter(|node| dom.attribute(*node, "data-doc-fingerprint") == Some(fingerprint))
            .collect();
        for node in stragglers {
            if dom.remove(node) {
                removed += 1;
            }
        }

        tracing::debug!(target: "reconcile", %id, %selector, removed, "removed text highlight overlays");
    }

    fn cancel_all(&self, registrations: Vec<RedrawHandle>) {
        for handle in registrations {
            self.redraw.cancel(handle);
        }
    }

    fn remove_nodes(&self, nodes: Vec<NodeId>) -> usize {
        let mut dom = self.renderer.dom().borrow_mut();
        nodes.into_iter().filter(|node| dom.remove(*node)).count()
    }
}
