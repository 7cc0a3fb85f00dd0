use super::Reader;
use crate::navigator::ChapterDirection;
use crate::render::Renderer;
use crate::state::{PanelId, Position};
use log::debug;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationRequest {
    /// Shared previous/next controls.
    Shared(ChapterDirection),
    /// A panel's own previous/next controls.
    Panel(PanelId, ChapterDirection),
    /// Menu selection.
    Select(Position),
}

/// FIFO of navigation requests. Clones share the same queue, so a request
/// pushed while another navigation is running is executed after it instead
/// of interleaving with it.
#[derive(Debug, Clone, Default)]
pub struct NavigationQueue {
    inner: Rc<RefCell<VecDeque<NavigationRequest>>>,
}

impl NavigationQueue {
    pub fn push(&self, request: NavigationRequest) {
        self.inner.borrow_mut().push_back(request);
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    fn pop(&self) -> Option<NavigationRequest> {
        self.inner.borrow_mut().pop_front()
    }
}

impl<R: Renderer> Reader<R> {
    pub(super) fn submit(&mut self, request: NavigationRequest) {
        self.queue.push(request);
        self.run_navigation_queue();
    }

    /// Executes queued requests one at a time until the queue is empty.
    pub fn run_navigation_queue(&mut self) {
        if self.navigating {
            return;
        }
        self.navigating = true;
        while let Some(request) = self.queue.pop() {
            self.execute(request);
        }
        self.navigating = false;
    }

    fn execute(&mut self, request: NavigationRequest) {
        debug!("Navigation: {request:?}");
        let split = self.panels.is_active();
        match request {
            NavigationRequest::Shared(direction) if split => {
                self.sync_step(PanelId::Left, direction)
            }
            NavigationRequest::Shared(direction) => self.step_single(direction),
            NavigationRequest::Panel(id, direction) if split => self.sync_step(id, direction),
            NavigationRequest::Panel(id, _) => {
                debug!("Ignoring {} panel navigation: split view closed", id.label());
            }
            NavigationRequest::Select(position) if split => self.sync_select(position),
            NavigationRequest::Select(position) => self.select_single(position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_clones_share_requests() {
        let queue = NavigationQueue::default();
        let handle = queue.clone();
        handle.push(NavigationRequest::Shared(ChapterDirection::Next));
        handle.push(NavigationRequest::Select(Position::new(2, 1)));

        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.pop(),
            Some(NavigationRequest::Shared(ChapterDirection::Next))
        );
        assert_eq!(queue.pop(), Some(NavigationRequest::Select(Position::new(2, 1))));
        assert!(handle.is_empty());
    }
}
