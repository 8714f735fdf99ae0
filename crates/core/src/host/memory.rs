//! In-memory navigation host.

use super::{HostEvent, NavHub, NavigationHost};
use crate::catalog::SectionId;

/// One entry of the in-memory history stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub fragment: String,
    pub section: Option<SectionId>,
}

/// Navigation host backed by plain memory.
///
/// Stands in for a browser address bar: a history stack, the fragment of the
/// topmost entry, and a display title. [`MemoryHost::back`] behaves like the
/// browser's back control, restoring the previous entry and emitting the
/// change on the subscribed channel; [`MemoryHost::navigate`] simulates a
/// manual fragment edit the same way.
///
/// The history stack always holds at least one entry.
#[derive(Debug)]
pub struct MemoryHost {
    entries: Vec<HistoryEntry>,
    title: String,
    hub: Option<NavHub>,
}

impl MemoryHost {
    pub fn new(initial_fragment: &str) -> MemoryHost {
        MemoryHost {
            entries: vec![HistoryEntry {
                fragment: initial_fragment.to_string(),
                section: None,
            }],
            title: String::new(),
            hub: None,
        }
    }

    /// Simulates a fragment edit from outside the controller: pushes an entry
    /// and emits the change.
    pub fn navigate(&mut self, fragment: &str) {
        self.entries.push(HistoryEntry {
            fragment: fragment.to_string(),
            section: None,
        });
        self.emit(fragment.to_string());
    }

    /// Simulates the back control: restores the previous entry and emits its
    /// fragment. Returns false when already at the bottom of the stack.
    pub fn back(&mut self) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        self.entries.pop();
        let fragment = self.current_fragment();
        tracing::trace!(fragment = %fragment, "history back");
        self.emit(fragment);
        true
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// History entries, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.entries
    }

    fn emit(&self, fragment: String) {
        if let Some(hub) = &self.hub {
            hub.send(HostEvent::FragmentChanged(fragment)).ok();
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        MemoryHost::new("")
    }
}

impl NavigationHost for MemoryHost {
    fn current_fragment(&self) -> String {
        self.entries
            .last()
            .map(|entry| entry.fragment.clone())
            .unwrap_or_default()
    }

    fn push_fragment(&mut self, fragment: &str, section: Option<SectionId>) {
        tracing::trace!(fragment, "pushing history entry");
        self.entries.push(HistoryEntry {
            fragment: fragment.to_string(),
            section,
        });
    }

    fn replace_fragment(&mut self, fragment: &str) {
        tracing::trace!(fragment, "replacing current history entry");
        if let Some(entry) = self.entries.last_mut() {
            entry.fragment = fragment.to_string();
            entry.section = None;
        }
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn subscribe(&mut self, hub: NavHub) {
        self.hub = Some(hub);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn push_grows_history_and_updates_the_fragment() {
        let mut host = MemoryHost::new("");

        host.push_fragment("experience", Some(1));
        host.push_fragment("projects", Some(3));

        assert_eq!(host.current_fragment(), "projects");
        assert_eq!(host.history().len(), 3);
        assert_eq!(host.history()[1].section, Some(1));
    }

    #[test]
    fn replace_rewrites_the_top_entry_without_growing_history() {
        let mut host = MemoryHost::new("stale-slug");

        host.replace_fragment("");

        assert_eq!(host.current_fragment(), "");
        assert_eq!(host.history().len(), 1);
        assert_eq!(host.history()[0].section, None);
    }

    #[test]
    fn back_restores_the_previous_entry_and_emits_it() {
        let (hub, receiver) = channel();
        let mut host = MemoryHost::new("");
        host.subscribe(hub);
        host.push_fragment("experience", Some(1));

        assert!(host.back());
        assert_eq!(host.current_fragment(), "");
        assert_eq!(
            receiver.try_recv(),
            Ok(HostEvent::FragmentChanged(String::new()))
        );
    }

    #[test]
    fn back_at_the_bottom_of_the_stack_is_refused() {
        let (hub, receiver) = channel();
        let mut host = MemoryHost::new("");
        host.subscribe(hub);

        assert!(!host.back());
        assert_eq!(host.current_fragment(), "");
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn navigate_pushes_and_emits() {
        let (hub, receiver) = channel();
        let mut host = MemoryHost::new("");
        host.subscribe(hub);

        host.navigate("contact");

        assert_eq!(host.current_fragment(), "contact");
        assert_eq!(host.history().len(), 2);
        assert_eq!(
            receiver.try_recv(),
            Ok(HostEvent::FragmentChanged("contact".to_string()))
        );
    }

    #[test]
    fn back_without_a_subscriber_still_restores_state() {
        let mut host = MemoryHost::new("");
        host.push_fragment("experience", None);

        assert!(host.back());
        assert_eq!(host.current_fragment(), "");
    }

    #[test]
    fn title_is_stored_verbatim() {
        let mut host = MemoryHost::new("");

        host.set_title("Experience | Iris Calder");

        assert_eq!(host.title(), "Experience | Iris Calder");
    }
}
