//! Host environment boundary for navigation.
//!
//! The controller never touches address state or the display title directly;
//! it goes through [`NavigationHost`], a small capability trait covering the
//! pieces of the host environment navigation cares about: the current address
//! fragment, history writes, the display title, and a subscription for
//! navigation events that originate outside the controller (back/forward,
//! manual fragment edits).
//!
//! The implementation is split into:
//! - this module: the trait and the event channel types
//! - [`memory`]: an in-memory host used by the shell and by tests

pub mod memory;

pub use memory::MemoryHost;

use std::sync::mpsc::Sender;

use crate::catalog::SectionId;

/// Navigation events originating in the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The address fragment changed outside the controller, through
    /// back/forward navigation or a manual edit.
    FragmentChanged(String),
}

/// Sending half of the host event channel.
pub type NavHub = Sender<HostEvent>;

/// Capability trait over the host's address fragment, history and title.
///
/// `push_fragment` adds a history entry; `replace_fragment` rewrites the
/// current one without growing history. Neither emits a [`HostEvent`]:
/// events are reserved for navigation the controller did not itself
/// initiate.
pub trait NavigationHost {
    /// Current address fragment, without any leading marker.
    fn current_fragment(&self) -> String;

    /// Pushes a new history entry for `fragment`. `section` is an
    /// informational payload stored alongside the entry; it is never read
    /// back to derive state.
    fn push_fragment(&mut self, fragment: &str, section: Option<SectionId>);

    /// Replaces the current history entry's fragment without adding one.
    fn replace_fragment(&mut self, fragment: &str);

    /// Sets the display title.
    fn set_title(&mut self, title: &str);

    /// Registers the channel the host emits [`HostEvent`]s on.
    fn subscribe(&mut self, hub: NavHub);
}
