//! Navigation controller: section selection and staged transitions.
//!
//! The controller owns which section is active, sequences the multi-stage
//! enter/leave choreography the rendering layer animates, and keeps the
//! host's address fragment and display title aligned with the active section.
//! It publishes a read-only [`NavSnapshot`] per render; all mutation goes
//! through [`NavigationController::select_section`],
//! [`NavigationController::go_home`] and the timeline steps applied by
//! [`NavigationController::tick`].
//!
//! Enter and leave run on fixed timelines:
//!
//! ```text
//! select_section (nothing displayed)
//!   t+0ms    Shimmer       clicked card highlighted, layout unchanged
//!   t+300ms  Reveal        sidebar takes width, module content mounts,
//!                          history push (user origin)
//!   t+400ms  ItemEntrance  sidebar items animate in
//!   t+900ms  idle          entrance settled
//!
//! go_home (module displayed)
//!   t+0ms    ItemExit      sidebar items animate out, module still shown
//!   t+300ms  Collapse      sidebar gone, home content mounts, history
//!                          rewritten to the bare path (user origin)
//!   t+800ms  idle          exit settled
//! ```
//!
//! Switching while a module is displayed skips the choreography entirely: the
//! content swaps at once and the remount counter bumps so the view restarts
//! its animation. Starting any transition cancels every step left over from
//! the previous one, so at most one transition's steps are ever pending; a
//! late step can never clobber newer state, and dropping the controller
//! drops the remaining steps with it.

use std::time::{Duration, Instant};

use crate::catalog::{SectionCatalog, SectionId};
use crate::host::NavigationHost;
use crate::routing::{HashRouter, RoutingError};
use crate::timeline::{Step, Timeline};

const SHIMMER_DURATION: Duration = Duration::from_millis(300);
const WIDTH_TRANSITION_DELAY: Duration = Duration::from_millis(100);
const ITEM_ENTRANCE_DURATION: Duration = Duration::from_millis(500);
const ITEM_EXIT_DURATION: Duration = Duration::from_millis(300);
const EXIT_SETTLE_DURATION: Duration = Duration::from_millis(500);

/// Where a navigation request came from.
///
/// Transitions originating from the host's own history (back/forward) skip
/// the history write; the address already reflects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOrigin {
    User,
    History,
}

/// The kind of transition most recently initiated. Consumed by the rendering
/// layer to pick an animation class; it gates no logic here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationType {
    None,
    HomeToModule,
    ModuleToModule,
    ModuleToHome,
}

/// Sub-steps of the enter choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterStage {
    /// Clicked card highlighted; layout unchanged, nothing displayed yet.
    Shimmer,
    /// Sidebar occupies layout width, module content mounted.
    Reveal,
    /// Sidebar items animating into view.
    ItemEntrance,
}

/// Sub-steps of the leave choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveStage {
    /// Sidebar items animating out; the departing module is still rendered.
    ItemExit,
    /// Sidebar gone, home content mounted, exit animation settling.
    Collapse,
}

/// Navigation phase. Every flag the rendering layer consumes is derived from
/// this, so contradictory flag combinations cannot occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPhase {
    IdleHome,
    IdleModule {
        section: SectionId,
    },
    EnteringModule {
        target: SectionId,
        stage: EnterStage,
    },
    LeavingModule {
        from: SectionId,
        stage: LeaveStage,
    },
}

/// Deferred phase mutations, applied by [`NavigationController::tick`].
///
/// Each action carries everything it needs, so applying one never depends on
/// the phase it finds; the cancel-on-entry rule guarantees pending actions
/// always belong to the current transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepAction {
    Reveal { target: SectionId, origin: NavOrigin },
    BeginItemEntrance { target: SectionId },
    SettleEntrance { target: SectionId },
    Collapse { from: SectionId, origin: NavOrigin },
    SettleExit,
}

/// Read-only state published to the rendering layer.
///
/// `content_key` is a remount signal: it changes exactly when the view must
/// rebuild the content panel to restart its animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavSnapshot {
    pub active_section: Option<SectionId>,
    pub navigation_type: NavigationType,
    pub sidebar_visible: bool,
    pub sidebar_exiting: bool,
    pub sidebar_entering: bool,
    pub content_key: u64,
    pub clicked_card: Option<SectionId>,
}

fn enter_sequence(target: SectionId, origin: NavOrigin) -> [Step<StepAction>; 3] {
    [
        Step::new(SHIMMER_DURATION, StepAction::Reveal { target, origin }),
        Step::new(
            WIDTH_TRANSITION_DELAY,
            StepAction::BeginItemEntrance { target },
        ),
        Step::new(
            ITEM_ENTRANCE_DURATION,
            StepAction::SettleEntrance { target },
        ),
    ]
}

fn leave_sequence(from: SectionId, origin: NavOrigin) -> [Step<StepAction>; 2] {
    [
        Step::new(ITEM_EXIT_DURATION, StepAction::Collapse { from, origin }),
        Step::new(EXIT_SETTLE_DURATION, StepAction::SettleExit),
    ]
}

pub struct NavigationController<H: NavigationHost> {
    catalog: SectionCatalog,
    router: HashRouter,
    host: H,
    phase: NavPhase,
    navigation_type: NavigationType,
    content_key: u64,
    timeline: Timeline<StepAction>,
}

impl<H: NavigationHost> NavigationController<H> {
    /// Mounts the controller over `host`, seeding state from the current
    /// fragment: a fragment naming a known section starts directly in that
    /// module with no animation, anything else starts at home. A non-empty
    /// fragment that resolves to nothing is rewritten to the bare path
    /// without adding a history entry.
    pub fn new(catalog: SectionCatalog, host: H) -> Result<Self, RoutingError> {
        let router = HashRouter::new(&catalog)?;
        let mut controller = NavigationController {
            catalog,
            router,
            host,
            phase: NavPhase::IdleHome,
            navigation_type: NavigationType::None,
            content_key: 0,
            timeline: Timeline::new(),
        };

        let fragment = controller.host.current_fragment();
        match controller.router.section_from_fragment(&fragment) {
            Some(section) => {
                tracing::debug!(section, fragment = %fragment, "mounting directly in module");
                controller.phase = NavPhase::IdleModule { section };
            }
            None => {
                if !controller.router.is_valid_fragment(&fragment) {
                    tracing::debug!(fragment = %fragment, "rewriting unresolvable fragment");
                    controller.host.replace_fragment("");
                }
            }
        }
        controller.apply_title();
        Ok(controller)
    }

    /// Starts the transition to `section`.
    ///
    /// With nothing displayed (home, mid-shimmer, or the tail of a leave)
    /// this runs the staged enter choreography. With a module displayed the
    /// content swaps immediately. Unknown ids are accepted: the view simply
    /// has nothing to render for them and the address gets the bare fragment.
    pub fn select_section(&mut self, section: SectionId, origin: NavOrigin, now: Instant) {
        self.timeline.cancel_all();
        tracing::debug!(section, origin = ?origin, phase = ?self.phase, "section selected");

        if self.active_section().is_some() {
            self.navigation_type = NavigationType::ModuleToModule;
            self.content_key += 1;
            self.phase = NavPhase::IdleModule { section };
            if origin == NavOrigin::User {
                let fragment = self.router.fragment_for(Some(section));
                self.host.push_fragment(fragment, Some(section));
            }
            self.apply_title();
        } else {
            self.navigation_type = NavigationType::HomeToModule;
            self.phase = NavPhase::EnteringModule {
                target: section,
                stage: EnterStage::Shimmer,
            };
            self.timeline.schedule(now, enter_sequence(section, origin));
        }
    }

    /// Starts the return to home.
    ///
    /// With a module displayed this runs the staged unwind; the departing
    /// module stays rendered while its sidebar items animate out. With
    /// nothing displayed there is nothing to unwind: pending steps are
    /// dropped and the phase settles at home at once.
    pub fn go_home(&mut self, origin: NavOrigin, now: Instant) {
        self.timeline.cancel_all();
        tracing::debug!(origin = ?origin, phase = ?self.phase, "returning home");

        match self.active_section() {
            Some(from) => {
                self.navigation_type = NavigationType::ModuleToHome;
                self.phase = NavPhase::LeavingModule {
                    from,
                    stage: LeaveStage::ItemExit,
                };
                self.timeline.schedule(now, leave_sequence(from, origin));
            }
            None => {
                self.phase = NavPhase::IdleHome;
            }
        }
    }

    /// Reconciles an externally-changed fragment (back/forward navigation or
    /// a manual edit). A fragment resolving to the displayed section is a
    /// no-op; anything else starts the matching history-origin transition,
    /// which skips the redundant history write.
    pub fn handle_external_navigation(&mut self, fragment: &str, now: Instant) {
        let target = self.router.section_from_fragment(fragment);
        if target == self.active_section() {
            tracing::trace!(fragment, "external navigation already satisfied");
            return;
        }
        tracing::debug!(fragment, target = ?target, "external navigation");
        match target {
            Some(section) => self.select_section(section, NavOrigin::History, now),
            None => self.go_home(NavOrigin::History, now),
        }
    }

    /// Applies every scheduled step whose deadline has passed, in order.
    pub fn tick(&mut self, now: Instant) {
        for action in self.timeline.pop_due(now) {
            self.apply(action);
        }
    }

    /// Earliest pending step deadline. A real-time driver sleeps until this
    /// before calling [`NavigationController::tick`] again.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timeline.next_due()
    }

    /// True when `section` is the one currently displayed. Pure.
    pub fn is_section_active(&self, section: SectionId) -> bool {
        self.active_section() == Some(section)
    }

    /// The currently displayed section, if any. During the shimmer stage the
    /// target is not displayed yet; during item exit the departing module
    /// still is.
    pub fn active_section(&self) -> Option<SectionId> {
        match self.phase {
            NavPhase::IdleHome => None,
            NavPhase::IdleModule { section } => Some(section),
            NavPhase::EnteringModule {
                stage: EnterStage::Shimmer,
                ..
            } => None,
            NavPhase::EnteringModule { target, .. } => Some(target),
            NavPhase::LeavingModule {
                from,
                stage: LeaveStage::ItemExit,
            } => Some(from),
            NavPhase::LeavingModule {
                stage: LeaveStage::Collapse,
                ..
            } => None,
        }
    }

    pub fn phase(&self) -> NavPhase {
        self.phase
    }

    pub fn snapshot(&self) -> NavSnapshot {
        NavSnapshot {
            active_section: self.active_section(),
            navigation_type: self.navigation_type,
            sidebar_visible: self.sidebar_visible(),
            sidebar_exiting: self.sidebar_exiting(),
            sidebar_entering: self.sidebar_entering(),
            content_key: self.content_key,
            clicked_card: self.clicked_card(),
        }
    }

    pub fn catalog(&self) -> &SectionCatalog {
        &self.catalog
    }

    pub fn router(&self) -> &HashRouter {
        &self.router
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn apply(&mut self, action: StepAction) {
        tracing::trace!(action = ?action, "applying scheduled step");
        match action {
            StepAction::Reveal { target, origin } => {
                self.phase = NavPhase::EnteringModule {
                    target,
                    stage: EnterStage::Reveal,
                };
                if origin == NavOrigin::User {
                    let fragment = self.router.fragment_for(Some(target));
                    self.host.push_fragment(fragment, Some(target));
                }
                self.apply_title();
            }
            StepAction::BeginItemEntrance { target } => {
                self.phase = NavPhase::EnteringModule {
                    target,
                    stage: EnterStage::ItemEntrance,
                };
            }
            StepAction::SettleEntrance { target } => {
                self.phase = NavPhase::IdleModule { section: target };
            }
            StepAction::Collapse { from, origin } => {
                self.phase = NavPhase::LeavingModule {
                    from,
                    stage: LeaveStage::Collapse,
                };
                self.content_key += 1;
                if origin == NavOrigin::User {
                    self.host.replace_fragment("");
                }
                self.apply_title();
            }
            StepAction::SettleExit => {
                self.phase = NavPhase::IdleHome;
            }
        }
    }

    /// The sidebar occupies layout width exactly while a module is displayed.
    fn sidebar_visible(&self) -> bool {
        self.active_section().is_some()
    }

    fn sidebar_entering(&self) -> bool {
        matches!(
            self.phase,
            NavPhase::EnteringModule {
                stage: EnterStage::ItemEntrance,
                ..
            }
        )
    }

    fn sidebar_exiting(&self) -> bool {
        matches!(self.phase, NavPhase::LeavingModule { .. })
    }

    fn clicked_card(&self) -> Option<SectionId> {
        match self.phase {
            NavPhase::EnteringModule {
                target,
                stage: EnterStage::Shimmer,
            } => Some(target),
            _ => None,
        }
    }

    /// Keeps the display title aligned with the displayed section. Sections
    /// missing from the catalog have no title to show, so the home title
    /// stands in.
    fn apply_title(&mut self) {
        let title = match self.active_section().and_then(|id| self.catalog.section(id)) {
            Some(section) => format!("{} | {}", section.title, self.catalog.site().owner),
            None => self.catalog.site().home_title.clone(),
        };
        self.host.set_title(&title);
    }
}
