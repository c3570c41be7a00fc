use std::time::Duration;

use crate::banner::{BannerInjector, InsertOutcome, PageHost};
use crate::settings::Settings;

/// Hard upper bound on how long a page load keeps observing mutations while
/// waiting for the anchor element.
pub const ANCHOR_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Watching,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    BannerInserted,
    TimedOut,
}

/// Two-state machine driven by host mutation notifications and a single
/// timeout. One instance per page load; it always eventually stops.
#[derive(Debug)]
pub struct AnchorWatcher {
    state: WatcherState,
    stop_reason: Option<StopReason>,
}

impl AnchorWatcher {
    /// Starts watching only when there is still work to do: no banner yet
    /// and no anchor to attach it to. Returns `None` otherwise.
    pub fn begin<H: PageHost>(host: &H) -> Option<Self> {
        if host.banner_present() || host.anchor_present() {
            return None;
        }
        Some(Self {
            state: WatcherState::Watching,
            stop_reason: None,
        })
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Handles one mutation batch: re-attempts insertion and stops as soon
    /// as it succeeds. Calls after stopping are no-ops.
    pub fn on_mutation<H: PageHost>(
        &mut self,
        injector: &BannerInjector<H>,
        settings: &Settings,
    ) -> WatcherState {
        if self.state == WatcherState::Stopped {
            return self.state;
        }
        if injector.insert(settings) == InsertOutcome::Inserted {
            self.stop(StopReason::BannerInserted);
        }
        self.state
    }

    /// Fires when the fixed timeout elapses; a quiet outcome, not an error.
    pub fn on_timeout(&mut self) -> WatcherState {
        if self.state == WatcherState::Watching {
            self.stop(StopReason::TimedOut);
        }
        self.state
    }

    fn stop(&mut self, reason: StopReason) {
        tracing::debug!(?reason, "anchor watcher stopped");
        self.state = WatcherState::Stopped;
        self.stop_reason = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::testing::FakePage;

    #[test]
    fn begin_declines_when_banner_already_present() {
        let page = FakePage::with_anchor("acme.sandbox.my.salesforce.com");
        let injector = BannerInjector::new(&page);
        injector.insert(&Settings::default());

        assert!(AnchorWatcher::begin(&page).is_none());
    }

    #[test]
    fn begin_declines_when_anchor_already_present() {
        let page = FakePage::with_anchor("acme.sandbox.my.salesforce.com");
        assert!(AnchorWatcher::begin(&page).is_none());
    }

    #[test]
    fn late_anchor_is_picked_up_by_mutation_before_timeout() {
        let page = FakePage::new("acme.sandbox.my.salesforce.com");
        let injector = BannerInjector::new(&page);
        let mut watcher = AnchorWatcher::begin(injector.host()).expect("should watch");

        // Early batches fire before the page produced the anchor.
        assert_eq!(
            watcher.on_mutation(&injector, &Settings::default()),
            WatcherState::Watching
        );
        assert!(page.banner().is_none());

        page.set_anchor(true);
        assert_eq!(
            watcher.on_mutation(&injector, &Settings::default()),
            WatcherState::Stopped
        );
        assert_eq!(watcher.stop_reason(), Some(StopReason::BannerInserted));
        assert!(page.banner().is_some());

        // A timer that fires after the fact must not flip the reason.
        watcher.on_timeout();
        assert_eq!(watcher.stop_reason(), Some(StopReason::BannerInserted));
    }

    #[test]
    fn timeout_stops_quietly_when_anchor_never_appears() {
        let page = FakePage::new("acme.sandbox.my.salesforce.com");
        let injector = BannerInjector::new(&page);
        let mut watcher = AnchorWatcher::begin(injector.host()).expect("should watch");

        watcher.on_mutation(&injector, &Settings::default());
        assert_eq!(watcher.on_timeout(), WatcherState::Stopped);
        assert_eq!(watcher.stop_reason(), Some(StopReason::TimedOut));
        assert!(page.banner().is_none());
        assert_eq!(page.insertions(), 0);
    }

    #[test]
    fn mutations_after_stop_are_ignored() {
        let page = FakePage::new("acme.sandbox.my.salesforce.com");
        let injector = BannerInjector::new(&page);
        let mut watcher = AnchorWatcher::begin(injector.host()).expect("should watch");

        watcher.on_timeout();
        page.set_anchor(true);
        assert_eq!(
            watcher.on_mutation(&injector, &Settings::default()),
            WatcherState::Stopped
        );
        assert!(page.banner().is_none());
    }
}
