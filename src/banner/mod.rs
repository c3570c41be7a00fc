use crate::environment::{self, EnvironmentDescriptor, EnvironmentKind};
use crate::settings::Settings;

/// Fixed element id keying the singleton banner node; used for both
/// duplicate detection and removal.
pub const BANNER_ELEMENT_ID: &str = "sf-environment-banner";
pub const BANNER_BASE_CLASS: &str = "sf-env-banner";
pub const BANNER_CONTENT_CLASS: &str = "sf-env-banner-content";
pub const BANNER_TEXT_CLASS: &str = "sf-env-banner-text";

/// Insertion point the Builder page is expected to expose.
pub const ANCHOR_SELECTOR: &str = "[data-id=\"above-appdev-bar\"]";

/// Fully computed banner node: everything the page host needs to materialize
/// the element, with no environment or settings logic left on the host side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerSpec {
    pub element_id: &'static str,
    pub class_name: String,
    pub text: String,
    pub background: String,
}

impl BannerSpec {
    pub fn new(environment: &EnvironmentDescriptor, settings: &Settings) -> Self {
        let background = match environment.kind {
            EnvironmentKind::Sandbox => settings.sandbox_color.clone(),
            EnvironmentKind::Production => settings.production_color.clone(),
        };
        Self {
            element_id: BANNER_ELEMENT_ID,
            class_name: format!("{BANNER_BASE_CLASS} {}", environment.style_class),
            text: banner_text(environment, settings),
            background,
        }
    }
}

/// Banner label: org name is opt-in, the environment word is always present.
pub fn banner_text(environment: &EnvironmentDescriptor, settings: &Settings) -> String {
    if settings.show_org_name {
        match environment.kind {
            EnvironmentKind::Sandbox => format!("{} SANDBOX", environment.name.to_uppercase()),
            EnvironmentKind::Production => {
                format!("{} - PRODUCTION", environment.name.to_uppercase())
            }
        }
    } else {
        match environment.kind {
            EnvironmentKind::Sandbox => "SANDBOX".to_string(),
            EnvironmentKind::Production => "PRODUCTION".to_string(),
        }
    }
}

/// Capability seam over the page document. Browser builds bind this to the
/// real DOM; tests use an in-memory fake.
pub trait PageHost {
    fn hostname(&self) -> String;
    fn banner_present(&self) -> bool;
    fn anchor_present(&self) -> bool;
    /// Materializes the banner as the sibling immediately preceding the
    /// anchor element.
    fn insert_before_anchor(&self, banner: &BannerSpec);
    fn remove_banner(&self);
}

impl<H: PageHost + ?Sized> PageHost for &H {
    fn hostname(&self) -> String {
        (**self).hostname()
    }

    fn banner_present(&self) -> bool {
        (**self).banner_present()
    }

    fn anchor_present(&self) -> bool {
        (**self).anchor_present()
    }

    fn insert_before_anchor(&self, banner: &BannerSpec) {
        (**self).insert_before_anchor(banner);
    }

    fn remove_banner(&self) {
        (**self).remove_banner();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The singleton already exists; nothing was inserted.
    AlreadyPresent,
    /// The page has not produced the anchor yet (or never will).
    AnchorMissing,
    /// Hostname matched neither environment pattern.
    NoEnvironment,
}

#[derive(Debug)]
pub struct BannerInjector<H> {
    host: H,
}

impl<H: PageHost> BannerInjector<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Idempotent: at most one banner ever exists in the document.
    pub fn insert(&self, settings: &Settings) -> InsertOutcome {
        let Some(environment) = environment::detect(&self.host.hostname()) else {
            return InsertOutcome::NoEnvironment;
        };
        if self.host.banner_present() {
            return InsertOutcome::AlreadyPresent;
        }
        if !self.host.anchor_present() {
            return InsertOutcome::AnchorMissing;
        }

        let banner = BannerSpec::new(&environment, settings);
        tracing::debug!(kind = ?environment.kind, "inserting environment banner");
        self.host.insert_before_anchor(&banner);
        InsertOutcome::Inserted
    }

    /// Removes any existing banner by id, re-detects the environment and
    /// re-inserts. Each settings update fully supersedes prior banner state.
    pub fn replace(&self, settings: &Settings) -> InsertOutcome {
        self.host.remove_banner();
        self.insert(settings)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakePage;
    use super::*;
    use crate::settings::DEFAULT_SANDBOX_COLOR;

    #[test]
    fn default_sandbox_banner_shows_bare_label_and_default_color() {
        let page = FakePage::with_anchor("foo--bar.sandbox.my.salesforce.com");
        let injector = BannerInjector::new(&page);

        assert_eq!(injector.insert(&Settings::default()), InsertOutcome::Inserted);

        let banner = page.banner().expect("banner should exist");
        assert_eq!(banner.text, "SANDBOX");
        assert_eq!(banner.background, DEFAULT_SANDBOX_COLOR);
        assert_eq!(banner.element_id, BANNER_ELEMENT_ID);
        assert_eq!(banner.class_name, "sf-env-banner sf-env-banner-sandbox");
    }

    #[test]
    fn production_banner_includes_org_name_when_enabled() {
        let page = FakePage::with_anchor("acme.builder.salesforce-experience.com");
        let injector = BannerInjector::new(&page);
        let settings = Settings {
            show_org_name: true,
            ..Settings::default()
        };

        assert_eq!(injector.insert(&settings), InsertOutcome::Inserted);

        let banner = page.banner().expect("banner should exist");
        assert_eq!(banner.text, "ACME - PRODUCTION");
        assert_eq!(banner.background, settings.production_color);
    }

    #[test]
    fn sandbox_banner_uppercases_org_name_with_separator() {
        let environment =
            environment::detect("foo--bar.sandbox.my.salesforce.com").expect("should detect");
        let settings = Settings {
            show_org_name: true,
            ..Settings::default()
        };
        assert_eq!(banner_text(&environment, &settings), "FOO - BAR SANDBOX");
    }

    #[test]
    fn second_insert_is_a_no_op() {
        let page = FakePage::with_anchor("acme.sandbox.my.salesforce.com");
        let injector = BannerInjector::new(&page);

        assert_eq!(injector.insert(&Settings::default()), InsertOutcome::Inserted);
        assert_eq!(
            injector.insert(&Settings::default()),
            InsertOutcome::AlreadyPresent
        );
        assert_eq!(page.insertions(), 1);
    }

    #[test]
    fn insert_without_anchor_does_nothing() {
        let page = FakePage::new("acme.sandbox.my.salesforce.com");
        let injector = BannerInjector::new(&page);

        assert_eq!(
            injector.insert(&Settings::default()),
            InsertOutcome::AnchorMissing
        );
        assert!(page.banner().is_none());
    }

    #[test]
    fn insert_on_unrecognized_host_does_nothing() {
        let page = FakePage::with_anchor("example.com");
        let injector = BannerInjector::new(&page);

        assert_eq!(
            injector.insert(&Settings::default()),
            InsertOutcome::NoEnvironment
        );
        assert!(page.banner().is_none());
    }

    #[test]
    fn replace_rebuilds_banner_with_new_settings() {
        let page = FakePage::with_anchor("acme.sandbox.my.salesforce.com");
        let injector = BannerInjector::new(&page);
        injector.insert(&Settings::default());

        let updated = Settings {
            sandbox_color: "#123456".to_string(),
            ..Settings::default()
        };
        assert_eq!(injector.replace(&updated), InsertOutcome::Inserted);

        let banner = page.banner().expect("banner should exist");
        assert_eq!(banner.background, "#123456");
        assert_eq!(page.insertions(), 2);
    }
}
