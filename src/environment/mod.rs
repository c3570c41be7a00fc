//! Hostname classification for Experience Cloud Builder pages.

pub const SANDBOX_HOST_MARKER: &str = ".sandbox.";
pub const PRODUCTION_HOST_MARKER: &str = ".builder.salesforce-experience.com";

pub const SANDBOX_STYLE_CLASS: &str = "sf-env-banner-sandbox";
pub const PRODUCTION_STYLE_CLASS: &str = "sf-env-banner-production";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentKind {
    Sandbox,
    Production,
}

/// Derived per page load from the hostname; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentDescriptor {
    pub kind: EnvironmentKind,
    pub name: String,
    pub style_class: &'static str,
}

/// Classifies a hostname as sandbox, production, or neither. The sandbox
/// pattern is checked first and short-circuits; that precedence is
/// load-bearing and must not be reordered.
pub fn detect(hostname: &str) -> Option<EnvironmentDescriptor> {
    if hostname.contains(SANDBOX_HOST_MARKER) {
        Some(EnvironmentDescriptor {
            kind: EnvironmentKind::Sandbox,
            name: org_label(hostname),
            style_class: SANDBOX_STYLE_CLASS,
        })
    } else if hostname.contains(PRODUCTION_HOST_MARKER) {
        Some(EnvironmentDescriptor {
            kind: EnvironmentKind::Production,
            name: org_label(hostname),
            style_class: PRODUCTION_STYLE_CLASS,
        })
    } else {
        None
    }
}

/// First dot-label of the hostname, with the `--` separator Salesforce uses
/// for sandbox names rendered as ` - `.
fn org_label(hostname: &str) -> String {
    hostname
        .split('.')
        .next()
        .unwrap_or_default()
        .replace("--", " - ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandbox_hostnames_classify_as_sandbox() {
        let env = detect("acme.sandbox.my.salesforce.com").expect("should detect");
        assert_eq!(env.kind, EnvironmentKind::Sandbox);
        assert_eq!(env.name, "acme");
        assert_eq!(env.style_class, SANDBOX_STYLE_CLASS);
    }

    #[test]
    fn sandbox_name_renders_double_dash_as_separator() {
        let env = detect("foo--bar.sandbox.my.salesforce.com").expect("should detect");
        assert_eq!(env.kind, EnvironmentKind::Sandbox);
        assert_eq!(env.name, "foo - bar");
    }

    #[test]
    fn builder_hostnames_classify_as_production() {
        let env = detect("acme.builder.salesforce-experience.com").expect("should detect");
        assert_eq!(env.kind, EnvironmentKind::Production);
        assert_eq!(env.name, "acme");
        assert_eq!(env.style_class, PRODUCTION_STYLE_CLASS);
    }

    #[test]
    fn sandbox_marker_wins_when_both_patterns_match() {
        let env = detect("org.sandbox.builder.salesforce-experience.com").expect("should detect");
        assert_eq!(env.kind, EnvironmentKind::Sandbox);
    }

    #[test]
    fn unrelated_hostnames_yield_no_environment() {
        assert_eq!(detect("example.com"), None);
        assert_eq!(detect("acme.my.salesforce.com"), None);
        // Marker requires surrounding dots; a bare prefix is not a sandbox.
        assert_eq!(detect("sandbox.example.com"), None);
        assert_eq!(detect(""), None);
    }
}
