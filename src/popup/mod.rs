use crate::messaging::{RuntimeMessage, TabBroadcaster};
use crate::settings::{is_valid_hex_color, Settings, SettingsBackend, SettingsStore};

/// Neutral swatch shown while a color field holds an invalid value.
pub const PLACEHOLDER_SWATCH_COLOR: &str = "#f0f0f0";
pub const PLACEHOLDER_BORDER_COLOR: &str = "#ddd";

pub const ORG_NAME_FIELD_ID: &str = "showOrgName";
pub const RESET_BUTTON_ID: &str = "resetButton";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorField {
    Sandbox,
    Production,
}

impl ColorField {
    pub const ALL: [ColorField; 2] = [ColorField::Sandbox, ColorField::Production];

    pub const fn input_id(self) -> &'static str {
        match self {
            ColorField::Sandbox => "sandboxColor",
            ColorField::Production => "productionColor",
        }
    }

    pub const fn preview_id(self) -> &'static str {
        match self {
            ColorField::Sandbox => "sandboxPreview",
            ColorField::Production => "productionPreview",
        }
    }
}

/// What a preview swatch should display. `Placeholder` doubles as the
/// invalid-input flag: the field is marked invalid exactly when its preview
/// falls back to the neutral placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewStyle {
    /// Swatch filled with the color, 2px border of the same color.
    Swatch { color: String },
    /// Neutral placeholder fill with a thin border; input flagged invalid.
    Placeholder,
}

/// Capability seam over the popup form. Browser builds bind this to the
/// popup DOM; tests use an in-memory fake.
pub trait SettingsForm {
    fn color_value(&self, field: ColorField) -> String;
    fn set_color_value(&self, field: ColorField, value: &str);
    fn org_name_checked(&self) -> bool;
    fn set_org_name_checked(&self, checked: bool);
    fn render_preview(&self, field: ColorField, style: PreviewStyle);
}

impl<F: SettingsForm + ?Sized> SettingsForm for &F {
    fn color_value(&self, field: ColorField) -> String {
        (**self).color_value(field)
    }

    fn set_color_value(&self, field: ColorField, value: &str) {
        (**self).set_color_value(field, value);
    }

    fn org_name_checked(&self) -> bool {
        (**self).org_name_checked()
    }

    fn set_org_name_checked(&self, checked: bool) {
        (**self).set_org_name_checked(checked);
    }

    fn render_preview(&self, field: ColorField, style: PreviewStyle) {
        (**self).render_preview(field, style);
    }
}

/// Binds the settings form to the store: populates fields on open, keeps the
/// previews live while typing, persists on blur/toggle/reset, and pushes
/// every persisted state to open Builder tabs.
pub struct SettingsUiController<F, B, T> {
    form: F,
    store: SettingsStore<B>,
    broadcaster: T,
}

impl<F, B, T> SettingsUiController<F, B, T>
where
    F: SettingsForm,
    B: SettingsBackend,
    T: TabBroadcaster,
{
    pub fn new(form: F, store: SettingsStore<B>, broadcaster: T) -> Self {
        Self {
            form,
            store,
            broadcaster,
        }
    }

    /// Populate the form from the store and render both previews.
    pub fn open(&self) {
        let settings = self.store.load();
        self.form
            .set_color_value(ColorField::Sandbox, &settings.sandbox_color);
        self.form
            .set_color_value(ColorField::Production, &settings.production_color);
        self.form.set_org_name_checked(settings.show_org_name);
        self.refresh_previews();
    }

    /// Keystroke handler for either color field: live preview only, nothing
    /// is persisted until the field loses focus.
    pub fn color_input(&self) {
        self.refresh_previews();
    }

    /// Blur handler: final preview refresh, then persist with invalid colors
    /// reverted to their defaults. The field keeps showing what the user
    /// typed until the next load.
    pub fn color_blur(&self) {
        self.refresh_previews();
        self.persist();
    }

    /// The checkbox persists immediately on change.
    pub fn toggle_org_name(&self) {
        self.persist();
    }

    /// Overwrites the store with the defaults, reloads the form from the
    /// store, and pushes the reset state out.
    pub fn reset(&self) {
        match self.store.reset() {
            Ok(defaults) => {
                self.open();
                self.broadcast(defaults);
            }
            Err(err) => tracing::warn!(%err, "failed to reset settings"),
        }
    }

    fn persist(&self) {
        let settings = Settings {
            sandbox_color: self.form.color_value(ColorField::Sandbox),
            production_color: self.form.color_value(ColorField::Production),
            show_org_name: self.form.org_name_checked(),
        }
        .sanitized();

        match self.store.save(&settings) {
            Ok(()) => self.broadcast(settings),
            Err(err) => tracing::warn!(%err, "failed to save settings"),
        }
    }

    fn broadcast(&self, settings: Settings) {
        let reports = self
            .broadcaster
            .broadcast(&RuntimeMessage::UpdateBanner { settings });
        let failed = reports.iter().filter(|r| r.outcome.is_err()).count();
        tracing::debug!(
            delivered = reports.len() - failed,
            failed,
            "broadcast banner update"
        );
    }

    fn refresh_previews(&self) {
        for field in ColorField::ALL {
            let value = self.form.color_value(field);
            let style = if is_valid_hex_color(&value) {
                PreviewStyle::Swatch { color: value }
            } else {
                PreviewStyle::Placeholder
            };
            self.form.render_preview(field, style);
        }
    }
}
