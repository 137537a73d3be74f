//! Theme engine with embedded Tera templates.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Serialize;
use tera::Tera;
use tracing::debug;

use crate::access::path_to_access_key;
use crate::menu::NavItem;
use crate::session::Identity;

const TEMPLATES: &[(&str, &str)] = &[
    ("macros.html", include_str!("../../templates/macros.html")),
    ("base.html", include_str!("../../templates/base.html")),
    ("landing.html", include_str!("../../templates/landing.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("page.html", include_str!("../../templates/page.html")),
];

/// Values every page layout needs.
#[derive(Debug, Default, Serialize)]
pub struct PageChrome {
    pub identity: Option<Identity>,
    pub role_name: Option<String>,
    /// Navigation already filtered for the viewer.
    pub nav_items: Vec<NavItem>,
    pub notices: Vec<String>,
}

/// Theme engine for rendering templates.
pub struct ThemeEngine {
    tera: Tera,
}

impl ThemeEngine {
    /// Create a theme engine with the built-in templates.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .context("failed to initialize Tera templates")?;

        Self::register_filters(&mut tera);

        debug!(count = tera.get_template_names().count(), "loaded templates");

        Ok(Self { tera })
    }

    fn register_filters(tera: &mut Tera) {
        // Derive the access key for a path, e.g. `{{ path | access_key }}`.
        tera.register_filter(
            "access_key",
            |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
                let path = tera::try_get_value!("access_key", "value", String, value);
                Ok(tera::Value::String(path_to_access_key(&path)))
            },
        );
    }

    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Render `template` with the page chrome plus page-specific values.
    pub fn render_page(
        &self,
        template: &str,
        chrome: &PageChrome,
        extra: tera::Context,
    ) -> Result<String> {
        let mut context =
            tera::Context::from_serialize(chrome).context("failed to build page context")?;
        context.extend(extra);

        self.tera
            .render(template, &context)
            .with_context(|| format!("failed to render {template}"))
    }
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEngine").finish()
    }
}
