use serde::{Deserialize, Serialize};

/// Which of a marker's two icons is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconVariant {
    Default,
    Active,
}

impl IconVariant {
    /// Asset name for a marker type, e.g. `device_active`
    pub fn asset_name(self, marker_type: &str) -> String {
        match self {
            IconVariant::Default => format!("{}_default", marker_type),
            IconVariant::Active => format!("{}_active", marker_type),
        }
    }
}

/// Resolves icon asset names to URLs
pub trait IconResolver {
    fn resolve_icon(&self, name: &str) -> String;
}

/// Resolves `name` to `{base}/{name}.{extension}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathIconResolver {
    pub base: String,
    pub extension: String,
}

impl PathIconResolver {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            extension: "png".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

impl Default for PathIconResolver {
    fn default() -> Self {
        Self::new("/icons")
    }
}

impl IconResolver for PathIconResolver {
    fn resolve_icon(&self, name: &str) -> String {
        format!("{}/{}.{}", self.base.trim_end_matches('/'), name, self.extension)
    }
}

impl<F> IconResolver for F
where
    F: Fn(&str) -> String,
{
    fn resolve_icon(&self, name: &str) -> String {
        self(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_names() {
        assert_eq!(IconVariant::Default.asset_name("pump"), "pump_default");
        assert_eq!(IconVariant::Active.asset_name("pump"), "pump_active");
    }

    #[test]
    fn test_path_resolver() {
        let resolver = PathIconResolver::new("/static/icons/").with_extension("svg");
        assert_eq!(resolver.resolve_icon("pump_default"), "/static/icons/pump_default.svg");
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |name: &str| format!("cdn://{}", name);
        assert_eq!(resolver.resolve_icon("a"), "cdn://a");
    }
}
