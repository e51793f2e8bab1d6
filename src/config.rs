use crate::controller::{MappingProfile, PanelPolicy};
use crate::error::ConfigError;

/// Where the mapping controls and message panel live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSurface {
    /// egui overlay drawn on top of the scene
    Overlay,
    /// Existing elements of the host page (wasm only)
    HostPage,
}

const FULL_WINDOW: [(&str, &str); 5] =
    [("position", "fixed"), ("left", "0"), ("top", "0"), ("width", "100vw"), ("height", "100vh")];

impl ControlSurface {
    /// Inline style for the full-window canvas. With page controls the canvas
    /// sits behind the page content so the page's inputs stay clickable.
    pub fn canvas_style(self) -> Vec<(&'static str, &'static str)> {
        let mut style = FULL_WINDOW.to_vec();
        if self == ControlSurface::HostPage {
            style.push(("z-index", "-1"));
        }
        style
    }
}

/// Every tunable of the demo in one place
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub profile: MappingProfile,
    pub panel_policy: PanelPolicy,
    pub control_surface: ControlSurface,
    pub asset_root: String,

    // Movement, per tick
    pub move_speed: f32,
    pub gravity: f32,
    pub jump_strength: f32,
    pub ground_height: f32,

    pub interaction_threshold: f32,

    // Light orbit
    pub light_radius: f32,
    pub light_height: f32,
    pub light_rate: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            profile: MappingProfile::Independent,
            panel_policy: PanelPolicy::HideWhenClear,
            control_surface: ControlSurface::Overlay,
            asset_root: "./assets".to_string(),
            move_speed: 0.05,
            gravity: 0.01,
            jump_strength: 0.2,
            ground_height: 1.0,
            interaction_threshold: 1.5,
            light_radius: 2.0,
            light_height: 1.0,
            light_rate: 0.03,
        }
    }
}

impl DemoConfig {
    /// Apply `key=value` overrides. Keys are shared between the native
    /// environment and the wasm query string; unknown keys are ignored.
    pub fn apply_pairs<'a, I>(&mut self, pairs: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in pairs {
            match key {
                "profile" => {
                    self.profile = match value.to_ascii_lowercase().as_str() {
                        "exclusive" => MappingProfile::Exclusive,
                        "independent" => MappingProfile::Independent,
                        _ => return Err(ConfigError::UnknownProfile(value.to_string())),
                    }
                }
                "panel" => {
                    self.panel_policy = match value.to_ascii_lowercase().as_str() {
                        "sticky" => PanelPolicy::Sticky,
                        "hide" => PanelPolicy::HideWhenClear,
                        _ => return Err(ConfigError::UnknownPanelPolicy(value.to_string())),
                    }
                }
                "controls" => {
                    self.control_surface = match value.to_ascii_lowercase().as_str() {
                        "overlay" => ControlSurface::Overlay,
                        "page" => ControlSurface::HostPage,
                        _ => return Err(ConfigError::UnknownControlSurface(value.to_string())),
                    }
                }
                "assets" => {
                    self.asset_root = value.trim_end_matches('/').to_string();
                }
                "light_rate" => {
                    self.light_rate = value.parse().map_err(|_| ConfigError::InvalidNumber {
                        key: key.to_string(),
                        value: value.to_string(),
                    })?;
                }
                other => {
                    tracing::debug!("ignoring unknown config key `{}`", other);
                }
            }
        }
        Ok(())
    }

    /// Native overrides from `RELIEF_*` environment variables
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars = [
            ("profile", "RELIEF_PROFILE"),
            ("panel", "RELIEF_PANEL"),
            ("assets", "RELIEF_ASSET_ROOT"),
            ("light_rate", "RELIEF_LIGHT_RATE"),
        ];
        let values: Vec<(&str, String)> = vars
            .iter()
            .filter_map(|(key, var)| std::env::var(var).ok().map(|v| (*key, v)))
            .collect();

        let mut config = Self::default();
        config.apply_pairs(values.iter().map(|(k, v)| (*k, v.as_str())))?;
        Ok(config)
    }

    /// Wasm overrides from a URL query string such as `?profile=exclusive&controls=page`
    pub fn from_query(query: &str) -> Result<Self, ConfigError> {
        let decoded: Vec<(String, String)> = query
            .trim_start_matches('?')
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|p| p.split_once('=').unwrap_or((p, "")))
            .map(|(k, v)| (decode_component(k), decode_component(v)))
            .collect();

        let mut config = Self::default();
        config.apply_pairs(decoded.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        Ok(config)
    }

    /// Resolve a path relative to the asset root
    pub fn asset_path(&self, relative: &str) -> String {
        format!("{}/{}", self.asset_root, relative)
    }
}

/// `application/x-www-form-urlencoded` decoding: `+` is a space, `%XX` a byte.
/// Malformed escapes are kept as written.
fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(byte) => {
                        out.push(byte);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo_constants() {
        let config = DemoConfig::default();
        assert_eq!(config.profile, MappingProfile::Independent);
        assert_eq!(config.panel_policy, PanelPolicy::HideWhenClear);
        assert_eq!(config.interaction_threshold, 1.5);
        assert_eq!(config.light_rate, 0.03);
        assert_eq!(config.asset_path("rock/a.jpg"), "./assets/rock/a.jpg");
    }

    #[test]
    fn test_query_overrides() {
        let config = DemoConfig::from_query("?profile=Exclusive&panel=sticky&controls=page&assets=/static/&light_rate=0.1")
            .unwrap();
        assert_eq!(config.profile, MappingProfile::Exclusive);
        assert_eq!(config.panel_policy, PanelPolicy::Sticky);
        assert_eq!(config.control_surface, ControlSurface::HostPage);
        assert_eq!(config.asset_root, "/static");
        assert_eq!(config.light_rate, 0.1);
    }

    #[test]
    fn test_query_rejects_unknown_values() {
        assert_eq!(
            DemoConfig::from_query("profile=merged").unwrap_err(),
            ConfigError::UnknownProfile("merged".to_string())
        );
        assert!(matches!(
            DemoConfig::from_query("light_rate=fast"),
            Err(ConfigError::InvalidNumber { .. })
        ));
        // Unrelated query keys are left alone
        assert!(DemoConfig::from_query("utm_source=x&debug").is_ok());
    }

    #[test]
    fn test_page_controls_keep_canvas_behind_content() {
        let overlay = ControlSurface::Overlay.canvas_style();
        assert!(overlay.contains(&("position", "fixed")));
        assert!(!overlay.iter().any(|(property, _)| *property == "z-index"));

        let page = ControlSurface::HostPage.canvas_style();
        assert!(page.contains(&("position", "fixed")));
        assert!(page.contains(&("z-index", "-1")));
    }

    #[test]
    fn test_query_values_are_percent_decoded() {
        let config = DemoConfig::from_query("?assets=%2Fcdn%2Ftex%2F&profile=%45xclusive").unwrap();
        assert_eq!(config.asset_root, "/cdn/tex");
        assert_eq!(config.profile, MappingProfile::Exclusive);

        assert_eq!(decode_component("my+maps%20v2"), "my maps v2");
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz%4"), "%zz%4");
    }
}
