use thiserror::Error;

/// A texture could not be produced from its image file.
/// Recoverable: the slot keeps rendering with the default texture.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// A UI control expected on the host page is missing or unusable. Fatal at startup.
#[derive(Debug, Error)]
pub enum ControlBindingError {
    #[error("no element matches `{selector}`")]
    MissingElement { selector: String },
    #[error("element `{selector}` is not a {expected}")]
    WrongElementType { selector: String, expected: &'static str },
    #[error("failed to attach `{event}` listener to `{selector}`")]
    Listener { selector: String, event: &'static str },
}

/// Rendering failed in a way that ends the session.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown mapping profile `{0}` (expected `exclusive` or `independent`)")]
    UnknownProfile(String),
    #[error("unknown panel policy `{0}` (expected `sticky` or `hide`)")]
    UnknownPanelPolicy(String),
    #[error("unknown control surface `{0}` (expected `overlay` or `page`)")]
    UnknownControlSurface(String),
    #[error("`{key}` expects a number, got `{value}`")]
    InvalidNumber { key: String, value: String },
}

/// Startup failures, whichever layer they come from.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    ControlBinding(#[from] ControlBindingError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
