use cfg_if::cfg_if;

use crate::config::DemoConfig;
use crate::error::AssetLoadError;
use crate::model::TextureKey;
use crate::view::texture::DecodedImage;

/// A finished load, successful or not
pub struct LoadResult {
    pub key: TextureKey,
    pub result: Result<DecodedImage, AssetLoadError>,
}

/// Fire-and-forget texture loading. Requests never block the frame loop;
/// finished loads are collected with `drain` once per frame.
pub struct AssetLoader {
    inner: platform::Loader,
    pending: usize,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self { inner: platform::Loader::new(), pending: 0 }
    }

    pub fn request(&mut self, key: TextureKey, path: String) {
        tracing::debug!("requesting {}", path);
        self.pending += 1;
        self.inner.request(key, path);
    }

    /// Request every texture the demo uses
    pub fn request_all(&mut self, config: &DemoConfig) {
        for key in TextureKey::ALL {
            self.request(key, config.asset_path(key.relative_path()));
        }
    }

    pub fn drain(&mut self) -> Vec<LoadResult> {
        let done = self.inner.drain();
        if !done.is_empty() {
            self.pending = self.pending.saturating_sub(done.len());
            if self.pending == 0 {
                tracing::info!("all texture loads finished");
            }
        }
        done
    }

    /// Loads requested but not finished yet
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        mod platform {
            use std::cell::RefCell;
            use std::rc::Rc;
            use wasm_bindgen::JsCast;
            use wasm_bindgen_futures::JsFuture;

            use super::LoadResult;
            use crate::error::AssetLoadError;
            use crate::model::TextureKey;
            use crate::view::texture::decode_image;

            pub struct Loader {
                ready: Rc<RefCell<Vec<LoadResult>>>,
            }

            impl Loader {
                pub fn new() -> Self {
                    Self { ready: Rc::new(RefCell::new(Vec::new())) }
                }

                pub fn request(&mut self, key: TextureKey, path: String) {
                    let ready = self.ready.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let result = match fetch_bytes(&path).await {
                            Ok(bytes) => decode_image(&path, &bytes),
                            Err(e) => Err(e),
                        };
                        ready.borrow_mut().push(LoadResult { key, result });
                    });
                }

                pub fn drain(&mut self) -> Vec<LoadResult> {
                    self.ready.borrow_mut().drain(..).collect()
                }
            }

            async fn fetch_bytes(path: &str) -> Result<Vec<u8>, AssetLoadError> {
                let fetch_err = |reason: String| AssetLoadError::Fetch { path: path.to_string(), reason };

                let window = web_sys::window().ok_or_else(|| fetch_err("no global `window`".into()))?;
                let response = JsFuture::from(window.fetch_with_str(path))
                    .await
                    .map_err(|e| fetch_err(format!("{e:?}")))?
                    .dyn_into::<web_sys::Response>()
                    .map_err(|_| fetch_err("fetch did not return a Response".into()))?;

                if !response.ok() {
                    return Err(fetch_err(format!("HTTP {}", response.status())));
                }

                let promise = response.array_buffer().map_err(|e| fetch_err(format!("{e:?}")))?;
                let buffer = JsFuture::from(promise).await.map_err(|e| fetch_err(format!("{e:?}")))?;
                Ok(js_sys::Uint8Array::new(&buffer).to_vec())
            }
        }
    } else {
        mod platform {
            use std::sync::mpsc::{channel, Receiver, Sender};

            use super::LoadResult;
            use crate::error::AssetLoadError;
            use crate::model::TextureKey;
            use crate::view::texture::decode_image;

            pub struct Loader {
                tx: Sender<LoadResult>,
                rx: Receiver<LoadResult>,
            }

            impl Loader {
                pub fn new() -> Self {
                    let (tx, rx) = channel();
                    Self { tx, rx }
                }

                pub fn request(&mut self, key: TextureKey, path: String) {
                    let tx = self.tx.clone();
                    std::thread::spawn(move || {
                        let result = std::fs::read(&path)
                            .map_err(|source| AssetLoadError::Read { path: path.clone(), source })
                            .and_then(|bytes| decode_image(&path, &bytes));
                        // The receiver only goes away when the app shuts down
                        let _ = tx.send(LoadResult { key, result });
                    });
                }

                pub fn drain(&mut self) -> Vec<LoadResult> {
                    self.rx.try_iter().collect()
                }
            }
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(loader: &mut AssetLoader, count: usize) -> Vec<LoadResult> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut done = Vec::new();
        while done.len() < count && Instant::now() < deadline {
            done.extend(loader.drain());
            std::thread::sleep(Duration::from_millis(5));
        }
        done
    }

    #[test]
    fn test_missing_file_reports_read_error() {
        let mut loader = AssetLoader::new();
        loader.request(TextureKey::RockColor, "definitely/not/here.jpg".to_string());
        assert_eq!(loader.pending(), 1);

        let done = wait_for(&mut loader, 1);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].key, TextureKey::RockColor);
        assert!(matches!(done[0].result, Err(AssetLoadError::Read { .. })));
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn test_request_all_covers_every_texture() {
        let config = DemoConfig {
            asset_root: "/nonexistent-relief-assets".to_string(),
            ..DemoConfig::default()
        };
        let mut loader = AssetLoader::new();
        loader.request_all(&config);
        assert_eq!(loader.pending(), TextureKey::ALL.len());

        let mut keys: Vec<_> = wait_for(&mut loader, 6).into_iter().map(|r| r.key).collect();
        keys.sort_by_key(|k| k.index());
        assert_eq!(keys, TextureKey::ALL.to_vec());
    }
}
