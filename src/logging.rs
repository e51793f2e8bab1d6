use cfg_if::cfg_if;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use tracing_subscriber::util::SubscriberInitExt;

/// `RUST_LOG` wins; otherwise info, with wgpu's own chatter kept to warnings
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub fn init() {
            // Log to browser console via tracing-wasm
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            // A second call (hot reload) keeps the first subscriber
            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(wasm_layer)
                .try_init();

            // Panics with stacktrace
            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use std::ffi::OsString;
        use std::io;
        use std::path::{Path, PathBuf};
        use once_cell::sync::OnceCell;
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        pub const DEFAULT_LOG_FILE: &str = "logs/relief.log";

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Directory and file name prefix for the daily rolling log
        fn log_file_location(path: &str) -> (PathBuf, OsString) {
            let path = Path::new(path);
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let file = path
                .file_name()
                .map(|f| f.to_os_string())
                .unwrap_or_else(|| OsString::from("relief.log"));
            (dir, file)
        }

        fn panic_message(info: &std::panic::PanicHookInfo<'_>) -> String {
            let mut msg = String::new();
            if let Some(loc) = info.location() {
                msg.push_str(&format!("panic at {}:{}:{} ", loc.file(), loc.line(), loc.column()));
            }
            if let Some(s) = info.payload().downcast_ref::<&str>() { msg.push_str(s); }
            else if let Some(s) = info.payload().downcast_ref::<String>() { msg.push_str(s); }
            else { msg.push_str("<non-string panic>"); }
            msg
        }

        pub fn init() {
            // Console (stderr) layer with file/line
            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact();

            let log_path = std::env::var("RUST_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
            let (dir, file) = log_file_location(&log_path);
            let (nb_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file));
            let _ = FILE_GUARD.set(guard);

            let file_layer = fmt::layer()
                .with_writer(nb_writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact();

            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(console_layer)
                .with(file_layer)
                .try_init();

            // Hook panics to log with backtrace
            std::panic::set_hook(Box::new(|info| {
                let bt = std::backtrace::Backtrace::force_capture();
                tracing::error!("{}\nBacktrace:\n{:?}", panic_message(info), bt);
            }));
        }

        #[cfg(test)]
        mod tests {
            use super::*;

            #[test]
            fn test_log_file_location() {
                let (dir, file) = log_file_location(DEFAULT_LOG_FILE);
                assert_eq!(dir, PathBuf::from("logs"));
                assert_eq!(file, OsString::from("relief.log"));

                let (dir, file) = log_file_location("demo.log");
                assert_eq!(dir, PathBuf::from("."));
                assert_eq!(file, OsString::from("demo.log"));

                let (_, file) = log_file_location("/");
                assert_eq!(file, OsString::from("relief.log"));
            }
        }
    }
}
