//! 全程序共用的結構化日誌。
//!
//! 第一次使用時（或第一次呼叫 [`init`]）安裝全域 tracing subscriber，
//! 輸出層與等級過濾都包在 `reload` 層裡，之後再呼叫 [`init`] 會整組替換。
//! 初始化應該在啟動工作執行緒之前完成。

pub mod config;
pub mod format;
mod macros;
pub mod rotate;

pub use config::{Encoding, Level, LogConfig};
pub use format::RecordFormat;
pub use rotate::{RotatingFile, RotationPolicy};

use crate::utils::error::{InfraError, Result};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{fmt, reload, Layer, Registry};

type FilterLayer = reload::Layer<LevelFilter, Registry>;
type FilteredRegistry = Layered<FilterLayer, Registry>;
type OutputLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

static GLOBAL: OnceCell<Logger> = OnceCell::new();

pub struct Logger {
    level: AtomicU8,
    filter: reload::Handle<LevelFilter, Registry>,
    output: reload::Handle<OutputLayer, FilteredRegistry>,
    installed: bool,
}

impl Logger {
    fn install(level: Level, output: OutputLayer) -> Self {
        let (filter_layer, filter) = reload::Layer::new(level.level_filter());
        let (output_layer, output) = reload::Layer::new(output);

        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(output_layer);
        let installed = match tracing::subscriber::set_global_default(subscriber) {
            Ok(()) => {
                // 讓 log crate 的紀錄（例如 sqlx）也走同一個 subscriber
                let _ = tracing_log::LogTracer::builder()
                    .with_max_level(log::LevelFilter::Trace)
                    .init();
                true
            }
            Err(e) => {
                // 全域 subscriber 已被其他程式碼安裝，紀錄會交給那個 subscriber
                eprintln!("infra-kit logger not installed: {e}");
                false
            }
        };

        Self {
            level: AtomicU8::new(level as u8),
            filter,
            output,
            installed,
        }
    }

    fn replace(&self, level: Level, output: OutputLayer) -> Result<()> {
        if self.installed {
            self.output
                .reload(output)
                .map_err(|e| InfraError::LoggerError {
                    message: e.to_string(),
                })?;
            self.filter
                .reload(level.level_filter())
                .map_err(|e| InfraError::LoggerError {
                    message: e.to_string(),
                })?;
        }
        self.level.store(level as u8, Ordering::Release);
        Ok(())
    }

    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Acquire))
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// 是否成功安裝為全域 subscriber
    pub fn is_installed(&self) -> bool {
        self.installed
    }
}

/// 以設定重新建立全域日誌，之後的紀錄都使用新的設定
pub fn init(config: LogConfig) -> Result<()> {
    let level = config.level();
    let output = output_layer(&config)?;

    if let Some(logger) = GLOBAL.get() {
        return logger.replace(level, output);
    }

    let mut installed_now = false;
    let logger = GLOBAL.get_or_init(|| {
        installed_now = true;
        Logger::install(level, output)
    });
    if !installed_now {
        // 與其他執行緒同時初始化，改為替換
        logger.replace(level, output_layer(&config)?)?;
    }
    Ok(())
}

/// 全域日誌；尚未初始化時使用 [`LogConfig::default`]
pub fn global() -> &'static Logger {
    GLOBAL.get_or_init(|| {
        let config = LogConfig::default();
        let output = output_layer(&config).unwrap_or_else(|e| {
            eprintln!("infra-kit logger falling back to stdout: {e}");
            stdout_layer(&config)
        });
        Logger::install(config.level(), output)
    })
}

pub fn enabled(level: Level) -> bool {
    global().enabled(level)
}

/// `fatal!` 記錄完成後結束程序
pub fn terminate() -> ! {
    std::process::exit(1)
}

fn output_layer(config: &LogConfig) -> Result<OutputLayer> {
    let file = RotatingFile::open(config)?;
    Ok(fmt::layer()
        .with_ansi(false)
        .event_format(RecordFormat::from_config(config))
        .with_writer(std::io::stdout.and(Mutex::new(file)))
        .boxed())
}

fn stdout_layer(config: &LogConfig) -> OutputLayer {
    fmt::layer()
        .with_ansi(false)
        .event_format(RecordFormat::from_config(config))
        .with_writer(std::io::stdout)
        .boxed()
}
