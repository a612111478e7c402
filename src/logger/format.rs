use super::config::{Encoding, Level, LogConfig};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::backtrace::Backtrace;
use std::fmt;
use std::path::Path;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_log::NormalizeEvent;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// 巨集送出的等級欄位，用來區分同為 ERROR 的 error、panic、fatal
pub const SEVERITY_FIELD: &str = "severity";

/// 巨集送出的呼叫端 crate 根目錄（`CARGO_MANIFEST_DIR`），用來把 caller 補成完整路徑
pub const CALLER_ROOT_FIELD: &str = "caller_root";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// stacktrace 開頭屬於日誌本身的 frame
const LOGGING_FRAMES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "tracing::",
    "tracing_core::",
    "tracing_subscriber::",
    "tracing_log::",
    "log::",
    "parking_lot::",
    "lock_api::",
    concat!(module_path!(), "::RecordFormat"),
    concat!(module_path!(), "::capture_stacktrace"),
];

/// 日誌紀錄格式：time、level、logger、caller、msg、附加欄位、stacktrace
#[derive(Debug, Clone, Copy)]
pub struct RecordFormat {
    encoding: Encoding,
    stacktrace_level: Level,
    development: bool,
}

impl RecordFormat {
    pub fn from_config(config: &LogConfig) -> Self {
        Self {
            encoding: config.encoding(),
            stacktrace_level: config.stacktrace_level(),
            development: config.development,
        }
    }
}

struct Record<'a> {
    time: String,
    level: Level,
    logger: &'a str,
    caller: Option<String>,
    message: String,
    thread: Option<String>,
    fields: Vec<(String, Value)>,
    stacktrace: Option<String>,
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("time", &self.time)?;
        map.serialize_entry("level", self.level.as_str())?;
        map.serialize_entry("logger", self.logger)?;
        if let Some(caller) = &self.caller {
            map.serialize_entry("caller", caller)?;
        }
        map.serialize_entry("msg", &self.message)?;
        if let Some(thread) = &self.thread {
            map.serialize_entry("thread", thread)?;
        }
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        if let Some(stacktrace) = &self.stacktrace {
            map.serialize_entry("stacktrace", stacktrace)?;
        }
        map.end()
    }
}

/// console 格式行尾的附加欄位
struct ExtraFields<'a> {
    thread: Option<&'a str>,
    fields: &'a [(String, Value)],
}

impl ExtraFields<'_> {
    fn is_empty(&self) -> bool {
        self.thread.is_none() && self.fields.is_empty()
    }
}

impl Serialize for ExtraFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(thread) = self.thread {
            map.serialize_entry("thread", thread)?;
        }
        for (name, value) in self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        // 由 log crate 橋接過來的事件，要還原原本的 target 與檔案位置
        let normalized = event.normalized_metadata();
        let meta = normalized.as_ref().unwrap_or_else(|| event.metadata());

        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        let level = collector
            .severity
            .unwrap_or_else(|| Level::from_tracing(meta.level()));
        let caller = meta.file().map(|file| {
            let file = resolve_caller_file(file, collector.caller_root.as_deref());
            match meta.line() {
                Some(line) => format!("{file}:{line}"),
                None => file,
            }
        });
        let thread = self.development.then(|| {
            let current = std::thread::current();
            current.name().unwrap_or("unnamed").to_string()
        });
        let stacktrace = (level >= self.stacktrace_level).then(capture_stacktrace);

        let record = Record {
            time: chrono::Local::now().format(TIME_FORMAT).to_string(),
            level,
            logger: meta.target(),
            caller,
            message: collector.message.unwrap_or_default(),
            thread,
            fields: collector.fields,
            stacktrace,
        };

        match self.encoding {
            Encoding::Json => write_json(&mut writer, &record),
            Encoding::Console => write_console(&mut writer, &record),
        }
    }
}

fn write_json(writer: &mut Writer<'_>, record: &Record<'_>) -> fmt::Result {
    let line = serde_json::to_string(record).map_err(|_| fmt::Error)?;
    writeln!(writer, "{line}")
}

fn write_console(writer: &mut Writer<'_>, record: &Record<'_>) -> fmt::Result {
    write!(
        writer,
        "{}\t{}\t{}",
        record.time,
        record.level.as_str(),
        record.logger
    )?;
    if let Some(caller) = &record.caller {
        write!(writer, "\t{caller}")?;
    }
    write!(writer, "\t{}", record.message)?;

    let extra = ExtraFields {
        thread: record.thread.as_deref(),
        fields: &record.fields,
    };
    if !extra.is_empty() {
        let encoded = serde_json::to_string(&extra).map_err(|_| fmt::Error)?;
        write!(writer, "\t{encoded}")?;
    }
    writeln!(writer)?;

    if let Some(stacktrace) = &record.stacktrace {
        writeln!(writer, "{}", stacktrace.trim_end())?;
    }
    Ok(())
}

/// `file!()` 是相對路徑，以呼叫端 crate 的根目錄補成完整路徑。
/// workspace 成員的 `file!()` 從 workspace 根目錄算起，所以要找出重疊的部分。
fn resolve_caller_file(file: &str, root: Option<&str>) -> String {
    let path = Path::new(file);
    let Some(root) = root.map(Path::new) else {
        return file.to_string();
    };
    if path.is_absolute() {
        return file.to_string();
    }

    let mut bases: Vec<&Path> = root.ancestors().collect();
    bases.reverse();
    for base in bases {
        if let Ok(member) = root.strip_prefix(base) {
            if path.starts_with(member) {
                return base.join(path).display().to_string();
            }
        }
    }
    root.join(path).display().to_string()
}

fn capture_stacktrace() -> String {
    trim_stacktrace(&Backtrace::force_capture().to_string())
}

/// 去掉開頭屬於日誌與 tracing 派送的 frame，讓 stacktrace 從呼叫端開始。
/// 沒有符號資訊時原樣回傳。
fn trim_stacktrace(raw: &str) -> String {
    let mut frames: Vec<Vec<&str>> = Vec::new();
    for line in raw.lines() {
        match frames.last_mut() {
            Some(frame) if frame_symbol(line).is_none() => frame.push(line),
            _ => frames.push(vec![line]),
        }
    }

    let skip = frames
        .iter()
        .take_while(|frame| {
            frame
                .first()
                .and_then(|line| frame_symbol(line))
                .is_some_and(is_logging_frame)
        })
        .count();
    if skip == 0 || skip == frames.len() {
        return raw.to_string();
    }

    frames[skip..]
        .iter()
        .flatten()
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

/// `  12: crate::module::function` 這種 frame 標題行的符號
fn frame_symbol(line: &str) -> Option<&str> {
    let (index, symbol) = line.trim_start().split_once(": ")?;
    (!index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())).then_some(symbol)
}

fn is_logging_frame(symbol: &str) -> bool {
    let symbol = symbol.trim_start_matches('<');
    LOGGING_FRAMES.iter().any(|prefix| symbol.starts_with(prefix))
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    severity: Option<Level>,
    caller_root: Option<String>,
    fields: Vec<(String, Value)>,
}

impl FieldCollector {
    fn store(&mut self, field: &Field, value: Value) {
        match field.name() {
            "message" => {
                self.message = Some(match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                });
            }
            SEVERITY_FIELD => {
                if let Value::String(s) = &value {
                    self.severity = Some(Level::parse(s));
                }
            }
            CALLER_ROOT_FIELD => {
                if let Value::String(s) = value {
                    self.caller_root = Some(s);
                }
            }
            name if name.starts_with("log.") => {}
            name => self.fields.push((name.to_string(), value)),
        }
    }
}

impl Visit for FieldCollector {
    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        self.store(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.store(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.store(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.store(field, Value::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.store(field, Value::String(value.to_string()));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.store(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.store(field, Value::String(format!("{value:?}")));
    }
}
