//! 日誌巨集。
//!
//! 分級巨集接受訊息與結構化欄位：`info!("fetch failed", url = %url, attempt = 3)`；
//! 格式化巨集接受格式字串：`infof!("level: {}", level)`。
//! 巨集在呼叫端展開，所以 caller 永遠是呼叫端的位置，
//! 並以呼叫端 crate 的 `CARGO_MANIFEST_DIR` 補成完整路徑。

#[doc(hidden)]
#[macro_export]
macro_rules! __log_event {
    ($level:ident, $severity:literal, $msg:expr $(, $($field:tt)+)?) => {
        $crate::__tracing::event!(
            $crate::__tracing::Level::$level,
            severity = $severity,
            caller_root = ::core::env!("CARGO_MANIFEST_DIR"),
            $($($field)+ ,)?
            message = %$msg
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __logf_event {
    ($level:ident, $severity:literal, $($arg:tt)+) => {
        $crate::__tracing::event!(
            $crate::__tracing::Level::$level,
            severity = $severity,
            caller_root = ::core::env!("CARGO_MANIFEST_DIR"),
            $($arg)+
        )
    };
}

#[macro_export]
macro_rules! debug {
    ($msg:expr $(, $($field:tt)+)?) => {
        if $crate::logger::enabled($crate::logger::Level::Debug) {
            $crate::__log_event!(DEBUG, "debug", $msg $(, $($field)+)?);
        }
    };
}

#[macro_export]
macro_rules! info {
    ($msg:expr $(, $($field:tt)+)?) => {
        if $crate::logger::enabled($crate::logger::Level::Info) {
            $crate::__log_event!(INFO, "info", $msg $(, $($field)+)?);
        }
    };
}

#[macro_export]
macro_rules! warn {
    ($msg:expr $(, $($field:tt)+)?) => {
        if $crate::logger::enabled($crate::logger::Level::Warn) {
            $crate::__log_event!(WARN, "warn", $msg $(, $($field)+)?);
        }
    };
}

#[macro_export]
macro_rules! error {
    ($msg:expr $(, $($field:tt)+)?) => {
        if $crate::logger::enabled($crate::logger::Level::Error) {
            $crate::__log_event!(ERROR, "error", $msg $(, $($field)+)?);
        }
    };
}

/// 記錄後 panic
#[macro_export]
macro_rules! log_panic {
    ($msg:expr $(, $($field:tt)+)?) => {{
        let message = $msg;
        if $crate::logger::enabled($crate::logger::Level::Panic) {
            $crate::__log_event!(ERROR, "panic", &message $(, $($field)+)?);
        }
        ::std::panic!("{}", message)
    }};
}

/// 記錄後以狀態碼 1 結束程序
#[macro_export]
macro_rules! fatal {
    ($msg:expr $(, $($field:tt)+)?) => {{
        if $crate::logger::enabled($crate::logger::Level::Fatal) {
            $crate::__log_event!(ERROR, "fatal", $msg $(, $($field)+)?);
        }
        $crate::logger::terminate()
    }};
}

#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => {
        if $crate::logger::enabled($crate::logger::Level::Debug) {
            $crate::__logf_event!(DEBUG, "debug", $($arg)+);
        }
    };
}

#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => {
        if $crate::logger::enabled($crate::logger::Level::Info) {
            $crate::__logf_event!(INFO, "info", $($arg)+);
        }
    };
}

#[macro_export]
macro_rules! warnf {
    ($($arg:tt)+) => {
        if $crate::logger::enabled($crate::logger::Level::Warn) {
            $crate::__logf_event!(WARN, "warn", $($arg)+);
        }
    };
}

#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => {
        if $crate::logger::enabled($crate::logger::Level::Error) {
            $crate::__logf_event!(ERROR, "error", $($arg)+);
        }
    };
}

#[macro_export]
macro_rules! log_panicf {
    ($($arg:tt)+) => {{
        let message = ::std::format!($($arg)+);
        if $crate::logger::enabled($crate::logger::Level::Panic) {
            $crate::__logf_event!(ERROR, "panic", "{}", message);
        }
        ::std::panic!("{}", message)
    }};
}

#[macro_export]
macro_rules! fatalf {
    ($($arg:tt)+) => {{
        if $crate::logger::enabled($crate::logger::Level::Fatal) {
            $crate::__logf_event!(ERROR, "fatal", $($arg)+);
        }
        $crate::logger::terminate()
    }};
}
