use super::config::LogConfig;
use file_rotate::compression::Compression;
use file_rotate::suffix::{AppendTimestamp, FileLimit};
use file_rotate::{ContentLimit, FileRotate};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const BYTES_PER_MB: usize = 1024 * 1024;
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: usize,
    /// 0 表示不限
    pub max_backups: usize,
    pub max_age: Option<Duration>,
    pub compress: bool,
}

impl From<&LogConfig> for RotationPolicy {
    fn from(config: &LogConfig) -> Self {
        let max_size = if config.max_size == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            config.max_size
        };

        Self {
            max_bytes: usize::try_from(max_size)
                .unwrap_or(usize::MAX)
                .saturating_mul(BYTES_PER_MB),
            max_backups: config.max_backups,
            max_age: (config.max_age > 0)
                .then(|| Duration::from_secs(config.max_age.saturating_mul(SECONDS_PER_DAY))),
            compress: config.compress,
        }
    }
}

/// 依大小輪替的日誌檔，輪替後的備份以時間戳記命名，
/// 並依數量與天數清除舊備份。
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    inner: FileRotate<AppendTimestamp>,
    written: usize,
}

impl RotatingFile {
    pub fn open(config: &LogConfig) -> io::Result<Self> {
        Self::with_policy(&config.file_name, RotationPolicy::from(config))
    }

    pub fn with_policy(path: &Path, policy: RotationPolicy) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let written = fs::metadata(path)
            .map(|meta| usize::try_from(meta.len()).unwrap_or(usize::MAX))
            .unwrap_or(0);

        let mut file = Self {
            path: path.to_path_buf(),
            policy,
            inner: file_rotate(path, &policy),
            written,
        };
        file.prune_expired();
        Ok(file)
    }

    /// 輪替出來的備份，由舊到新
    pub fn backups(&mut self) -> Vec<PathBuf> {
        self.inner.log_paths()
    }

    fn prune_expired(&mut self) {
        let Some(max_age) = self.policy.max_age else {
            return;
        };
        let now = SystemTime::now();

        let mut touched = false;
        for path in self.inner.log_paths() {
            let expired = match fs::metadata(&path).and_then(|meta| meta.modified()) {
                Ok(modified) => is_expired(modified, now, max_age),
                // 已經被刪掉的備份也要讓 FileRotate 忘掉
                Err(e) => e.kind() == io::ErrorKind::NotFound,
            };
            if expired {
                // 寫日誌的途中無處回報錯誤，刪不掉就留到下次輪替
                let _ = fs::remove_file(&path);
                touched = true;
            }
        }

        if touched {
            // FileRotate 記著自己輪替過的檔案，刪檔後要重建讓它重新掃描目錄，
            // 否則超過備份數量時會去刪已經不存在的檔案而寫入失敗
            self.inner = file_rotate(&self.path, &self.policy);
        }
    }
}

fn file_rotate(path: &Path, policy: &RotationPolicy) -> FileRotate<AppendTimestamp> {
    let file_limit = if policy.max_backups == 0 {
        FileLimit::Unlimited
    } else {
        FileLimit::MaxFiles(policy.max_backups)
    };
    let compression = if policy.compress {
        Compression::OnRotate(0)
    } else {
        Compression::None
    };

    FileRotate::new(
        path,
        AppendTimestamp::default(file_limit),
        ContentLimit::BytesSurpassed(policy.max_bytes.max(1)),
        compression,
        None,
    )
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // FileRotate 在寫入前檢查是否已超過上限
        let rotates = self.written > self.policy.max_bytes;
        let n = self.inner.write(buf)?;
        if rotates {
            self.written = n;
            self.prune_expired();
        } else {
            self.written = self.written.saturating_add(n);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn is_expired(modified: SystemTime, now: SystemTime, max_age: Duration) -> bool {
    now.duration_since(modified)
        .map(|age| age > max_age)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn policy(max_bytes: usize, compress: bool) -> RotationPolicy {
        RotationPolicy {
            max_bytes,
            max_backups: 3,
            max_age: None,
            compress,
        }
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_policy_from_config() {
        let config = LogConfig {
            max_size: 2,
            max_backups: 5,
            max_age: 1,
            compress: true,
            ..LogConfig::default()
        };
        let policy = RotationPolicy::from(&config);
        assert_eq!(policy.max_bytes, 2 * BYTES_PER_MB);
        assert_eq!(policy.max_backups, 5);
        assert_eq!(policy.max_age, Some(Duration::from_secs(SECONDS_PER_DAY)));
        assert!(policy.compress);

        let unlimited = RotationPolicy::from(&LogConfig {
            max_size: 0,
            max_age: 0,
            ..LogConfig::default()
        });
        assert_eq!(unlimited.max_bytes, 100 * BYTES_PER_MB);
        assert_eq!(unlimited.max_age, None);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("app.log");
        let mut file = RotatingFile::with_policy(&path, policy(1024, false)).unwrap();
        file.write_all(b"hello\n").unwrap();
        file.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_rotates_after_size_surpassed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::with_policy(&path, policy(16, false)).unwrap();

        file.write_all(b"01234567890123456789\n").unwrap();
        file.write_all(b"next\n").unwrap();
        file.flush().unwrap();

        let names = entries(dir.path());
        assert_eq!(names.len(), 2, "{names:?}");
        assert_eq!(fs::read_to_string(&path).unwrap(), "next\n");
        assert!(names.iter().any(|name| name.starts_with("app.log.")));
    }

    #[test]
    fn test_rotated_files_are_compressed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::with_policy(&path, policy(16, true)).unwrap();

        file.write_all(b"01234567890123456789\n").unwrap();
        file.write_all(b"next\n").unwrap();
        file.flush().unwrap();

        let names = entries(dir.path());
        assert!(names.iter().any(|name| name.ends_with(".gz")), "{names:?}");
    }

    fn backdate(path: &Path, days: u64) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(days * SECONDS_PER_DAY))
            .unwrap();
    }

    #[test]
    fn test_keeps_at_most_max_backups() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::with_policy(
            &path,
            RotationPolicy {
                max_bytes: 8,
                max_backups: 2,
                max_age: None,
                compress: false,
            },
        )
        .unwrap();

        for i in 0..6 {
            file.write_all(format!("record {i:04}\n").as_bytes()).unwrap();
        }
        file.flush().unwrap();

        assert_eq!(file.backups().len(), 2);
        assert_eq!(entries(dir.path()).len(), 3);
        assert_eq!(fs::read_to_string(&path).unwrap(), "record 0005\n");
    }

    #[test]
    fn test_expired_backups_pruned_without_failing_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        for stamp in ["20200101T000000", "20200102T000000"] {
            let backup = dir.path().join(format!("app.log.{stamp}"));
            fs::write(&backup, "stale\n").unwrap();
            backdate(&backup, 30);
        }

        let mut file = RotatingFile::with_policy(
            &path,
            RotationPolicy {
                max_bytes: 8,
                max_backups: 2,
                max_age: Some(Duration::from_secs(SECONDS_PER_DAY)),
                compress: false,
            },
        )
        .unwrap();
        assert!(file.backups().is_empty());

        for i in 0..5 {
            let line = format!("record {i:04}\n");
            assert_eq!(file.write(line.as_bytes()).unwrap(), line.len());
            if i == 1 {
                // 第一份輪替出來的備份也過期，下一次輪替時清掉
                for backup in file.backups() {
                    backdate(&backup, 30);
                }
            }
        }
        file.flush().unwrap();

        let names = entries(dir.path());
        assert!(!names.contains(&"app.log.20200101T000000".to_string()), "{names:?}");
        assert!(!names.contains(&"app.log.20200102T000000".to_string()), "{names:?}");
        assert!(names.len() <= 3, "{names:?}");
        assert_eq!(file.backups().len(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "record 0004\n");
    }

    #[test]
    fn test_is_expired() {
        let now = SystemTime::now();
        let day = Duration::from_secs(SECONDS_PER_DAY);
        assert!(is_expired(now - day * 8, now, day * 7));
        assert!(!is_expired(now - day, now, day * 7));
        // 檔案時間在未來時不刪除
        assert!(!is_expired(now + day, now, day));
    }
}
