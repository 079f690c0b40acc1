//! ログ初期化
//!
//! 標準エラーに加え、`log_file` が設定されていれば同じ行をファイルにも追記する。

use env_logger::{Builder, Env, Target};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// 標準エラーとファイルの両方に書く
pub struct TeeWriter<W: Write> {
    file: W,
}

impl<W: Write> TeeWriter<W> {
    pub fn new(file: W) -> Self {
        Self { file }
    }
}

impl<W: Write> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// 追記モードで開く（親ディレクトリが無ければ作る）
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// RUST_LOG が無ければ自クレートだけ info（-v で debug）
pub fn init(verbose: bool, log_file: Option<&Path>) {
    let level = if verbose { "debug" } else { "info" };
    let default_filter = format!("warn,store_report={0},store_report_common={0}", level);
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.format_timestamp_secs();

    let mut open_error: Option<(PathBuf, io::Error)> = None;
    if let Some(path) = log_file {
        match open_log_file(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(TeeWriter::new(file))));
            }
            Err(e) => open_error = Some((path.to_path_buf(), e)),
        }
    }
    builder.init();

    if let Some((path, e)) = open_error {
        log::warn!("ログファイルを開けません（標準エラーのみ）: {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_file_created_and_appended() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("run.log");

        let mut tee = TeeWriter::new(open_log_file(&path).unwrap());
        tee.write_all(b"first\n").unwrap();
        tee.flush().unwrap();

        let mut tee = TeeWriter::new(open_log_file(&path).unwrap());
        tee.write_all(b"second\n").unwrap();
        tee.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_open_log_file_fails_when_parent_is_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();
        assert!(open_log_file(&blocker.join("run.log")).is_err());
    }
}
