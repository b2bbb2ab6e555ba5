use std::collections::VecDeque;
use std::sync::{Mutex, Once};

const CONSOLE_QUEUE_MAX: usize = 64;

/// Prints records to stderr and keeps recent warnings/errors for the host HUD.
struct ConsoleLogger {
    console_q: Mutex<VecDeque<String>>,
}

impl ConsoleLogger {
    const fn new() -> Self {
        Self { console_q: Mutex::new(VecDeque::new()) }
    }

    fn queue(&self, line: String) {
        if let Ok(mut q) = self.console_q.lock() {
            if q.len() >= CONSOLE_QUEUE_MAX {
                q.pop_front();
            }
            q.push_back(line);
        }
    }

    fn drain(&self, out: &mut [u8]) -> usize {
        let Ok(mut q) = self.console_q.lock() else {
            return 0;
        };
        let mut written = 0usize;
        while let Some(line) = q.pop_front() {
            let bytes = line.as_bytes();
            if written + bytes.len() + 1 > out.len() {
                q.push_front(line);
                break;
            }
            out[written..written + bytes.len()].copy_from_slice(bytes);
            written += bytes.len();
            out[written] = b'\n';
            written += 1;
        }
        written
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}", record.level(), record.args());
        eprintln!("{line}");

        if record.level() <= log::Level::Warn {
            self.queue(line);
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger::new();
static INIT: Once = Once::new();

/// Install the console logger once. Later calls only adjust the level.
pub fn init_logger(level: log::LevelFilter) {
    let level = if cfg!(feature = "verbose_logs") { log::LevelFilter::Debug.max(level) } else { level };
    INIT.call_once(|| {
        // Another logger may already be installed by a Rust host; keep theirs.
        let _ = log::set_logger(&LOGGER);
    });
    log::set_max_level(level);
}

/// Move queued lines into `out`, newline separated. Lines that do not fit stay queued.
pub fn drain_console(out: &mut [u8]) -> usize {
    LOGGER.drain(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_respects_buffer_size() {
        let logger = ConsoleLogger::new();
        logger.queue("[ERROR] one".to_string());
        logger.queue("[WARN] two".to_string());

        let mut small = [0u8; 14];
        let n = logger.drain(&mut small);
        assert_eq!(&small[..n], b"[ERROR] one\n");

        let mut big = [0u8; 64];
        let n = logger.drain(&mut big);
        assert_eq!(&big[..n], b"[WARN] two\n");
        assert_eq!(logger.drain(&mut big), 0);
    }

    #[test]
    fn queue_keeps_the_newest_lines() {
        let logger = ConsoleLogger::new();
        for i in 0..100 {
            logger.queue(format!("[WARN] {i}"));
        }
        let q = logger.console_q.lock().unwrap();
        assert_eq!(q.len(), CONSOLE_QUEUE_MAX);
        assert_eq!(q.front().map(String::as_str), Some("[WARN] 36"));
        assert_eq!(q.back().map(String::as_str), Some("[WARN] 99"));
    }
}
