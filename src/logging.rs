use crate::config::launcher_root_dir;
use crate::error::{AppError, Result};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::PathBuf;
use tokio::fs;

const LOG_DIR_NAME: &str = "logs";
const LOG_FILE_NAME: &str = "content_sync.log";
const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} | {({l}):5.5} | {t} | {m}{n}";
const CONSOLE_LOG_PATTERN: &str = "{d(%H:%M:%S)} | {h({l}):5.5} | {m}{n}";
const LOG_FILE_SIZE_LIMIT_MB: u64 = 10;
const LOG_FILE_BACKUP_COUNT: u32 = 5;

/// HTTP stack targets that flood debug output on every catalog request.
const QUIET_TARGETS: [&str; 3] = ["reqwest", "hyper", "hyper_util"];

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub dir: PathBuf,
    pub level: LevelFilter,
    pub console: bool,
}

impl LogSettings {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            level: LevelFilter::Debug,
            console: true,
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn without_console(mut self) -> Self {
        self.console = false;
        self
    }

    pub fn log_file(&self) -> PathBuf {
        self.dir.join(LOG_FILE_NAME)
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self::new(launcher_root_dir().join(LOG_DIR_NAME))
    }
}

fn log_error(e: impl std::fmt::Display) -> AppError {
    AppError::Config(format!("logging: {}", e))
}

/// Builds the log4rs configuration: a size-rolled file in `settings.dir`,
/// plus stdout when `settings.console` is set.
pub fn build_log_config(settings: &LogSettings) -> Result<Config> {
    let roller_pattern = settings.dir.join(format!("{}.{{}}", LOG_FILE_NAME));
    let roller_pattern = roller_pattern
        .to_str()
        .ok_or_else(|| log_error("log directory path is not valid UTF-8"))?;
    let roller = FixedWindowRoller::builder()
        .base(1)
        .build(roller_pattern, LOG_FILE_BACKUP_COUNT)
        .map_err(log_error)?;
    let policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(LOG_FILE_SIZE_LIMIT_MB * 1024 * 1024)),
        Box::new(roller),
    );

    let file_appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(settings.log_file(), Box::new(policy))
        .map_err(log_error)?;

    let mut builder =
        Config::builder().appender(Appender::builder().build("file", Box::new(file_appender)));
    let mut root = Root::builder().appender("file");

    if settings.console {
        let console_appender = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(CONSOLE_LOG_PATTERN)))
            .target(Target::Stdout)
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(console_appender)));
        root = root.appender("stdout");
    }

    for target in QUIET_TARGETS {
        builder = builder.logger(Logger::builder().build(target, LevelFilter::Warn));
    }

    builder.build(root.build(settings.level)).map_err(log_error)
}

/// Creates the log directory and installs the global logger.
pub async fn setup_logging(settings: &LogSettings) -> Result<()> {
    if !fs::try_exists(&settings.dir).await? {
        fs::create_dir_all(&settings.dir).await?;
        // log4rs is not up yet
        eprintln!("[Logging Setup] Created log directory: {}", settings.dir.display());
    }

    let config = build_log_config(settings)?;
    log4rs::init_config(config).map_err(log_error)?;

    log::info!(
        "Logging initialized at {} into {}",
        settings.level,
        settings.dir.display()
    );
    Ok(())
}
