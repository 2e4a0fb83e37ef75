use anyhow::Result;
use log::{debug, error, info};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::encoding::{EncodingDetector, TextEncoding};
use crate::errors::SyncError;
use crate::file_utils::FileManager;
use crate::offset::{AdjustmentRule, OffsetResolver};
use crate::rewriter::{RewriteReport, TimestampRewriter};
use crate::sync_scanner::{SubtitleOccurrence, SyncLineScanner};

// @module: Application controller for searching and adjusting SMI files

/// What an adjustment did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentSummary {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub encoding: TextEncoding,
    pub offset_ms: i64,
    pub report: RewriteReport,
    // @field: Destination was the source file itself
    pub in_place: bool,
}

impl fmt::Display for AdjustmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.in_place {
            write!(
                f,
                "Shifted {} sync time(s) by {} ms and updated {:?} in place as {}",
                self.report.adjusted, self.offset_ms, self.destination, self.encoding
            )
        } else {
            write!(
                f,
                "Shifted {} sync time(s) by {} ms and saved {:?} as {}",
                self.report.adjusted, self.offset_ms, self.destination, self.encoding
            )
        }
    }
}

/// Success flag plus a human-readable message, for front-ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
}

impl OperationOutcome {
    /// Build an outcome from any operation result
    pub fn from_result<T: fmt::Display>(result: &Result<T, SyncError>) -> Self {
        match result {
            Ok(value) => Self {
                success: true,
                message: value.to_string(),
            },
            Err(e) => Self {
                success: false,
                message: e.to_string(),
            },
        }
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Scanner built from the configured class marker
    scanner: SyncLineScanner,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let scanner = SyncLineScanner::new(&config.scanner.class_marker);

        Ok(Self { config, scanner })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Destination used when the caller does not name one
    pub fn default_destination<P: AsRef<Path>>(&self, input_file: P) -> PathBuf {
        FileManager::generate_output_path(input_file, &self.config.output.suffix)
    }

    /// Find every subtitle line containing `query`
    pub fn search<P: AsRef<Path>>(&self, path: P, query: &str) -> Result<Vec<SubtitleOccurrence>, SyncError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let path = path.as_ref();
        let document = EncodingDetector::detect_and_decode(path)?;

        let results: Vec<SubtitleOccurrence> = self.scanner.find_occurrences(&document.text, query).collect();
        debug!("Found {} occurrence(s) of '{}' in {:?}", results.len(), query, path);

        Ok(results)
    }

    /// Shift every sync time by `offset_seconds`
    pub fn batch_adjust<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        path: P1,
        destination: P2,
        offset_seconds: &str,
    ) -> Result<AdjustmentSummary, SyncError> {
        info!("=== Shifting all sync times ===");
        info!("  - Offset: {} s", offset_seconds);

        let rule = AdjustmentRule::ConstantOffset {
            seconds: offset_seconds.to_string(),
        };
        self.adjust(path, destination, &rule)
    }

    /// Shift every sync time so the one at `anchor_original_ms` lands on `target_seconds`
    pub fn anchor_adjust<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        path: P1,
        destination: P2,
        anchor_original_ms: u64,
        target_seconds: &str,
    ) -> Result<AdjustmentSummary, SyncError> {
        info!("=== Shifting sync times relative to an anchor ===");
        info!("  - Anchor: {} ms", anchor_original_ms);
        info!("  - Target: {} s", target_seconds);

        let rule = AdjustmentRule::AnchorOffset {
            original_ms: anchor_original_ms,
            target_seconds: target_seconds.to_string(),
        };
        self.adjust(path, destination, &rule)
    }

    /// Resolve, read, rewrite and write. Nothing is written unless every earlier step succeeded.
    pub fn adjust<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        path: P1,
        destination: P2,
        rule: &AdjustmentRule,
    ) -> Result<AdjustmentSummary, SyncError> {
        let source = path.as_ref();
        let destination = destination.as_ref();

        info!("  - Source: {:?}", source);
        info!("  - Destination: {:?}", destination);

        let result = Self::run_adjustment(source, destination, rule);
        match &result {
            Ok(summary) => info!("{}", summary),
            Err(e) => error!("Adjustment failed: {}", e),
        }
        result
    }

    fn run_adjustment(source: &Path, destination: &Path, rule: &AdjustmentRule) -> Result<AdjustmentSummary, SyncError> {
        let offset_ms = OffsetResolver::resolve(rule)?;
        info!("  - Resolved offset: {} ms", offset_ms);

        let document = EncodingDetector::detect_and_decode(source)?;
        let rewrite = TimestampRewriter::rewrite_with_report(&document.text, offset_ms);
        let bytes = EncodingDetector::encode(&rewrite.text, document.encoding)?;

        let in_place = FileManager::is_same_file(source, destination);
        FileManager::write_atomic(destination, &bytes)?;

        Ok(AdjustmentSummary {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            encoding: document.encoding,
            offset_ms,
            report: rewrite.report,
            in_place,
        })
    }
}
