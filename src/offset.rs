use log::debug;

use crate::errors::SyncError;

// @module: Turning user-supplied adjustment rules into a millisecond delta

/// How the sync times should move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustmentRule {
    /// Shift everything by a number of seconds (may be negative)
    ConstantOffset { seconds: String },

    /// Shift everything so that the sync at `original_ms` lands on `target_seconds`
    AnchorOffset { original_ms: u64, target_seconds: String },
}

/// Resolves an [`AdjustmentRule`] to a single delta
pub struct OffsetResolver;

impl OffsetResolver {
    /// Resolve `rule` to the delta in milliseconds applied to every sync time
    pub fn resolve(rule: &AdjustmentRule) -> Result<i64, SyncError> {
        let delta = match rule {
            AdjustmentRule::ConstantOffset { seconds } => Self::parse_seconds_to_ms(seconds)?,
            AdjustmentRule::AnchorOffset { original_ms, target_seconds } => {
                let target_ms = Self::parse_seconds_to_ms(target_seconds)?;
                let original_ms = i64::try_from(*original_ms)
                    .map_err(|_| SyncError::InvalidNumber(original_ms.to_string()))?;
                target_ms
                    .checked_sub(original_ms)
                    .ok_or_else(|| SyncError::InvalidNumber(target_seconds.clone()))?
            }
        };

        debug!("Resolved {:?} to {} ms", rule, delta);
        Ok(delta)
    }

    /// Parse a decimal number of seconds into milliseconds, truncating toward zero
    pub fn parse_seconds_to_ms(input: &str) -> Result<i64, SyncError> {
        let invalid = || SyncError::InvalidNumber(input.to_string());

        let seconds: f64 = input.trim().parse().map_err(|_| invalid())?;
        if !seconds.is_finite() {
            return Err(invalid());
        }

        let ms = (seconds * 1000.0).trunc();
        // i64::MAX is not exactly representable; stay strictly inside the range
        if ms < i64::MIN as f64 || ms >= i64::MAX as f64 {
            return Err(invalid());
        }

        Ok(ms as i64)
    }
}
