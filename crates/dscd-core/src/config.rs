use serde::Deserialize;

use crate::error::ChangeError;

/// Default MTU assumed when no host device is known (standalone crate use),
/// paired with a 1000-packet default queue depth.
const DEFAULT_TX_QUEUE_LEN: u32 = 1000;
const DEFAULT_MTU: u32 = 1500;

const DEFAULT_T_D_NS: u64 = 10_000_000; // 10ms
const DEFAULT_CREDIT_HALF_LIFE_NS: u64 = 100_000_000; // 100ms
const DEFAULT_RATE_MEMORY_NS: u64 = 100_000_000; // 100ms
const DEFAULT_RATE_CONFIG: u64 = 0; // estimate
const DEFAULT_T_Q: u64 = 1;

/// Sparse configuration set, as parsed from TOML or assembled from decoded
/// wire attributes. Every field is optional; [`DscdConfigInput::resolve`]
/// fills in the documented defaults for anything left unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DscdConfigInput {
    pub limit: Option<u32>,
    pub rate: Option<u64>,
    pub credit_half_life: Option<u64>,
    pub rate_memory: Option<u64>,
    pub t_d: Option<u64>,
    pub t_q: Option<u64>,
}

impl DscdConfigInput {
    pub fn from_toml_str(s: &str) -> Result<Self, ChangeError> {
        toml::from_str(s).map_err(|e| ChangeError::InvalidConfig(e.to_string()))
    }

    /// Rejects a `T_d` set to a non-zero value without an accompanying
    /// `T_q` — the timeout-drop loop's threshold would otherwise be
    /// ambiguous between "suppress drops" (t_q defaulted) and the caller's
    /// actual intent. Checked against the raw sparse fields, before any
    /// defaults are merged in.
    pub(crate) fn validate_t_q_t_d(&self) -> Result<(), ChangeError> {
        if let Some(t_d) = self.t_d {
            if t_d != 0 && self.t_q.is_none() {
                return Err(ChangeError::InvalidConfig(
                    "t_q must be set when t_d is set to a non-zero value".into(),
                ));
            }
        }
        Ok(())
    }

    /// Applies documented defaults to every unset field, validating what was
    /// provided. Never partially applied: on error, the caller's existing
    /// config (if any) is left untouched.
    pub fn resolve(&self) -> Result<DscdConfig, ChangeError> {
        self.validate_t_q_t_d()?;

        let limit = self
            .limit
            .unwrap_or(DEFAULT_TX_QUEUE_LEN * DEFAULT_MTU);
        if limit == 0 {
            return Err(ChangeError::InvalidConfig("limit must be non-zero".into()));
        }

        let credit_half_life = self.credit_half_life.unwrap_or(DEFAULT_CREDIT_HALF_LIFE_NS);
        if credit_half_life == 0 {
            return Err(ChangeError::InvalidConfig(
                "credit_half_life must be non-zero".into(),
            ));
        }

        let rate_memory = self.rate_memory.unwrap_or(DEFAULT_RATE_MEMORY_NS);
        if rate_memory == 0 {
            return Err(ChangeError::InvalidConfig(
                "rate_memory must be non-zero".into(),
            ));
        }

        Ok(DscdConfig {
            limit,
            rate_config: self.rate.unwrap_or(DEFAULT_RATE_CONFIG),
            credit_half_life,
            rate_memory,
            t_d: self.t_d.unwrap_or(DEFAULT_T_D_NS),
            t_q: self.t_q.unwrap_or(DEFAULT_T_Q),
        })
    }

    /// Merges `other`'s set fields on top of `self`'s, for applying a sparse
    /// `change` request against an already-resolved config.
    pub fn merged_onto(&self, base: &DscdConfig) -> DscdConfigInput {
        DscdConfigInput {
            limit: self.limit.or(Some(base.limit)),
            rate: self.rate.or(Some(base.rate_config)),
            credit_half_life: self.credit_half_life.or(Some(base.credit_half_life)),
            rate_memory: self.rate_memory.or(Some(base.rate_memory)),
            t_d: self.t_d.or(Some(base.t_d)),
            t_q: self.t_q.or(Some(base.t_q)),
        }
    }
}

/// Fully-resolved, always-valid configuration the scheduler actually stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DscdConfig {
    pub limit: u32,
    pub rate_config: u64,
    pub credit_half_life: u64,
    pub rate_memory: u64,
    pub t_d: u64,
    pub t_q: u64,
}

impl Default for DscdConfig {
    fn default() -> Self {
        DscdConfigInput::default().resolve().expect("defaults are always valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = DscdConfig::default();
        assert_eq!(cfg.t_d, 10_000_000);
        assert_eq!(cfg.credit_half_life, 100_000_000);
        assert_eq!(cfg.rate_memory, 100_000_000);
        assert_eq!(cfg.rate_config, 0);
        assert_eq!(cfg.t_q, 1);
        assert_eq!(cfg.limit, 1000 * 1500);
    }

    #[test]
    fn partial_input_keeps_remaining_defaults() {
        let input = DscdConfigInput {
            limit: Some(5000),
            ..Default::default()
        };
        let cfg = input.resolve().unwrap();
        assert_eq!(cfg.limit, 5000);
        assert_eq!(cfg.t_d, 10_000_000);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let input = DscdConfigInput {
            limit: Some(0),
            ..Default::default()
        };
        assert!(input.resolve().is_err());
    }

    #[test]
    fn zero_credit_half_life_is_rejected() {
        let input = DscdConfigInput {
            credit_half_life: Some(0),
            ..Default::default()
        };
        assert!(input.resolve().is_err());
    }

    #[test]
    fn toml_parses_sparse_fields() {
        let input = DscdConfigInput::from_toml_str("limit = 2000\nrate = 10000000\n").unwrap();
        assert_eq!(input.limit, Some(2000));
        assert_eq!(input.rate, Some(10_000_000));
        assert_eq!(input.t_d, None);
    }

    #[test]
    fn empty_toml_resolves_to_defaults() {
        let input = DscdConfigInput::from_toml_str("").unwrap();
        let cfg = input.resolve().unwrap();
        assert_eq!(cfg, DscdConfig::default());
    }

    #[test]
    fn nonzero_t_d_without_t_q_is_rejected() {
        let input = DscdConfigInput {
            t_d: Some(5_000_000),
            ..Default::default()
        };
        assert!(input.resolve().is_err());
    }

    #[test]
    fn zero_t_d_without_t_q_is_allowed() {
        let input = DscdConfigInput {
            t_d: Some(0),
            ..Default::default()
        };
        assert!(input.resolve().is_ok());
    }

    #[test]
    fn t_d_with_t_q_is_allowed() {
        let input = DscdConfigInput {
            t_d: Some(5_000_000),
            t_q: Some(2),
            ..Default::default()
        };
        assert!(input.resolve().is_ok());
    }

    #[test]
    fn merged_onto_prefers_new_values_over_base() {
        let base = DscdConfig::default();
        let change = DscdConfigInput {
            rate: Some(999),
            ..Default::default()
        };
        let merged = change.merged_onto(&base).resolve().unwrap();
        assert_eq!(merged.rate_config, 999);
        assert_eq!(merged.limit, base.limit);
    }
}
