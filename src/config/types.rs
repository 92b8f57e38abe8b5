//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, and the validated,
//! read-only forms the calculators consume.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Identifies one jurisdiction-year of configuration, e.g. `MX-2024`.
///
/// # Example
///
/// ```
/// use payroll_engine::config::JurisdictionKey;
///
/// let key: JurisdictionKey = "mx-2024".parse().unwrap();
/// assert_eq!(key.country(), "MX");
/// assert_eq!(key.year(), 2024);
/// assert_eq!(key.to_string(), "MX-2024");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JurisdictionKey {
    country: String,
    year: u16,
}

impl JurisdictionKey {
    /// Creates a key from a two-letter country code and a year.
    pub fn new(country: &str, year: u16) -> EngineResult<Self> {
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(EngineError::invalid_input(
                "jurisdiction",
                format!("country code '{}' must be two letters", country),
            ));
        }
        Ok(Self {
            country: country.to_ascii_uppercase(),
            year,
        })
    }

    /// The ISO-3166 alpha-2 country code, upper case.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// The fiscal year.
    pub fn year(&self) -> u16 {
        self.year
    }
}

impl fmt::Display for JurisdictionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.country, self.year)
    }
}

impl FromStr for JurisdictionKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            EngineError::invalid_input(
                "jurisdiction",
                format!("'{}' is not of the form CC-YYYY", s),
            )
        };

        let (country, year) = s.trim().split_once('-').ok_or_else(malformed)?;
        if year.len() != 4 {
            return Err(malformed());
        }
        let year = year.parse::<u16>().map_err(|_| malformed())?;
        Self::new(country, year)
    }
}

impl TryFrom<String> for JurisdictionKey {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JurisdictionKey> for String {
    fn from(key: JurisdictionKey) -> Self {
        key.to_string()
    }
}

/// Metadata about a jurisdiction-year.
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionMetadata {
    /// The jurisdiction key (e.g., "MX-2024").
    pub key: JurisdictionKey,
    /// The human-readable name of the jurisdiction-year.
    pub name: String,
    /// ISO-4217 currency code amounts are expressed in.
    pub currency: String,
    /// URL of the authoritative publication of the tables.
    pub source_url: String,
}

/// Which deductions are taken from the employee's pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DeductionPolicy {
    /// Deduct the housing-fund contribution from the employee. Off by default:
    /// INFONAVIT is employer-paid.
    #[serde(default)]
    pub housing_fund_employee_deducted: bool,
}

/// jurisdiction.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionFile {
    /// Jurisdiction metadata.
    pub jurisdiction: JurisdictionMetadata,
    /// Deduction policy for this jurisdiction-year.
    #[serde(default)]
    pub deduction_policy: DeductionPolicy,
}

/// One row of a progressive tax table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive lower limit of the bracket.
    pub lower_bound: Decimal,
    /// Exclusive upper limit; `None` for the final, unbounded bracket.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Tax due at the lower limit.
    pub fixed_fee: Decimal,
    /// Rate applied to the excess over the lower limit.
    pub marginal_rate: Decimal,
}

impl TaxBracket {
    /// Returns true if `amount` falls inside this bracket.
    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.lower_bound && self.upper_bound.is_none_or(|upper| amount < upper)
    }
}

/// isr_monthly.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct BracketTableFile {
    /// Reference to the publication the table was taken from.
    #[serde(default)]
    pub source: Option<String>,
    /// The bracket rows, lowest first.
    pub brackets: Vec<TaxBracket>,
}

/// A validated monthly tax bracket table.
///
/// Brackets are contiguous, start at zero, increase monotonically and end
/// with a single unbounded bracket. Construction is the only place these
/// invariants are checked; a `TaxBracketTable` that exists is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxBracketTable {
    brackets: Vec<TaxBracket>,
}

impl TaxBracketTable {
    /// Validates the rows and builds the table.
    ///
    /// Returns `BracketTableIntegrity` if any invariant is broken.
    pub fn new(jurisdiction: &JurisdictionKey, brackets: Vec<TaxBracket>) -> EngineResult<Self> {
        let fail = |message: String| EngineError::BracketTableIntegrity {
            jurisdiction: jurisdiction.to_string(),
            message,
        };

        let first = brackets
            .first()
            .ok_or_else(|| fail("table has no brackets".to_string()))?;
        if !first.lower_bound.is_zero() {
            return Err(fail(format!(
                "first bracket must start at 0, starts at {}",
                first.lower_bound
            )));
        }

        let last_index = brackets.len() - 1;
        for (i, bracket) in brackets.iter().enumerate() {
            let n = i + 1;

            if bracket.fixed_fee < Decimal::ZERO {
                return Err(fail(format!("bracket {} has a negative fixed fee", n)));
            }
            if bracket.marginal_rate < Decimal::ZERO || bracket.marginal_rate >= Decimal::ONE {
                return Err(fail(format!(
                    "bracket {} marginal rate {} is outside [0, 1)",
                    n, bracket.marginal_rate
                )));
            }

            match bracket.upper_bound {
                None if i != last_index => {
                    return Err(fail(format!(
                        "bracket {} is unbounded but is not the last bracket",
                        n
                    )));
                }
                Some(_) if i == last_index => {
                    return Err(fail("last bracket must have no upper bound".to_string()));
                }
                Some(upper) if upper <= bracket.lower_bound => {
                    return Err(fail(format!(
                        "bracket {} upper bound {} is not above its lower bound {}",
                        n, upper, bracket.lower_bound
                    )));
                }
                _ => {}
            }

            if let Some(next) = brackets.get(i + 1) {
                if bracket.upper_bound != Some(next.lower_bound) {
                    return Err(fail(format!(
                        "bracket {} starts at {} but bracket {} ends at {}",
                        n + 1,
                        next.lower_bound,
                        n,
                        bracket
                            .upper_bound
                            .map_or_else(|| "infinity".to_string(), |u| u.to_string())
                    )));
                }
                if next.fixed_fee < bracket.fixed_fee {
                    return Err(fail(format!(
                        "bracket {} fixed fee decreases from bracket {}",
                        n + 1,
                        n
                    )));
                }
                if next.marginal_rate < bracket.marginal_rate {
                    return Err(fail(format!(
                        "bracket {} marginal rate decreases from bracket {}",
                        n + 1,
                        n
                    )));
                }
            }
        }

        Ok(Self { brackets })
    }

    /// Returns the brackets, lowest first.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Finds the bracket containing `amount`, returning its zero-based index.
    ///
    /// Lower bounds are inclusive and upper bounds exclusive. Returns `None`
    /// only for negative amounts.
    pub fn find(&self, amount: Decimal) -> Option<(usize, &TaxBracket)> {
        let index = self
            .brackets
            .partition_point(|b| b.lower_bound <= amount)
            .checked_sub(1)?;
        Some((index, &self.brackets[index]))
    }
}

/// contributions.yaml file structure.
///
/// Every value is optional at parse time so that an absent rate can be
/// reported as missing configuration when a calculation needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContributionRates {
    /// Daily value of the UMA (Unidad de Medida y Actualización).
    #[serde(default)]
    pub uma_daily_value: Option<Decimal>,
    /// Employee social-security rate on the contribution base.
    #[serde(default)]
    pub employee_social_security_rate: Option<Decimal>,
    /// Employer social-security rate on the contribution base.
    #[serde(default)]
    pub employer_social_security_rate: Option<Decimal>,
    /// Housing-fund rate on base salary.
    #[serde(default)]
    pub housing_fund_rate: Option<Decimal>,
    /// Contribution base cap as a multiple of the daily UMA.
    #[serde(default)]
    pub contribution_cap_uma_multiple: Option<Decimal>,
    /// Optional contribution base floor as a multiple of the daily UMA.
    #[serde(default)]
    pub contribution_floor_uma_multiple: Option<Decimal>,
}

/// Contribution rates with every required value present and non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedContributionRates {
    /// Daily UMA value.
    pub uma_daily_value: Decimal,
    /// Employee social-security rate.
    pub employee_social_security_rate: Decimal,
    /// Employer social-security rate.
    pub employer_social_security_rate: Decimal,
    /// Housing-fund rate.
    pub housing_fund_rate: Decimal,
    /// Cap multiple of the UMA.
    pub contribution_cap_uma_multiple: Decimal,
    /// Floor multiple of the UMA, if configured.
    pub contribution_floor_uma_multiple: Option<Decimal>,
}

impl ResolvedContributionRates {
    /// The daily contribution cap in currency units.
    pub fn daily_cap(&self) -> Decimal {
        self.contribution_cap_uma_multiple * self.uma_daily_value
    }

    /// The daily contribution floor in currency units, if configured.
    pub fn daily_floor(&self) -> Option<Decimal> {
        self.contribution_floor_uma_multiple
            .map(|multiple| multiple * self.uma_daily_value)
    }
}

impl ContributionRates {
    /// Checks the ranges of the values that are present.
    ///
    /// Rates must lie in `[0, 1)`; the UMA value and the multiples must not
    /// be negative. Absent values are left for [`ContributionRates::resolve`].
    pub fn validate(&self) -> Result<(), String> {
        let rates = [
            ("employee_social_security_rate", self.employee_social_security_rate),
            ("employer_social_security_rate", self.employer_social_security_rate),
            ("housing_fund_rate", self.housing_fund_rate),
        ];
        for (name, value) in rates {
            if let Some(rate) = value {
                if rate < Decimal::ZERO || rate >= Decimal::ONE {
                    return Err(format!("{} {} is outside [0, 1)", name, rate));
                }
            }
        }

        let amounts = [
            ("uma_daily_value", self.uma_daily_value),
            ("contribution_cap_uma_multiple", self.contribution_cap_uma_multiple),
            ("contribution_floor_uma_multiple", self.contribution_floor_uma_multiple),
        ];
        for (name, value) in amounts {
            if let Some(amount) = value {
                if amount < Decimal::ZERO {
                    return Err(format!("{} {} is negative", name, amount));
                }
            }
        }

        Ok(())
    }

    /// Checks that every required value is present and non-zero.
    ///
    /// Returns `MissingConfiguration` naming the first absent or zero value.
    /// Never substitutes a default.
    pub fn resolve(&self, jurisdiction: &JurisdictionKey) -> EngineResult<ResolvedContributionRates> {
        let required = |name: &str, value: Option<Decimal>| -> EngineResult<Decimal> {
            match value {
                Some(v) if v > Decimal::ZERO => Ok(v),
                _ => Err(EngineError::missing_configuration(jurisdiction, name)),
            }
        };

        Ok(ResolvedContributionRates {
            uma_daily_value: required("uma_daily_value", self.uma_daily_value)?,
            employee_social_security_rate: required(
                "employee_social_security_rate",
                self.employee_social_security_rate,
            )?,
            employer_social_security_rate: required(
                "employer_social_security_rate",
                self.employer_social_security_rate,
            )?,
            housing_fund_rate: required("housing_fund_rate", self.housing_fund_rate)?,
            contribution_cap_uma_multiple: required(
                "contribution_cap_uma_multiple",
                self.contribution_cap_uma_multiple,
            )?,
            contribution_floor_uma_multiple: self
                .contribution_floor_uma_multiple
                .filter(|multiple| *multiple > Decimal::ZERO),
        })
    }
}

/// The complete configuration for one jurisdiction-year.
#[derive(Debug, Clone)]
pub struct JurisdictionConfig {
    metadata: JurisdictionMetadata,
    income_tax: TaxBracketTable,
    contributions: ContributionRates,
    deduction_policy: DeductionPolicy,
}

impl JurisdictionConfig {
    /// Creates a new JurisdictionConfig from its component parts.
    pub fn new(
        metadata: JurisdictionMetadata,
        income_tax: TaxBracketTable,
        contributions: ContributionRates,
        deduction_policy: DeductionPolicy,
    ) -> Self {
        Self {
            metadata,
            income_tax,
            contributions,
            deduction_policy,
        }
    }

    /// Returns the jurisdiction key.
    pub fn key(&self) -> &JurisdictionKey {
        &self.metadata.key
    }

    /// Returns the jurisdiction metadata.
    pub fn metadata(&self) -> &JurisdictionMetadata {
        &self.metadata
    }

    /// Returns the monthly income tax table.
    pub fn income_tax(&self) -> &TaxBracketTable {
        &self.income_tax
    }

    /// Returns the contribution rates.
    pub fn contributions(&self) -> &ContributionRates {
        &self.contributions
    }

    /// Returns the deduction policy.
    pub fn deduction_policy(&self) -> DeductionPolicy {
        self.deduction_policy
    }
}

/// All loaded jurisdiction-years, keyed by [`JurisdictionKey`].
///
/// Built once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct JurisdictionRegistry {
    jurisdictions: HashMap<JurisdictionKey, JurisdictionConfig>,
}

impl JurisdictionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a jurisdiction, replacing and returning any previous entry for the key.
    pub fn insert(&mut self, config: JurisdictionConfig) -> Option<JurisdictionConfig> {
        self.jurisdictions.insert(config.key().clone(), config)
    }

    /// Looks up a jurisdiction-year.
    ///
    /// Returns `MissingConfiguration` when it is not loaded. Other years are
    /// never substituted.
    pub fn get(&self, key: &JurisdictionKey) -> EngineResult<&JurisdictionConfig> {
        self.jurisdictions
            .get(key)
            .ok_or_else(|| EngineError::missing_configuration(key, "jurisdiction not loaded"))
    }

    /// Parses a textual key and looks it up.
    pub fn resolve(&self, key: &str) -> EngineResult<&JurisdictionConfig> {
        self.get(&key.parse()?)
    }

    /// Returns the loaded keys in sorted order.
    pub fn keys(&self) -> Vec<&JurisdictionKey> {
        let mut keys: Vec<_> = self.jurisdictions.keys().collect();
        keys.sort();
        keys
    }

    /// Iterates over all loaded jurisdictions in key order.
    pub fn iter(&self) -> impl Iterator<Item = &JurisdictionConfig> {
        self.keys()
            .into_iter()
            .filter_map(move |k| self.jurisdictions.get(k))
    }

    /// Number of loaded jurisdictions.
    pub fn len(&self) -> usize {
        self.jurisdictions.len()
    }

    /// Returns true if nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.jurisdictions.is_empty()
    }
}
