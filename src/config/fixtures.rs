//! In-code copies of the shipped configuration for unit tests.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::types::{
    ContributionRates, DeductionPolicy, JurisdictionConfig, JurisdictionKey, JurisdictionMetadata,
    JurisdictionRegistry, TaxBracket, TaxBracketTable,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub(crate) fn mx_2024_key() -> JurisdictionKey {
    JurisdictionKey::new("MX", 2024).unwrap()
}

pub(crate) fn mx_2024_brackets() -> Vec<TaxBracket> {
    let rows = [
        ("0.00", Some("746.05"), "0.00", "0.0192"),
        ("746.05", Some("6332.06"), "14.32", "0.0640"),
        ("6332.06", Some("11128.02"), "371.83", "0.1088"),
        ("11128.02", Some("12935.83"), "893.63", "0.1600"),
        ("12935.83", Some("15487.72"), "1182.88", "0.1792"),
        ("15487.72", Some("31236.50"), "1640.18", "0.2136"),
        ("31236.50", Some("49233.01"), "5004.12", "0.2352"),
        ("49233.01", Some("93993.91"), "9236.89", "0.3000"),
        ("93993.91", Some("125325.21"), "22665.17", "0.3200"),
        ("125325.21", Some("375975.62"), "32691.18", "0.3400"),
        ("375975.62", None, "117912.32", "0.3500"),
    ];
    rows.into_iter()
        .map(|(lower, upper, fee, rate)| TaxBracket {
            lower_bound: dec(lower),
            upper_bound: upper.map(dec),
            fixed_fee: dec(fee),
            marginal_rate: dec(rate),
        })
        .collect()
}

pub(crate) fn mx_2024_rates() -> ContributionRates {
    ContributionRates {
        uma_daily_value: Some(dec("108.57")),
        employee_social_security_rate: Some(dec("0.02375")),
        employer_social_security_rate: Some(dec("0.1019355")),
        housing_fund_rate: Some(dec("0.05")),
        contribution_cap_uma_multiple: Some(dec("25")),
        contribution_floor_uma_multiple: None,
    }
}

pub(crate) fn config_with(rates: ContributionRates, policy: DeductionPolicy) -> JurisdictionConfig {
    let key = mx_2024_key();
    let table = TaxBracketTable::new(&key, mx_2024_brackets()).unwrap();
    let metadata = JurisdictionMetadata {
        key,
        name: "México, ejercicio fiscal 2024".to_string(),
        currency: "MXN".to_string(),
        source_url: "https://example.com".to_string(),
    };
    JurisdictionConfig::new(metadata, table, rates, policy)
}

pub(crate) fn mx_2024_config() -> JurisdictionConfig {
    config_with(mx_2024_rates(), DeductionPolicy::default())
}

pub(crate) fn mx_2024_registry() -> JurisdictionRegistry {
    let mut registry = JurisdictionRegistry::new();
    registry.insert(mx_2024_config());
    registry
}
