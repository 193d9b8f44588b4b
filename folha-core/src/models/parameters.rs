use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKey {
    MinimumWage,
    InssCeiling,
    DependentDeduction,
    ConsignableMarginRate,
    EmployerInssRate,
    RatRate,
    OtherEntitiesRate,
    RemunerationCeiling,
}

impl ParameterKey {
    /// Every key, in the order the snapshot assembler resolves them.
    pub const ALL: [ParameterKey; 8] = [
        Self::MinimumWage,
        Self::InssCeiling,
        Self::DependentDeduction,
        Self::ConsignableMarginRate,
        Self::EmployerInssRate,
        Self::RatRate,
        Self::OtherEntitiesRate,
        Self::RemunerationCeiling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MinimumWage => "salario_minimo",
            Self::InssCeiling => "teto_inss",
            Self::DependentDeduction => "deducao_dependente",
            Self::ConsignableMarginRate => "margem_consignavel",
            Self::EmployerInssRate => "inss_patronal",
            Self::RatRate => "rat",
            Self::OtherEntitiesRate => "outras_entidades",
            Self::RemunerationCeiling => "teto_remuneracao",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "salario_minimo" => Some(Self::MinimumWage),
            "teto_inss" => Some(Self::InssCeiling),
            "deducao_dependente" => Some(Self::DependentDeduction),
            "margem_consignavel" => Some(Self::ConsignableMarginRate),
            "inss_patronal" => Some(Self::EmployerInssRate),
            "rat" => Some(Self::RatRate),
            "outras_entidades" => Some(Self::OtherEntitiesRate),
            "teto_remuneracao" => Some(Self::RemunerationCeiling),
            _ => None,
        }
    }

    /// Whether a snapshot can be assembled without this key.
    /// RAT and other-entities rates default to zero charges when absent.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::RatRate | Self::OtherEntitiesRate)
    }
}

/// A single effective-dated scalar, as stored by the parameter provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterValue {
    pub key: ParameterKey,
    pub value: Decimal,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}

/// The parameter snapshot resolved for one reference date.
///
/// All rates are percentages in the 0–100 range. `rat_rate` and
/// `other_entities_rate` are `None` when the agency has no value configured;
/// the corresponding employer charges are then zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollParameters {
    pub minimum_wage: Decimal,
    pub inss_ceiling: Decimal,
    pub dependent_deduction: Decimal,
    pub consignable_margin_rate: Decimal,
    pub employer_inss_rate: Decimal,
    pub rat_rate: Option<Decimal>,
    pub other_entities_rate: Option<Decimal>,
    pub remuneration_ceiling: Decimal,
}

impl PayrollParameters {
    /// The INSS contribution cap, with a stored zero meaning "uncapped".
    pub fn inss_cap(&self) -> Option<Decimal> {
        if self.inss_ceiling > Decimal::ZERO {
            Some(self.inss_ceiling)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parameter_key_round_trips_through_str() {
        for key in ParameterKey::ALL {
            assert_eq!(ParameterKey::parse(key.as_str()), Some(key));
        }
    }

    #[test]
    fn parameter_key_parse_rejects_unknown_code() {
        assert_eq!(ParameterKey::parse("fgts"), None);
    }

    #[test]
    fn only_employer_charge_rates_are_optional() {
        let optional: Vec<_> = ParameterKey::ALL
            .iter()
            .filter(|k| k.is_optional())
            .collect();

        assert_eq!(
            optional,
            vec![&ParameterKey::RatRate, &ParameterKey::OtherEntitiesRate]
        );
    }

    #[test]
    fn inss_cap_returns_positive_ceiling() {
        let params = test_parameters(dec!(8157.41));

        assert_eq!(params.inss_cap(), Some(dec!(8157.41)));
    }

    #[test]
    fn inss_cap_treats_zero_ceiling_as_uncapped() {
        let params = test_parameters(dec!(0));

        assert_eq!(params.inss_cap(), None);
    }

    fn test_parameters(ceiling: Decimal) -> PayrollParameters {
        PayrollParameters {
            minimum_wage: dec!(1518.00),
            inss_ceiling: ceiling,
            dependent_deduction: dec!(189.59),
            consignable_margin_rate: dec!(35),
            employer_inss_rate: dec!(20),
            rat_rate: Some(dec!(2)),
            other_entities_rate: Some(dec!(5.8)),
            remuneration_ceiling: dec!(46366.19),
        }
    }
}
