//! XBRL company facts → financial statement rows
//!
//! Each statement is a fixed list of us-gaap concepts. For every concept the
//! company reports, the most recent annual (10-K, FY) fact becomes one row.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

use crate::record::{StatementKind, StatementRow};

/// Body of `api/xbrl/companyfacts/CIK##########.json`
#[derive(Debug, Deserialize)]
pub struct CompanyFacts {
    #[serde(default)]
    pub facts: HashMap<String, HashMap<String, Concept>>,
}

#[derive(Debug, Deserialize)]
pub struct Concept {
    pub label: Option<String>,
    #[serde(default)]
    pub units: HashMap<String, Vec<Fact>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fact {
    pub end: NaiveDate,
    pub val: f64,
    pub fy: Option<i32>,
    pub fp: Option<String>,
    pub form: Option<String>,
    pub filed: Option<NaiveDate>,
}

const BALANCE_SHEET: &[&str] = &[
    "Assets",
    "AssetsCurrent",
    "CashAndCashEquivalentsAtCarryingValue",
    "AccountsReceivableNetCurrent",
    "InventoryNet",
    "PropertyPlantAndEquipmentNet",
    "Liabilities",
    "LiabilitiesCurrent",
    "LongTermDebtNoncurrent",
    "StockholdersEquity",
    "LiabilitiesAndStockholdersEquity",
];

const INCOME_STATEMENT: &[&str] = &[
    "Revenues",
    "RevenueFromContractWithCustomerExcludingAssessedTax",
    "CostOfRevenue",
    "GrossProfit",
    "OperatingExpenses",
    "OperatingIncomeLoss",
    "IncomeTaxExpenseBenefit",
    "NetIncomeLoss",
    "EarningsPerShareBasic",
    "EarningsPerShareDiluted",
];

const CASH_FLOW: &[&str] = &[
    "NetCashProvidedByUsedInOperatingActivities",
    "NetCashProvidedByUsedInInvestingActivities",
    "NetCashProvidedByUsedInFinancingActivities",
    "DepreciationDepletionAndAmortization",
    "PaymentsToAcquirePropertyPlantAndEquipment",
    "PaymentsOfDividends",
    "PaymentsForRepurchaseOfCommonStock",
];

pub fn concepts(statement: StatementKind) -> &'static [&'static str] {
    match statement {
        StatementKind::BalanceSheet => BALANCE_SHEET,
        StatementKind::IncomeStatement => INCOME_STATEMENT,
        StatementKind::CashFlow => CASH_FLOW,
    }
}

/// Preferred unit order; anything else falls back to the first unit reported
const UNIT_PREFERENCE: &[&str] = &["USD", "USD/shares"];

fn is_annual(fact: &Fact) -> bool {
    fact.form.as_deref() == Some("10-K") && fact.fp.as_deref() == Some("FY")
}

fn pick_unit(concept: &Concept) -> Option<(&str, &[Fact])> {
    UNIT_PREFERENCE
        .iter()
        .find_map(|u| concept.units.get_key_value(*u))
        .or_else(|| {
            let mut units: Vec<_> = concept.units.iter().collect();
            units.sort_by(|a, b| a.0.cmp(b.0));
            units.into_iter().next()
        })
        .map(|(unit, facts)| (unit.as_str(), facts.as_slice()))
}

impl CompanyFacts {
    pub fn has_gaap(&self) -> bool {
        self.facts.get("us-gaap").is_some_and(|c| !c.is_empty())
    }

    /// Rows of one statement, in the statement's concept order
    pub fn statement(&self, statement: StatementKind) -> Vec<StatementRow> {
        let Some(gaap) = self.facts.get("us-gaap") else {
            return Vec::new();
        };

        concepts(statement)
            .iter()
            .filter_map(|name| {
                let concept = gaap.get(*name)?;
                let (unit, facts) = pick_unit(concept)?;
                let latest = facts
                    .iter()
                    .filter(|f| is_annual(f))
                    .max_by_key(|f| (f.end, f.filed))?;

                Some(StatementRow {
                    concept: name.to_string(),
                    label: concept.label.clone().unwrap_or_else(|| name.to_string()),
                    unit: unit.to_string(),
                    value: latest.val,
                    end: latest.end,
                    fiscal_year: latest.fy,
                    fiscal_period: latest.fp.clone(),
                    form: latest.form.clone(),
                    filed: latest.filed,
                })
            })
            .collect()
    }
}
