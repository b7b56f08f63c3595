use rowflow_core::{Dataset, ValidationError};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("fund list response must be a JSON object keyed by fund code")]
    NotAnObject,

    #[error("fund {fund_code} has no usable '{field}'")]
    MissingField { fund_code: String, field: String },
}

/// Output column → path inside one fund entry of the screener response.
const FUND_FIELDS: &[(&str, &[&str])] = &[
    ("local_exchange_ticker", &["localExchangeTicker"]),
    ("fund_name", &["fundName"]),
    ("investor_class_name", &["investorClassName"]),
    ("asset_class", &["aladdinAssetClass"]),
    ("country", &["aladdinCountry"]),
    ("region", &["aladdinRegion"]),
    ("esg_classification", &["aladdinEsgClassification"]),
    ("market_type", &["aladdinMarketType"]),
    ("sub_asset_class", &["aladdinSubAssetClass"]),
    ("inception_date", &["inceptionDate", "r"]),
    ("investment_style", &["investmentStyle"]),
    ("product_page_url", &["productPageUrl"]),
];

/// Flatten the product-screener response into one row per fund.
///
/// Rows are ordered by fund code. Values are copied verbatim; a JSON `null`
/// is kept, an absent key is an error.
pub fn parse_funds(response: &Value) -> Result<Dataset, TransformError> {
    let funds = match response {
        Value::Null => return Err(ValidationError::MissingDataset.into()),
        Value::Object(funds) => funds,
        _ => return Err(TransformError::NotAnObject),
    };

    let mut entries: Vec<(&String, &Value)> = funds.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut records = Vec::with_capacity(entries.len());
    for (fund_code, fund) in entries {
        records.push(fund_record(fund_code, fund)?);
    }

    tracing::debug!("parsed {} funds", records.len());
    Ok(Dataset::from_records(records))
}

fn fund_record(fund_code: &str, fund: &Value) -> Result<Map<String, Value>, TransformError> {
    let mut row = Map::new();
    row.insert("fund_code".to_string(), Value::String(fund_code.to_string()));

    for (column, path) in FUND_FIELDS {
        let value = lookup(fund, path).ok_or_else(|| TransformError::MissingField {
            fund_code: fund_code.to_string(),
            field: path.join("."),
        })?;
        row.insert((*column).to_string(), value.clone());
    }

    Ok(row)
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}
