use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;

use crate::edgar::holdings::FundHoldings;

/// One security aggregated across funds: who holds it and how much.
#[derive(Debug, Clone, Serialize)]
pub struct StockAggregate {
    pub cusip: String,
    pub name: String,
    pub funds: Vec<String>,
    pub value: i64,
    pub shares: i64,
}

impl StockAggregate {
    pub fn num_funds(&self) -> usize {
        self.funds.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FundAum {
    pub fund_name: String,
    pub cik: String,
    pub aum: i64,
    pub num_holdings: usize,
    pub filing_date: Option<NaiveDate>,
}

/// Groups records by CUSIP, keeping first-seen order, first-seen issuer
/// name, and summed value/shares. With `unique_funds` a fund appears in a
/// group's holder list at most once; without it, once per reported row.
fn group_by_cusip(all: &[FundHoldings], unique_funds: bool) -> Vec<StockAggregate> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, StockAggregate> = HashMap::new();

    for holdings in all {
        for record in &holdings.records {
            let entry = groups.entry(record.cusip.clone()).or_insert_with(|| {
                order.push(record.cusip.clone());
                StockAggregate {
                    cusip: record.cusip.clone(),
                    name: record.name.clone(),
                    funds: Vec::new(),
                    value: 0,
                    shares: 0,
                }
            });
            entry.value += record.value;
            entry.shares += record.shares;
            if !unique_funds || !entry.funds.contains(&holdings.filing.fund_name) {
                entry.funds.push(holdings.filing.fund_name.clone());
            }
        }
    }

    order
        .into_iter()
        .filter_map(|cusip| groups.remove(&cusip))
        .collect()
}

/// Stocks held by at least `min_funds` funds, most widely held first.
pub fn overlap(all: &[FundHoldings], min_funds: usize) -> Vec<StockAggregate> {
    group_by_cusip(all, false)
        .into_iter()
        .filter(|entry| entry.num_funds() >= min_funds)
        .sorted_by(|a, b| b.num_funds().cmp(&a.num_funds()))
        .collect()
}

/// All stocks ranked by total value held across the roster.
pub fn top_by_value(all: &[FundHoldings]) -> Vec<StockAggregate> {
    group_by_cusip(all, true)
        .into_iter()
        .sorted_by(|a, b| b.value.cmp(&a.value))
        .collect()
}

/// Per-fund AUM (sum of reported position values), largest first.
pub fn fund_aums(all: &[FundHoldings]) -> Vec<FundAum> {
    all.iter()
        .map(|holdings| FundAum {
            fund_name: holdings.filing.fund_name.clone(),
            cik: holdings.filing.cik.clone(),
            aum: holdings.total_value(),
            num_holdings: holdings.records.len(),
            filing_date: Some(holdings.filing.filing_date),
        })
        .sorted_by(|a, b| b.aum.cmp(&a.aum))
        .collect()
}
