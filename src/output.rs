use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use csv::WriterBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{FundAum, StockAggregate};
use crate::edgar::filing::FilingReference;
use crate::edgar::holdings::FundHoldings;

static UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));

/// Fund name reduced to a filesystem-safe token.
pub fn sanitize_fund_name(fund_name: &str) -> String {
    UNSAFE_NAME_CHARS
        .replace_all(fund_name, "")
        .replace(' ', "_")
}

fn date_stamp() -> String {
    Local::now().format("%Y%m%d").to_string()
}

pub fn write_filings_summary(dir: &Path, filings: &[FilingReference]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("latest_filings_{}.csv", date_stamp()));
    let mut writer = WriterBuilder::new().from_path(&path)?;

    writer.write_record([
        "fund_name",
        "cik",
        "form_type",
        "filing_date",
        "accession_number",
        "primary_document",
    ])?;
    for filing in filings {
        let form_type = filing.form_type.to_string();
        let filing_date = filing.filing_date.to_string();
        writer.write_record([
            filing.fund_name.as_str(),
            filing.cik.as_str(),
            form_type.as_str(),
            filing_date.as_str(),
            filing.accession_number.as_str(),
            filing.primary_document.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(path)
}

pub fn write_holdings(dir: &Path, holdings: &FundHoldings) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "{}_holdings_{}.csv",
        sanitize_fund_name(&holdings.filing.fund_name),
        holdings.filing.filing_date
    ));
    let mut writer = WriterBuilder::new().from_path(&path)?;

    writer.write_record(["name", "cusip", "value", "shares", "fund_name", "filing_date"])?;
    let filing_date = holdings.filing.filing_date.to_string();
    for record in &holdings.records {
        let value = record.value.to_string();
        let shares = record.shares.to_string();
        writer.write_record([
            record.name.as_str(),
            record.cusip.as_str(),
            value.as_str(),
            shares.as_str(),
            holdings.filing.fund_name.as_str(),
            filing_date.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(path)
}

fn write_aggregates(dir: &Path, filename: &str, entries: &[StockAggregate]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    let mut writer = WriterBuilder::new().from_path(&path)?;

    writer.write_record(["cusip", "name", "funds", "value", "shares", "num_funds"])?;
    for entry in entries {
        let funds = entry.funds.join("; ");
        let value = entry.value.to_string();
        let shares = entry.shares.to_string();
        let num_funds = entry.num_funds().to_string();
        writer.write_record([
            entry.cusip.as_str(),
            entry.name.as_str(),
            funds.as_str(),
            value.as_str(),
            shares.as_str(),
            num_funds.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(path)
}

pub fn write_overlap(dir: &Path, entries: &[StockAggregate]) -> Result<PathBuf> {
    write_aggregates(
        dir,
        &format!("holdings_overlap_{}.csv", date_stamp()),
        entries,
    )
}

pub fn write_top_stocks(dir: &Path, entries: &[StockAggregate]) -> Result<PathBuf> {
    write_aggregates(
        dir,
        &format!("top_stocks_by_value_{}.csv", date_stamp()),
        entries,
    )
}

pub fn write_fund_aums(dir: &Path, aums: &[FundAum]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("fund_aum_{}.csv", date_stamp()));
    let mut writer = WriterBuilder::new().from_path(&path)?;

    writer.write_record(["fund_name", "cik", "aum", "num_holdings", "filing_date"])?;
    for aum in aums {
        let total = aum.aum.to_string();
        let num_holdings = aum.num_holdings.to_string();
        let filing_date = aum
            .filing_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        writer.write_record([
            aum.fund_name.as_str(),
            aum.cik.as_str(),
            total.as_str(),
            num_holdings.as_str(),
            filing_date.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(path)
}

/// One row per fund with its issuers spread across `holding_N` columns,
/// largest position first. Rows are padded so the sheet stays rectangular.
pub fn write_combined_summary(dir: &Path, all: &[FundHoldings]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("complete_summary_{}.csv", date_stamp()));
    let mut writer = WriterBuilder::new().from_path(&path)?;

    let max_holdings = all.iter().map(|h| h.records.len()).max().unwrap_or(0);

    let mut header = vec![
        "fund_name".to_string(),
        "filing_date".to_string(),
        "aum".to_string(),
    ];
    for i in 1..=max_holdings {
        header.push(format!("holding_{}", i));
    }
    writer.write_record(&header)?;

    for holdings in all {
        let mut row = vec![
            holdings.filing.fund_name.clone(),
            holdings.filing.filing_date.to_string(),
            holdings.total_value().to_string(),
        ];
        for record in &holdings.records {
            row.push(record.name.clone());
        }
        row.resize(header.len(), String::new());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(path)
}

fn billions(value: i64) -> f64 {
    value as f64 / 1_000_000_000.0
}

pub fn print_filings_summary(filings: &[FilingReference]) {
    println!("\n{}", "=".repeat(80));
    println!("{}", "LATEST 13F FILINGS".bold());
    println!("{}", "=".repeat(80));
    for filing in filings {
        println!(
            "{:<45} {:<12} {}",
            filing.fund_name, filing.filing_date, filing.form_type
        );
    }
}

pub fn print_aum_table(aums: &[FundAum]) {
    println!("\n{}", "=".repeat(80));
    println!("{}", "AUM (ASSETS UNDER MANAGEMENT) - ALL FUNDS".bold());
    println!("{}", "=".repeat(80));
    println!(
        "{:<5} {:<45} {:>15} {:>10}",
        "Rank", "Fund Name", "AUM", "Holdings"
    );
    println!("{}", "-".repeat(80));
    for (rank, aum) in aums.iter().enumerate() {
        let aum_str = format!("${:.1}B", billions(aum.aum));
        println!(
            "{:<5} {:<45} {:>15} {:>10}",
            rank + 1,
            truncate(&aum.fund_name, 43),
            aum_str,
            aum.num_holdings
        );
    }
    let total: i64 = aums.iter().map(|a| a.aum).sum();
    println!("{}", "-".repeat(80));
    println!("{:<52} ${:.1}B", "TOTAL AUM:", billions(total));
    if !aums.is_empty() {
        println!(
            "{:<52} ${:.1}B",
            "Average AUM per fund:",
            billions(total / aums.len() as i64)
        );
    }
    println!("{}", "=".repeat(80));
}

pub fn print_top_stocks(entries: &[StockAggregate], limit: usize) {
    println!("\n{}", "=".repeat(80));
    println!("{}", "TOP STOCKS BY TOTAL VALUE HELD".bold());
    println!("{}", "=".repeat(80));
    println!(
        "{:<35} {:<12} {:>12} {:>10}",
        "Issuer", "CUSIP", "Value", "# Funds"
    );
    println!("{}", "-".repeat(80));
    for entry in entries.iter().take(limit) {
        let value_str = format!("${:.1}B", billions(entry.value));
        println!(
            "{:<35} {:<12} {:>12} {:>10}",
            truncate(&entry.name, 33),
            entry.cusip,
            value_str,
            entry.num_funds()
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
