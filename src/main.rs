use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use strum::{EnumIter, IntoEnumIterator};

use fund_tracker::edgar::client::EdgarClient;
use fund_tracker::funds::FUNDS;
use fund_tracker::{analysis, output, Tracker, TrackerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
enum MenuChoice {
    LatestFilings,
    FundHoldings,
    AllHoldings,
    Overlap,
    TopStocks,
    Aum,
    FullReport,
    Exit,
}

impl MenuChoice {
    fn label(&self) -> &'static str {
        match self {
            MenuChoice::LatestFilings => "Get latest filings summary for all funds",
            MenuChoice::FundHoldings => "Get detailed holdings for a specific fund",
            MenuChoice::AllHoldings => "Get holdings for ALL funds",
            MenuChoice::Overlap => "Analyze holdings overlap across all funds",
            MenuChoice::TopStocks => "Find stocks with highest total value held",
            MenuChoice::Aum => "Calculate AUM for all funds",
            MenuChoice::FullReport => "Generate full summary report (all data)",
            MenuChoice::Exit => "Exit",
        }
    }

    fn from_input(input: &str) -> Option<MenuChoice> {
        let selection: usize = input.trim().parse().ok()?;
        MenuChoice::iter().nth(selection.checked_sub(1)?)
    }
}

fn print_menu() {
    println!("\n{}", "=".repeat(80));
    println!("{}", "FUND 13F TRACKER".bold());
    println!("{}", "=".repeat(80));
    println!("\nOptions:");
    for (i, choice) in MenuChoice::iter().enumerate() {
        println!("{}. {}", i + 1, choice.label());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = TrackerConfig::from_env();
    let tracker = Tracker::new(EdgarClient::new(&config.user_agent));
    let mut rl = DefaultEditor::new()?;

    print_menu();
    loop {
        match rl.readline("\nSelect option (1-8): ") {
            Ok(line) => {
                let input = line.trim().to_string();
                let _ = rl.add_history_entry(&input);

                let choice = match MenuChoice::from_input(&input) {
                    Some(choice) => choice,
                    None => {
                        println!("Invalid option");
                        continue;
                    }
                };
                if choice == MenuChoice::Exit {
                    println!("Exiting...");
                    break;
                }
                if let Err(err) = run(choice, &tracker, &config, &mut rl).await {
                    eprintln!("Error: {}", err);
                }
                print_menu();
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

async fn run(
    choice: MenuChoice,
    tracker: &Tracker,
    config: &TrackerConfig,
    rl: &mut DefaultEditor,
) -> Result<()> {
    match choice {
        MenuChoice::LatestFilings => {
            println!("Fetching latest 13F filings for {} funds...", FUNDS.len());
            let filings = tracker.all_latest_filings().await;
            output::print_filings_summary(&filings);
            let path = output::write_filings_summary(&config.data_dir, &filings)?;
            println!("\nSaved filings summary to: {}", path.display());
        }
        MenuChoice::FundHoldings => {
            println!("\nAvailable funds:");
            for (i, (fund_name, _)) in FUNDS.iter().enumerate() {
                println!("{}. {}", i + 1, fund_name);
            }
            let line = rl.readline("\nSelect fund number: ")?;
            let index: usize = match line.trim().parse::<usize>() {
                Ok(n) if (1..=FUNDS.len()).contains(&n) => n - 1,
                _ => {
                    println!("Invalid selection");
                    return Ok(());
                }
            };
            let (fund_name, cik) = FUNDS[index];
            println!("Fetching holdings for {}...", fund_name);
            match tracker.fund_holdings(fund_name, cik).await? {
                Some(holdings) if !holdings.is_empty() => {
                    let path = output::write_holdings(&config.data_dir, &holdings)?;
                    println!(
                        "Saved {} holdings to: {}",
                        holdings.records.len(),
                        path.display()
                    );
                }
                _ => println!("No holdings data retrieved for {}", fund_name),
            }
        }
        MenuChoice::AllHoldings => {
            println!("Fetching holdings for all funds, this may take several minutes...");
            let all = tracker.all_fund_holdings().await;
            for holdings in &all {
                if !holdings.is_empty() {
                    output::write_holdings(&config.data_dir, holdings)?;
                }
            }
            let path = output::write_combined_summary(&config.data_dir, &all)?;
            println!("\nSaved {} funds to: {}", all.len(), path.display());
        }
        MenuChoice::Overlap => {
            let line = rl.readline("Minimum number of funds holding stock (default 3): ")?;
            let min_funds = line.trim().parse::<usize>().unwrap_or(3);
            println!("Analyzing holdings overlap, this may take several minutes...");
            let all = tracker.all_fund_holdings().await;
            let overlap = analysis::overlap(&all, min_funds);
            let path = output::write_overlap(&config.data_dir, &overlap)?;
            println!(
                "\nFound {} stocks held by {}+ funds",
                overlap.len(),
                min_funds
            );
            println!("Saved overlap analysis to: {}", path.display());
        }
        MenuChoice::TopStocks => {
            println!("Analyzing top stocks by total value, this may take several minutes...");
            let all = tracker.all_fund_holdings().await;
            let top = analysis::top_by_value(&all);
            output::print_top_stocks(&top, 10);
            let path = output::write_top_stocks(&config.data_dir, &top)?;
            println!("\nFound {} unique stocks across all portfolios", top.len());
            println!("Saved top stocks analysis to: {}", path.display());
        }
        MenuChoice::Aum => {
            println!("Calculating AUM for all funds, this may take several minutes...");
            let all = tracker.all_fund_holdings().await;
            let aums = analysis::fund_aums(&all);
            output::print_aum_table(&aums);
            let path = output::write_fund_aums(&config.data_dir, &aums)?;
            println!("\nSaved AUM data to: {}", path.display());
        }
        MenuChoice::FullReport => {
            println!("Generating full summary report, this may take several minutes...");
            let all = tracker.all_fund_holdings().await;
            let aums = analysis::fund_aums(&all);
            output::print_aum_table(&aums);
            let summary_path = output::write_combined_summary(&config.data_dir, &all)?;
            let aum_path = output::write_fund_aums(&config.data_dir, &aums)?;
            println!("\nFiles saved:");
            println!("  - Complete summary: {}", summary_path.display());
            println!("  - AUM data: {}", aum_path.display());
        }
        MenuChoice::Exit => unreachable!("handled by the caller"),
    }
    Ok(())
}
