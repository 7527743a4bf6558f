use anyhow::{bail, Result};
use std::env;
use std::path::Path;

use pg_accounting::{
    arrears_csv, compute_arrears, monthly_summary, occupancy, open_database, total_expected_rent,
    total_outstanding, DEFAULT_DB_PATH,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("init") => run_init(),
        Some("arrears") => run_arrears(&args[2..]),
        Some("summary") => run_summary(&args[2..]),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("🏠 PG Accounting - bookkeeping for your paying-guest house");
    println!();
    println!("Usage:");
    println!("  pg-accounting init                    Create {} with an empty schema", DEFAULT_DB_PATH);
    println!("  pg-accounting arrears <year> <month>  Arrears table for a billing period");
    println!("  pg-accounting summary <year> <month>  Revenue/expense summary for a period");
    println!();
    println!("  For the JSON API: cargo run --bin pg-server --features server");
}

fn parse_period(args: &[String]) -> Result<(i32, u32)> {
    let year: i32 = match args.first() {
        Some(y) => y.parse()?,
        None => bail!("Missing <year> argument"),
    };
    let month: u32 = match args.get(1) {
        Some(m) => m.parse()?,
        None => bail!("Missing <month> argument"),
    };
    if !(1..=12).contains(&month) {
        bail!("Month must be 1-12, got {}", month);
    }
    Ok((year, month))
}

fn run_init() -> Result<()> {
    open_database(Path::new(DEFAULT_DB_PATH))?;
    println!("✓ Database ready at {}", DEFAULT_DB_PATH);
    Ok(())
}

fn run_arrears(args: &[String]) -> Result<()> {
    let (year, month) = parse_period(args)?;
    let conn = open_database(Path::new(DEFAULT_DB_PATH))?;

    let rows = compute_arrears(&conn, year, month)?;

    println!("🧾 Arrears for {}/{}", month, year);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if rows.is_empty() {
        println!("No active tenants in this period.");
        return Ok(());
    }

    println!(
        "{:<24} {:<12} {:>10} {:>10} {:>10}",
        "Tenant", "Room", "Rent", "Paid", "Due"
    );
    for row in &rows {
        println!(
            "{:<24} {:<12} {:>10.2} {:>10.2} {:>10.2}",
            row.tenant_name,
            row.room_name.as_deref().unwrap_or("-"),
            row.rent,
            row.paid,
            row.due,
        );
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Expected rent:     {:>10.2}", total_expected_rent(&rows));
    println!("Total outstanding: {:>10.2}", total_outstanding(&rows));

    // Drop a CSV next to the database, same table the dashboard offers
    let csv_path = format!("arrears_{}_{}.csv", year, month);
    std::fs::write(&csv_path, arrears_csv(&rows)?)?;
    println!("✓ Wrote {}", csv_path);

    Ok(())
}

fn run_summary(args: &[String]) -> Result<()> {
    let (year, month) = parse_period(args)?;
    let conn = open_database(Path::new(DEFAULT_DB_PATH))?;

    let summary = monthly_summary(&conn, year, month)?;
    let occ = occupancy(&conn)?;

    println!("📊 Monthly summary for {}/{}", month, year);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Collections (all types): {:>12.2}", summary.revenue);
    println!("Expenses:                {:>12.2}", summary.expenses);
    println!("Net:                     {:>12.2}", summary.net);
    println!("Rent collected:          {:>12.2}", summary.rent_collected);
    println!("Rent expected:           {:>12.2}", summary.expected_rent);
    println!("Outstanding:             {:>12.2}", summary.outstanding);
    println!(
        "Occupancy: {}/{} rooms occupied ({:.0}%), {} vacant",
        occ.occupied, occ.total, occ.rate, occ.vacant
    );

    Ok(())
}
