use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 9] = [
    "type", "reseller", "sale", "index", "amount", "count", "client", "method", "at",
];

fn cents(value: u32) -> String {
    format!("{}.{:02}", value / 100, value % 100)
}

/// Writes a random but well-formed journal: every reseller is registered
/// first, then sales with payments, installment marks and settlements.
pub fn generate_journal(path: &Path, resellers: u32, sales: u32, seed: u64) -> Result<(), Error> {
    let mut rng = StdRng::seed_from_u64(seed);
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(HEADER)?;

    for reseller in 1..=resellers {
        let id = reseller.to_string();
        wtr.write_record(["reseller", id.as_str(), "", "", "", "", "Reseller", "", ""])?;
        let items = rng.gen_range(1..20u32).to_string();
        let value = cents(rng.gen_range(10_000..500_000));
        wtr.write_record(["allot", id.as_str(), "", "", value.as_str(), items.as_str(), "", "", ""])?;
    }

    for sale in 1..=sales {
        let reseller = rng.gen_range(1..=resellers).to_string();
        let id = sale.to_string();
        let price = cents(rng.gen_range(100..100_000));
        wtr.write_record(["sale", reseller.as_str(), id.as_str(), "", price.as_str(), "", "Client", "", ""])?;

        if rng.gen_bool(0.7) {
            let count: u32 = rng.gen_range(1..=6);
            wtr.write_record(["pay", reseller.as_str(), id.as_str(), "", "", count.to_string().as_str(), "", "credit", ""])?;

            for _ in 0..rng.gen_range(0..=count + 1) {
                let index = rng.gen_range(0..count).to_string();
                let amount = if rng.gen_bool(0.5) {
                    cents(rng.gen_range(100..50_000))
                } else {
                    String::new()
                };
                let kind = if rng.gen_bool(0.85) { "mark" } else { "unmark" };
                wtr.write_record([kind, reseller.as_str(), id.as_str(), index.as_str(), amount.as_str(), "", "", "", ""])?;
            }
        }

        if rng.gen_bool(0.05) {
            wtr.write_record(["settle", reseller.as_str(), "", "", "", "", "", "", ""])?;
            if rng.gen_bool(0.5) {
                wtr.write_record(["complete", reseller.as_str(), "", "", "", "", "", "", ""])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
