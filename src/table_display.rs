use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crossterm::style::Stylize;
use ticker_dash::quote::format_price;
use ticker_dash::resolver::Candidate;

pub fn candidates_table(candidates: &[Candidate]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["Company", "Symbol", "Exchange", "Price"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for candidate in candidates {
        let price = Cell::new(format_price(candidate.price));
        let price = if candidate.price.is_available() {
            price.fg(Color::Green)
        } else {
            price.fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&candidate.display_name),
            Cell::new(candidate.symbol.as_str()),
            Cell::new(candidate.symbol.exchange().code()),
            price,
        ]);
    }
    table
}

pub fn display_candidates(query: &str, candidates: &[Candidate]) {
    if candidates.is_empty() {
        println!("{}", format!("No NSE/BSE listings match '{}'.", query).yellow());
        return;
    }

    println!("{}", candidates_table(candidates));
    println!(
        "\n{}",
        format!("{} candidates for '{}'", candidates.len(), query).green()
    );
}
