use scraper::{ElementRef, Html, Selector};

use super::markup::{cell_with_tokens, first_text, parse_count, require_count, selector};
use crate::error::{ExtractError, SelectorError};

/// Everything read from one unit's result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsPage {
    pub registered: u64,
    pub envelopes: u64,
    pub valid_votes: u64,
    /// (party name, votes) in table order, then row order.
    pub parties: Vec<(String, u64)>,
    /// Party rows that had a name or count cell missing or unreadable.
    pub incomplete_rows: Vec<PartyRowRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyRowRef {
    pub table: usize,
    pub row: usize,
}

pub fn parse_results(html: &str) -> Result<ResultsPage, ExtractError> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let registered = require_count(root, &cell_with_tokens("td", "cislo", &["sa2"])?, "registered")?;
    let envelopes = require_count(root, &cell_with_tokens("td", "cislo", &["sa3"])?, "envelopes")?;
    let valid_votes = require_count(root, &cell_with_tokens("td", "cislo", &["sa6"])?, "valid")?;

    let blocks = selector("div.t2_470")?;
    let rows = selector("tr")?;
    let header = selector("th")?;
    let name = selector("td.overflow_name")?;

    let mut parties = Vec::new();
    let mut incomplete_rows = Vec::new();

    for (i, block) in root.select(&blocks).enumerate() {
        let table = i + 1;
        let hidden = table_cell("hidden_td", table, "sa1", "sb1")?;
        let votes = table_cell("cislo", table, "sa2", "sb3")?;

        for (row, tr) in block.select(&rows).enumerate() {
            if tr.select(&header).next().is_some() || tr.select(&hidden).next().is_some() {
                continue;
            }
            match party_entry(tr, &name, &votes) {
                Some(entry) => parties.push(entry),
                None => incomplete_rows.push(PartyRowRef { table, row }),
            }
        }
    }

    Ok(ResultsPage {
        registered,
        envelopes,
        valid_votes,
        parties,
        incomplete_rows,
    })
}

/// A cell of party table `table`, e.g. `t2sa2 t2sb3` for the vote count in table 2.
fn table_cell(class: &str, table: usize, row_header: &str, col_header: &str) -> Result<Selector, SelectorError> {
    let row_token = format!("t{table}{row_header}");
    let col_token = format!("t{table}{col_header}");
    cell_with_tokens("td", class, &[row_token.as_str(), col_token.as_str()])
}

fn party_entry(tr: ElementRef<'_>, name: &Selector, votes: &Selector) -> Option<(String, u64)> {
    let party = first_text(tr, name).filter(|n| !n.is_empty())?;
    let count = parse_count("party_votes", &first_text(tr, votes)?).ok()?;
    Some((party, count))
}
