use scraper::{ElementRef, Html, Selector};

use super::markup::{cell_containing, element_text, first_link, first_text, selector};
use crate::error::SelectorError;

/// Header markers of the cells that link to a unit's results. The list is
/// split over up to three side-by-side tables, one marker per table.
pub const RESULT_LINK_HEADERS: [&str; 3] = ["t1sa1", "t2sa1", "t3sa1"];

/// Marker of per-unit result links on an intermediate listing page.
pub const LISTING_RESULT_MARKER: &str = "ps311";

/// One row of an overview table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverviewRow {
    Unit {
        code: String,
        name: String,
        href: String,
    },
    /// A code cell was found but the row lacks something needed for a unit.
    Incomplete { index: usize, missing: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLink {
    pub text: String,
    pub href: String,
}

/// Compiled selectors for overview and listing pages.
struct OverviewSelectors {
    code_cell: Selector,
    name_cell: Selector,
    link: Selector,
}

impl OverviewSelectors {
    fn new() -> Result<Self, SelectorError> {
        Ok(OverviewSelectors {
            code_cell: cell_containing("td", "cislo", &RESULT_LINK_HEADERS)?,
            name_cell: selector("td.overflow_name")?,
            link: selector("a[href]")?,
        })
    }
}

/// Rows of the municipality/district overview, in document order.
///
/// A row is identified by its code cell; rows without one (headers, layout
/// rows) are not reported at all.
pub fn overview_rows(html: &str) -> Result<Vec<OverviewRow>, SelectorError> {
    let doc = Html::parse_document(html);
    let sel = OverviewSelectors::new()?;

    Ok(doc
        .select(&sel.code_cell)
        .enumerate()
        .map(|(index, cell)| parse_row(index, enclosing_row(cell), cell, &sel))
        .collect())
}

fn enclosing_row(cell: ElementRef<'_>) -> ElementRef<'_> {
    cell.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "tr")
        .unwrap_or(cell)
}

fn parse_row(index: usize, tr: ElementRef<'_>, code: ElementRef<'_>, sel: &OverviewSelectors) -> OverviewRow {
    let Some((href, code_text)) = first_link(code, &sel.link).filter(|(href, _)| !href.is_empty()) else {
        return OverviewRow::Incomplete {
            index,
            missing: "link",
        };
    };
    if code_text.is_empty() {
        return OverviewRow::Incomplete {
            index,
            missing: "code",
        };
    }
    match first_text(tr, &sel.name_cell) {
        Some(name) if !name.is_empty() => OverviewRow::Unit {
            code: code_text,
            name,
            href,
        },
        _ => OverviewRow::Incomplete {
            index,
            missing: "name",
        },
    }
}

/// Result links on an intermediate listing page, in document order.
pub fn listing_links(html: &str) -> Result<Vec<ListingLink>, SelectorError> {
    let doc = Html::parse_document(html);
    let links = selector(&format!("a[href*=\"{LISTING_RESULT_MARKER}\"]"))?;
    Ok(doc
        .select(&links)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            Some(ListingLink {
                text: element_text(&a),
                href: href.to_string(),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture;

    #[test]
    fn direct_overview_rows() {
        let rows = overview_rows(&fixture("overview_direct")).unwrap();
        assert_eq!(
            rows,
            vec![
                OverviewRow::Unit {
                    code: "001".into(),
                    name: "Alfa".into(),
                    href: "ps311?xjazyk=CZ&xkraj=12&xobec=001&xvyber=7103".into(),
                },
                OverviewRow::Unit {
                    code: "002".into(),
                    name: "Nová Ves".into(),
                    href: "ps311?xjazyk=CZ&xkraj=12&xobec=002&xvyber=7103".into(),
                },
                OverviewRow::Incomplete {
                    index: 2,
                    missing: "link",
                },
            ]
        );
    }

    #[test]
    fn mixed_overview_keeps_row_order() {
        let rows = overview_rows(&fixture("overview_mixed")).unwrap();
        let hrefs: Vec<&str> = rows
            .iter()
            .filter_map(|r| match r {
                OverviewRow::Unit { href, .. } => Some(href.as_str()),
                OverviewRow::Incomplete { .. } => None,
            })
            .collect();
        assert_eq!(
            hrefs,
            vec![
                "ps311?xjazyk=CZ&xkraj=12&xobec=001&xvyber=7103",
                "ps34?xjazyk=CZ&xkraj=12&xobec=003&xnumnuts=7103",
            ]
        );
    }

    #[test]
    fn listing_keeps_only_result_links() {
        let links = listing_links(&fixture("listing")).unwrap();
        let texts: Vec<&str> = links.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
        assert!(links.iter().all(|l| l.href.contains("xokrsek=")));
    }

    #[test]
    fn page_without_table_has_no_rows() {
        assert!(overview_rows("<html><body><p>Nic</p></body></html>").unwrap().is_empty());
        assert!(listing_links("<html></html>").unwrap().is_empty());
    }

    #[test]
    fn empty_href_is_a_missing_link() {
        let html = r#"<table>
            <tr><td class="cislo" headers="t1sa1 t1sb1"><a href=" ">004</a></td>
                <td class="overflow_name" headers="t1sa1 t1sb2">Delta</td></tr>
            <tr><td class="cislo" headers="t1sa1 t1sb1"><a href="ps311?xobec=005&amp;xvyber=7103"> </a></td>
                <td class="overflow_name" headers="t1sa1 t1sb2">Epsilon</td></tr>
        </table>"#;
        assert_eq!(
            overview_rows(html).unwrap(),
            vec![
                OverviewRow::Incomplete {
                    index: 0,
                    missing: "link",
                },
                OverviewRow::Incomplete {
                    index: 1,
                    missing: "code",
                },
            ]
        );
    }
}
