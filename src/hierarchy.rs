use url::Url;

use crate::error::HierarchyError;
use crate::fetcher::PageFetcher;
use crate::log::LogSink;
use crate::model::{LeafTarget, ResolvedUnit, Unit};
use crate::parser::{listing_links, overview_rows, OverviewRow};

/// Query parameter present on links that already point at a unit's results.
pub const RESULT_LINK_PARAM: &str = "xvyber=";

/// Resolves an entry page into (unit, result page) pairs.
///
/// Rows are handled one at a time: a row whose link is a result page becomes
/// one unit, a row whose link is an intermediate listing contributes one unit
/// per result link on that listing. Output keeps row order, with a listing's
/// units in place of its row.
pub struct HierarchyWalker<'a, F> {
    fetcher: &'a F,
    base: &'a Url,
    log: &'a dyn LogSink,
}

impl<'a, F: PageFetcher> HierarchyWalker<'a, F> {
    pub fn new(fetcher: &'a F, base: &'a Url, log: &'a dyn LogSink) -> Self {
        HierarchyWalker { fetcher, base, log }
    }

    pub async fn resolve(&self, entry: &Url) -> Result<Vec<ResolvedUnit>, HierarchyError> {
        let html = self.fetcher.fetch(entry).await?;
        let rows = overview_rows(&html)?;

        let mut resolved = Vec::new();
        for row in rows {
            match row {
                OverviewRow::Unit { code, name, href } => {
                    let target = self.join(&href)?;
                    if is_result_link(&href) {
                        resolved.push(ResolvedUnit {
                            unit: Unit::new(code, name),
                            target: LeafTarget(target),
                        });
                    } else {
                        let children = self.expand_listing(&target, &code, &name).await?;
                        resolved.extend(children);
                    }
                }
                OverviewRow::Incomplete { index, missing } => {
                    self.log.info(
                        "row_skipped",
                        &[("url", entry), ("row", &index), ("missing", &missing)],
                    );
                }
            }
        }

        if resolved.is_empty() {
            return Err(HierarchyError::NoUnits {
                url: entry.to_string(),
            });
        }
        self.log
            .info("hierarchy_resolved", &[("url", entry), ("units", &resolved.len())]);
        Ok(resolved)
    }

    async fn expand_listing(
        &self,
        listing: &Url,
        parent_code: &str,
        parent_name: &str,
    ) -> Result<Vec<ResolvedUnit>, HierarchyError> {
        let html = self.fetcher.fetch(listing).await?;
        let links = listing_links(&html)?;
        if links.is_empty() {
            return Err(HierarchyError::EmptyListing {
                url: listing.to_string(),
            });
        }

        let children = links
            .into_iter()
            .map(|link| -> Result<ResolvedUnit, HierarchyError> {
                Ok(ResolvedUnit {
                    unit: Unit::new(format!("{}-{}", parent_code, link.text), parent_name),
                    target: LeafTarget(self.join(&link.href)?),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.log.info(
            "listing_expanded",
            &[("url", listing), ("code", &parent_code), ("units", &children.len())],
        );
        Ok(children)
    }

    fn join(&self, href: &str) -> Result<Url, HierarchyError> {
        self.base.join(href).map_err(|source| HierarchyError::InvalidLink {
            href: href.to_string(),
            source,
        })
    }
}

fn is_result_link(href: &str) -> bool {
    href.contains(RESULT_LINK_PARAM)
}
