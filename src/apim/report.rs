//! Report Printer
//!
//! Turns a completed [`ScanContext`] into per-API usage lines. An API's
//! subscription count is the sum, over the Products linked to it, of the
//! recorded subscription-list length for that Product (0 when a Product was
//! never recorded).

use crate::apim::scanner::ScanContext;

/// One report line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUsage {
    pub api: String,
    pub product_count: usize,
    pub subscription_count: usize,
}

/// Per-API usage for one service instance
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Lines in API→Products map insertion order
    pub lines: Vec<ApiUsage>,
    /// Sum of subscription counts across all APIs. Tracked but not printed;
    /// TODO: surface it once a summary-line format is agreed on.
    pub total_subscriptions: usize,
}

/// Build the usage report from a completed scan
pub fn build_report(ctx: &ScanContext) -> Report {
    let mut lines = Vec::with_capacity(ctx.api_products.len());
    let mut total_subscriptions = 0;

    for (api, products) in &ctx.api_products {
        let subscription_count: usize = products
            .iter()
            .map(|product| {
                ctx.product_subscriptions
                    .get(product.name_or_empty())
                    .map_or(0, Vec::len)
            })
            .sum();
        total_subscriptions += subscription_count;

        lines.push(ApiUsage {
            api: api.clone(),
            product_count: products.len(),
            subscription_count,
        });
    }

    Report {
        lines,
        total_subscriptions,
    }
}

impl Report {
    /// Print one line per API to stdout
    pub fn print(&self) {
        for line in &self.lines {
            println!("{}", line.format());
        }
    }
}

impl ApiUsage {
    /// Render the stable per-API line format
    pub fn format(&self) -> String {
        format!(
            "API {} Products = {}, Subscriptions = {}",
            self.api, self.product_count, self.subscription_count
        )
    }
}
