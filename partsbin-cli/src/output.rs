//! Human-readable rendering of core results

use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use partsbin_core::analysis::{GapReport, SlotSets};
use partsbin_core::model::{Product, Slot};
use partsbin_core::optimizer::{Candidate, OptimizationResult, PurchaseStatus};

#[derive(Tabled)]
pub struct ProductTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Primary")]
    primary: String,
    #[tabled(rename = "Secondary")]
    secondary: String,
    #[tabled(rename = "Tertiary")]
    tertiary: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Product> for ProductTableRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id().to_string(),
            name: product.name().to_string(),
            tier: product.tier().to_string(),
            price: product.price().to_string(),
            primary: product.part(Slot::Primary).name.clone(),
            secondary: product.part(Slot::Secondary).name.clone(),
            tertiary: product.part(Slot::Tertiary).name.clone(),
            status: product.status().as_str().to_string(),
        }
    }
}

#[derive(Tabled)]
struct CandidateTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Avg price")]
    price: String,
    #[tabled(rename = "Provides")]
    provides: String,
    #[tabled(rename = "Score")]
    score: String,
}

impl From<&Candidate> for CandidateTableRow {
    fn from(candidate: &Candidate) -> Self {
        Self {
            id: candidate.product.id().to_string(),
            name: candidate.product.name().to_string(),
            tier: candidate.product.tier().to_string(),
            price: format!("{:.0}", candidate.price_average),
            provides: candidate
                .provides
                .iter()
                .map(|part| part.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            score: format!("{:.1}", candidate.utility_score),
        }
    }
}

fn render<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}

pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products.");
        return;
    }
    let rows: Vec<ProductTableRow> = products.iter().map(ProductTableRow::from).collect();
    println!("{}", render(&rows));
}

fn format_slots(sets: &SlotSets) -> String {
    if sets.is_empty() {
        return "(none)".to_string();
    }
    sets.pairs()
        .map(|part| part.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_gap(report: &GapReport) {
    println!(
        "Completion: {}% ({}/{} parts owned)",
        report.completion_percentage, report.owned_count, report.needed_count
    );
    if report.is_complete {
        println!("✅ Every requested part is owned");
    } else {
        println!("Missing: {}", format_slots(&report.missing));
    }
}

pub fn print_plan(result: &OptimizationResult) {
    print_gap(&result.analysis);
    println!();

    match result.status {
        PurchaseStatus::GapClosed => {
            println!("No purchase needed.");
            return;
        }
        PurchaseStatus::NoCoverageAvailable => {
            println!("❌ No available product covers the missing parts.");
            return;
        }
        PurchaseStatus::PartiallyCovered | PurchaseStatus::FullyCovered => {}
    }

    let rows: Vec<CandidateTableRow> = result
        .optimal_solution
        .iter()
        .map(CandidateTableRow::from)
        .collect();
    println!("Recommended purchases (total {:.0}¥):", result.total_cost);
    println!("{}", render(&rows));

    if !result.uncoverable.is_empty() {
        println!(
            "⚠️  No product supplies: {}",
            format_slots(&result.uncoverable)
        );
    }

    for alternative in &result.alternatives {
        let ids: Vec<&str> = alternative
            .products
            .iter()
            .map(|c| c.product.id())
            .collect();
        println!(
            "  {}: {} ({:.0}¥)",
            alternative.label,
            ids.join(", "),
            alternative.total_cost
        );
    }

    if result.savings.amount > 0.0 {
        println!(
            "Saves {:.0}¥ ({}%) against the most expensive option",
            result.savings.amount, result.savings.percentage
        );
    }
}
