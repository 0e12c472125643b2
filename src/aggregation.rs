//! Spend-versus-limit projection over the category mirror.
//!
//! Nothing here is cached: every call walks the current categories once.

use serde::Serialize;

use crate::domain::Category;
use crate::store::EntityStore;

/// One category's position against its limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpend {
    pub name: String,
    pub limit: f64,
    pub spent: f64,
    /// `spent / limit * 100`, or 0 when the limit is not positive.
    pub percentage: f64,
    pub over_budget: bool,
    /// `limit - spent`; negative once the category is over budget.
    pub remaining: f64,
}

impl CategorySpend {
    pub fn from_category(category: &Category) -> Self {
        let percentage = percentage_of(category.spent, category.limit);
        Self {
            name: category.name.clone(),
            limit: category.limit,
            spent: category.spent,
            percentage,
            over_budget: category.spent > category.limit,
            remaining: category.limit - category.spent,
        }
    }

    /// Amount by which spend exceeds the limit, if it does.
    pub fn over_amount(&self) -> Option<f64> {
        self.over_budget.then(|| self.spent - self.limit)
    }

    /// Share of a progress bar to fill, capped at 100.
    pub fn fill_percentage(&self) -> f64 {
        self.percentage.min(100.0)
    }
}

/// Sums across every category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetTotals {
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
}

/// Read-only view of category spend.
#[derive(Debug, Clone, Copy)]
pub struct AggregationView<'a> {
    categories: &'a EntityStore<Category>,
}

impl<'a> AggregationView<'a> {
    pub fn new(categories: &'a EntityStore<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> Vec<CategorySpend> {
        self.categories
            .list()
            .into_iter()
            .map(CategorySpend::from_category)
            .collect()
    }

    pub fn category(&self, name: &str) -> Option<CategorySpend> {
        self.categories.get(name).map(CategorySpend::from_category)
    }

    pub fn over_budget(&self) -> Vec<CategorySpend> {
        self.categories()
            .into_iter()
            .filter(|spend| spend.over_budget)
            .collect()
    }

    pub fn totals(&self) -> BudgetTotals {
        let (limit, spent) = self
            .categories
            .list()
            .into_iter()
            .fold((0.0, 0.0), |(limit, spent), category| {
                (limit + category.limit, spent + category.spent)
            });
        BudgetTotals {
            limit,
            spent,
            remaining: limit - spent,
            percentage: percentage_of(spent, limit),
        }
    }
}

fn percentage_of(spent: f64, limit: f64) -> f64 {
    if limit > 0.0 {
        spent / limit * 100.0
    } else {
        0.0
    }
}
