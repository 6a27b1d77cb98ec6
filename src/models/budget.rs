use rust_decimal::Decimal;

use super::Category;

/// Per-category spending ceilings, one profile per user.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProfile {
    pub id: Option<i64>,
    pub user_id: i64,
    pub food: Decimal,
    pub utilities: Decimal,
    pub entertainment: Decimal,
    pub others: Decimal,
}

impl BudgetProfile {
    pub fn ceiling(&self, category: Category) -> Decimal {
        match category {
            Category::Food => self.food,
            Category::Utilities => self.utilities,
            Category::Entertainment => self.entertainment,
            Category::Others => self.others,
        }
    }

    pub fn total(&self) -> Decimal {
        self.food + self.utilities + self.entertainment + self.others
    }
}
