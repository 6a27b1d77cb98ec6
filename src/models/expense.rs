use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::Category;

#[derive(Debug, Clone)]
pub struct Expense {
    pub id: Option<i64>,
    pub user_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    /// Raw stored value. Use [`Expense::category`] for the typed form.
    pub category: String,
    pub created_at: String,
}

impl Expense {
    pub fn new(
        user_id: i64,
        date: NaiveDate,
        description: String,
        amount: Decimal,
        category: Category,
    ) -> Self {
        Self {
            id: None,
            user_id,
            date,
            description,
            amount,
            category: category.as_str().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn category(&self) -> Option<Category> {
        Category::from_stored(&self.category)
    }
}

impl std::fmt::Display for Expense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {} INR", self.description, self.amount)
    }
}
