mod budget;
mod category;
mod expense;
mod user;

pub use budget::BudgetProfile;
pub use category::Category;
pub use expense::Expense;
pub use user::User;
