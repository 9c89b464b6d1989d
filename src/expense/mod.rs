mod core;
mod endpoints;

pub use core::{
    Expense, NewExpense, create_expense, create_expense_table, get_first_expenses, sum_expenses,
};
pub use endpoints::{ExpenseState, create_expense_endpoint, list_expenses_endpoint};
