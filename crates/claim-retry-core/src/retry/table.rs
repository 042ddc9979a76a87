use serde::{Deserialize, Serialize};

use super::category::ErrorCategory;

/// One value per error category.
///
/// Field names match the snake_case category names so a table reads the same
/// in code and in `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerCategory<T> {
    pub gas_error: T,
    pub network_error: T,
    pub timeout_error: T,
    pub nullifier_reuse: T,
    pub nonce_error: T,
    pub balance_error: T,
    pub transaction_reverted: T,
    pub unknown_error: T,
}

impl<T: Copy> PerCategory<T> {
    pub fn get(&self, category: ErrorCategory) -> T {
        match category {
            ErrorCategory::GasError => self.gas_error,
            ErrorCategory::NetworkError => self.network_error,
            ErrorCategory::TimeoutError => self.timeout_error,
            ErrorCategory::NullifierReuse => self.nullifier_reuse,
            ErrorCategory::NonceError => self.nonce_error,
            ErrorCategory::BalanceError => self.balance_error,
            ErrorCategory::TransactionReverted => self.transaction_reverted,
            ErrorCategory::UnknownError => self.unknown_error,
        }
    }
}
