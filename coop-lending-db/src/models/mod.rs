pub mod ledger_entry;
pub mod loan;
pub mod member;
pub mod repayment;
pub mod surety;

// Re-exports
pub use ledger_entry::*;
pub use loan::*;
pub use member::*;
pub use repayment::*;
pub use surety::*;
