pub mod amortization;
pub mod clock;
pub mod entity_locks;
pub mod loan_lifecycle;
pub mod payment_calendar;
pub mod reference;
pub mod surety_gate;

pub use amortization::{compute_schedule, installment_plan, AmortizationSchedule, Installment};
pub use clock::{Clock, FixedClock, SystemClock};
pub use entity_locks::EntityLocks;
pub use loan_lifecycle::LoanLifecycleService;
pub use payment_calendar::next_payment_date;
pub use surety_gate::{SuretyGate, SuretyPolicy};
