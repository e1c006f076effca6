pub mod challan;
pub mod collection;
pub mod discount;
pub mod fee_structure;
pub mod money;
pub mod student;

pub use challan::{
    AppliedDiscount, BillingPeriod, Challan, ChallanLineItem, ChallanStatus, PaymentMethod,
};
pub use collection::{ClassCollectionSummary, SchoolCollectionSummary};
pub use discount::{Discount, DiscountType, DiscountValidationError, Eligibility};
pub use fee_structure::{FeeHead, FeeStructure};
pub use student::{GuardianKey, Student, StudentStatus};
