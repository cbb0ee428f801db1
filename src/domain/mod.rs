pub mod account_request_status;
pub mod detergent;
pub mod name;
pub mod new_password;
pub mod operating_hours;
pub mod order_status;
pub mod phone_number;
pub mod pricing;
pub mod role;
pub mod user_email;

pub use account_request_status::AccountRequestStatus;
pub use detergent::{DetergentKind, ServiceUnit};
pub use name::{RequiredText, ShopName};
pub use new_password::NewPassword;
pub use operating_hours::{DayHours, WeeklyHours};
pub use order_status::{Fulfillment, OrderStatus};
pub use phone_number::PhoneNumberDomain;
pub use pricing::{price_lines, PricedLine, PricingError, RequestedLine};
pub use role::Role;
pub use user_email::UserEmail;
