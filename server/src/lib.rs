pub mod error;
pub mod form;
pub mod paypal;

pub use error::PaymentError;
pub use form::RedirectForm;
