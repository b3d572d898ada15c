pub mod assignment;
pub mod doctor;
pub mod filters;
pub mod national_id;
pub mod patient;
pub mod views;

pub use assignment::*;
pub use doctor::*;
pub use filters::*;
pub use national_id::*;
pub use patient::*;
pub use views::*;
