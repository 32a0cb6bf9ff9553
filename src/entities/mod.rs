pub mod assessment;
pub mod explanation;
pub mod metabolizer;
pub mod patient;
