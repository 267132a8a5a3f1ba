pub mod debt;
pub mod depreciation;
pub mod equity;
pub mod tax;
pub mod working_capital;
