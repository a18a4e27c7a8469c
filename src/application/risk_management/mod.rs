pub mod bracket_calculator;
pub mod sizing_engine;

pub use bracket_calculator::{Bracket, BracketCalculator, REWARD_RISK_RATIO};
pub use sizing_engine::{PIP_VALUE_PER_UNIT, SizingEngine};
