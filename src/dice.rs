use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("A die needs at least one side")]
    NoSides,

    #[error("Either sides or formula is required")]
    MissingRoll,
}

/// Rolls a single die, uniform in `1..=sides`
pub fn roll_die(sides: u32) -> Result<u32, DiceError> {
    if sides == 0 {
        return Err(DiceError::NoSides);
    }
    Ok(rand::rng().random_range(1..=sides))
}

pub fn roll_content(sides: u32, result: u32) -> String {
    format!("Rolled 1d{sides}: **{result}**")
}

/// Formulas are echoed back, never evaluated.
pub fn formula_content(formula: &str) -> String {
    format!("Rolled formula: {formula} (simulated)")
}
