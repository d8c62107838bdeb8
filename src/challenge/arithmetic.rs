//! Arithmetic challenges
//!
//! Each challenge combines two operands drawn from `0..=max_operand` with one
//! of the configured operators. Responses are compared as integers, so
//! `" 12"`, `"+12"` and `"12"` are all the same answer.

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{Challenge, ChallengeProvider};
use crate::constants::challenge::{DECOY_COUNT, MAX_OPERAND};

/// Binary operator used in a challenge prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Operator {
    /// Addition
    #[display("+")]
    Add,
    /// Subtraction, arranged so the result is never negative
    #[display("-")]
    Subtract,
    /// Multiplication
    #[display("×")]
    Multiply,
}

impl Operator {
    fn apply(self, lhs: i64, rhs: i64) -> i64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Subtract => lhs - rhs,
            Self::Multiply => lhs * rhs,
        }
    }
}

/// Provider of arithmetic challenges
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Arithmetic {
    /// Largest operand that may appear in a prompt
    #[garde(range(min = 1, max = MAX_OPERAND))]
    max_operand: i64,
    /// Operators to choose from
    #[garde(length(min = 1))]
    operators: Vec<Operator>,
}

impl Default for Arithmetic {
    fn default() -> Self {
        Self {
            max_operand: 20,
            operators: vec![Operator::Add, Operator::Subtract, Operator::Multiply],
        }
    }
}

impl Arithmetic {
    /// Creates a provider with the given operand bound and operators
    pub fn new(max_operand: i64, operators: Vec<Operator>) -> Self {
        Self {
            max_operand,
            operators,
        }
    }
}

/// Wrong answers close to the solution, in random order
fn decoys(solution: i64, rng: &mut fastrand::Rng) -> Vec<String> {
    let mut offsets = (1..=DECOY_COUNT as i64)
        .flat_map(|distance| [distance, -distance])
        .collect_vec();
    rng.shuffle(&mut offsets);
    offsets
        .into_iter()
        .take(DECOY_COUNT)
        .map(|offset| (solution + offset).to_string())
        .collect_vec()
}

impl ChallengeProvider for Arithmetic {
    fn issue(&self, rng: &mut fastrand::Rng) -> Challenge {
        let operator = rng
            .choice(self.operators.iter())
            .copied()
            .unwrap_or(Operator::Add);
        let max_operand = self.max_operand.clamp(1, MAX_OPERAND);
        let mut lhs = rng.i64(0..=max_operand);
        let mut rhs = rng.i64(0..=max_operand);
        if operator == Operator::Subtract && lhs < rhs {
            std::mem::swap(&mut lhs, &mut rhs);
        }

        let solution = operator.apply(lhs, rhs);

        Challenge::new(
            format!("{lhs} {operator} {rhs}"),
            vec![solution.to_string()],
            decoys(solution, rng),
            false,
        )
    }

    fn is_correct_answer(&self, challenge: &Challenge, response: &str) -> bool {
        let Ok(value) = response.trim().parse::<i64>() else {
            return false;
        };
        challenge
            .answers()
            .iter()
            .any(|answer| answer.parse::<i64>() == Ok(value))
    }
}
