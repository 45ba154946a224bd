//! Dice expressions such as `2d6+3`, rolled against a [`RollStream`].

use std::fmt;
use std::str::FromStr;

use super::rng::RollStream;

/// `count`d`sides` + `bonus`. A zero `count` is a flat amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    #[error("missing 'd' in dice notation `{0}`")]
    MissingSeparator(String),

    #[error("invalid dice count `{0}`")]
    InvalidCount(String),

    #[error("invalid die sides `{0}`")]
    InvalidSides(String),

    #[error("invalid modifier `{0}`")]
    InvalidModifier(String),
}

/// Individual dice and the resulting total of one roll.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceRoll {
    pub dice: Vec<u32>,
    pub bonus: i32,
    pub total: i32,
}

impl DiceExpr {
    pub const fn new(count: u32, sides: u32, bonus: i32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    pub const fn flat(amount: i32) -> Self {
        Self::new(0, 0, amount)
    }

    /// Same expression with the dice count doubled (critical hits).
    #[must_use]
    pub const fn doubled(self) -> Self {
        Self::new(self.count * 2, self.sides, self.bonus)
    }

    #[must_use]
    pub const fn plus(self, bonus: i32) -> Self {
        Self::new(self.count, self.sides, self.bonus + bonus)
    }

    pub fn roll(&self, stream: &mut RollStream) -> DiceRoll {
        let dice: Vec<u32> = (0..self.count)
            .map(|_| stream.roll_die(self.sides))
            .collect();
        let sum: i64 = dice.iter().map(|&d| i64::from(d)).sum();
        let total = i32::try_from(sum + i64::from(self.bonus)).unwrap_or(i32::MAX);
        DiceRoll {
            dice,
            bonus: self.bonus,
            total,
        }
    }

    pub fn min(&self) -> i32 {
        self.count as i32 + self.bonus
    }

    pub fn max(&self) -> i32 {
        (self.count * self.sides) as i32 + self.bonus
    }

    /// Expected value, in tenths, to keep comparisons integral.
    pub fn average_tenths(&self) -> i32 {
        (self.count as i32 * (self.sides as i32 + 1) * 5) + self.bonus * 10
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "{}", self.bonus);
        }
        match self.bonus {
            0 => write!(f, "{}d{}", self.count, self.sides),
            b if b > 0 => write!(f, "{}d{}+{}", self.count, self.sides, b),
            b => write!(f, "{}d{}{}", self.count, self.sides, b),
        }
    }
}

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(notation: &str) -> Result<Self, Self::Err> {
        let notation = notation.trim().to_ascii_lowercase();
        let (count_str, rest) = notation
            .split_once('d')
            .ok_or_else(|| DiceError::MissingSeparator(notation.clone()))?;

        let count = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse::<u32>()
                .map_err(|_| DiceError::InvalidCount(count_str.to_string()))?
        };

        let (sides_str, bonus) = match rest.find(['+', '-']) {
            Some(idx) => {
                let modifier = &rest[idx..];
                let bonus = modifier
                    .trim_start_matches('+')
                    .parse::<i32>()
                    .map_err(|_| DiceError::InvalidModifier(modifier.to_string()))?;
                (&rest[..idx], bonus)
            }
            None => (rest, 0),
        };

        let sides = sides_str
            .parse::<u32>()
            .ok()
            .filter(|&s| s > 0)
            .ok_or_else(|| DiceError::InvalidSides(sides_str.to_string()))?;

        Ok(Self::new(count, sides, bonus))
    }
}
