//! Time-to-compromise expressions.
//!
//! A TTC annotation is a small arithmetic tree over probability
//! distributions. Only the closed-form means are evaluated here; sampling is
//! left to downstream simulators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LangError;

/// Sentinel mean for effectively unreachable steps.
pub const MEAN_TTC_INFINITY: f64 = f64::MAX;

/// Errors from TTC argument validation and mean evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TtcError {
    #[error("Invalid arguments for distribution")]
    InvalidArguments,

    #[error("Mean TTC is not supported by \"{0}\"")]
    UnsupportedMeanTtc(&'static str),

    #[error("Mean probability is not supported by \"{0}\"")]
    UnsupportedMeanProbability(&'static str),
}

/// The named probability distributions a TTC function can reference.
///
/// The first eight take arguments; the rest are fixed presets with an empty
/// argument list. `Enabled` and `Disabled` are defense states and only carry
/// a mean probability, never a mean TTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TtcDistribution {
    /// `[probability]`, where 0 <= probability <= 1.
    Bernoulli,
    /// `[trials, probability]`, where trials is a non-negative integer.
    Binomial,
    /// `[rate]`, where 0 < rate.
    Exponential,
    /// `[shape, scale]`, both positive.
    Gamma,
    /// `[normal_mean, normal_standard_deviation]`, deviation positive.
    LogNormal,
    /// `[minimum_value, shape]`, both positive.
    Pareto,
    /// `[mean, standard_deviation]`, deviation positive.
    TruncatedNormal,
    /// `[minimum, maximum]`, where minimum <= maximum.
    Uniform,
    /// `Exponential(1.0)`.
    EasyAndCertain,
    /// `Bernoulli(0.5) + Exponential(1.0)`.
    EasyAndUncertain,
    /// `Exponential(0.1)`.
    HardAndCertain,
    /// `Bernoulli(0.5) + Exponential(0.1)`.
    HardAndUncertain,
    /// `Exponential(0.01)`.
    VeryHardAndCertain,
    /// `Bernoulli(0.5) + Exponential(0.01)`.
    VeryHardAndUncertain,
    Infinity,
    Zero,
    Enabled,
    Disabled,
}

impl TtcDistribution {
    pub const ALL: [TtcDistribution; 18] = [
        TtcDistribution::Bernoulli,
        TtcDistribution::Binomial,
        TtcDistribution::Exponential,
        TtcDistribution::Gamma,
        TtcDistribution::LogNormal,
        TtcDistribution::Pareto,
        TtcDistribution::TruncatedNormal,
        TtcDistribution::Uniform,
        TtcDistribution::EasyAndCertain,
        TtcDistribution::EasyAndUncertain,
        TtcDistribution::HardAndCertain,
        TtcDistribution::HardAndUncertain,
        TtcDistribution::VeryHardAndCertain,
        TtcDistribution::VeryHardAndUncertain,
        TtcDistribution::Infinity,
        TtcDistribution::Zero,
        TtcDistribution::Enabled,
        TtcDistribution::Disabled,
    ];

    /// The name of this distribution as it appears in serialized documents.
    pub fn name(&self) -> &'static str {
        match self {
            TtcDistribution::Bernoulli => "Bernoulli",
            TtcDistribution::Binomial => "Binomial",
            TtcDistribution::Exponential => "Exponential",
            TtcDistribution::Gamma => "Gamma",
            TtcDistribution::LogNormal => "LogNormal",
            TtcDistribution::Pareto => "Pareto",
            TtcDistribution::TruncatedNormal => "TruncatedNormal",
            TtcDistribution::Uniform => "Uniform",
            TtcDistribution::EasyAndCertain => "EasyAndCertain",
            TtcDistribution::EasyAndUncertain => "EasyAndUncertain",
            TtcDistribution::HardAndCertain => "HardAndCertain",
            TtcDistribution::HardAndUncertain => "HardAndUncertain",
            TtcDistribution::VeryHardAndCertain => "VeryHardAndCertain",
            TtcDistribution::VeryHardAndUncertain => "VeryHardAndUncertain",
            TtcDistribution::Infinity => "Infinity",
            TtcDistribution::Zero => "Zero",
            TtcDistribution::Enabled => "Enabled",
            TtcDistribution::Disabled => "Disabled",
        }
    }

    /// Checks that `arguments` is a valid argument vector for this
    /// distribution. All arguments must be finite; parameterless
    /// distributions require an empty vector.
    pub fn validate_arguments(&self, arguments: &[f64]) -> Result<(), TtcError> {
        match self {
            TtcDistribution::Bernoulli => {
                require_finite(require_len(arguments, 1)?)?;
                require_zero_to_one(arguments[0])
            }
            TtcDistribution::Binomial => {
                require_finite(require_len(arguments, 2)?)?;
                require_integer(require_non_negative(arguments[0])?)?;
                require_zero_to_one(arguments[1])
            }
            TtcDistribution::Exponential => {
                require_finite(require_len(arguments, 1)?)?;
                require_positive(arguments[0]).map(|_| ())
            }
            TtcDistribution::Gamma | TtcDistribution::Pareto => {
                require_finite(require_len(arguments, 2)?)?;
                require_positive(arguments[0])?;
                require_positive(arguments[1]).map(|_| ())
            }
            TtcDistribution::LogNormal | TtcDistribution::TruncatedNormal => {
                require_finite(require_len(arguments, 2)?)?;
                require_positive(arguments[1]).map(|_| ())
            }
            TtcDistribution::Uniform => {
                require_finite(require_len(arguments, 2)?)?;
                if arguments[0] > arguments[1] {
                    return Err(TtcError::InvalidArguments);
                }
                Ok(())
            }
            _ => require_len(arguments, 0).map(|_| ()),
        }
    }

    /// Returns the mean TTC of this distribution given `arguments`.
    pub fn mean_ttc(&self, arguments: &[f64]) -> Result<f64, TtcError> {
        self.validate_arguments(arguments)?;
        Ok(match self {
            TtcDistribution::Bernoulli => {
                if arguments[0] < 0.5 {
                    0.0
                } else {
                    MEAN_TTC_INFINITY
                }
            }
            TtcDistribution::Binomial => arguments[0] * arguments[1],
            TtcDistribution::Exponential => 1.0 / arguments[0],
            TtcDistribution::Gamma => arguments[0] * arguments[1],
            TtcDistribution::LogNormal => (arguments[0] + arguments[1] * arguments[1] / 2.0).exp(),
            TtcDistribution::Pareto => {
                let (minimum, shape) = (arguments[0], arguments[1]);
                if shape > 1.0 {
                    shape * minimum / (shape - 1.0)
                } else {
                    MEAN_TTC_INFINITY
                }
            }
            TtcDistribution::TruncatedNormal => arguments[0],
            TtcDistribution::Uniform => (arguments[0] + arguments[1]) / 2.0,
            TtcDistribution::EasyAndCertain => TtcDistribution::Exponential.mean_ttc(&[1.0])?,
            TtcDistribution::EasyAndUncertain => {
                TtcDistribution::Bernoulli.mean_ttc(&[0.5])?
                    + TtcDistribution::Exponential.mean_ttc(&[1.0])?
            }
            TtcDistribution::HardAndCertain => TtcDistribution::Exponential.mean_ttc(&[0.1])?,
            TtcDistribution::HardAndUncertain => {
                TtcDistribution::Bernoulli.mean_ttc(&[0.5])?
                    + TtcDistribution::Exponential.mean_ttc(&[0.1])?
            }
            TtcDistribution::VeryHardAndCertain => {
                TtcDistribution::Exponential.mean_ttc(&[0.01])?
            }
            TtcDistribution::VeryHardAndUncertain => {
                TtcDistribution::Bernoulli.mean_ttc(&[0.5])?
                    + TtcDistribution::Exponential.mean_ttc(&[0.01])?
            }
            TtcDistribution::Infinity => MEAN_TTC_INFINITY,
            TtcDistribution::Zero => 1.0 / 86400.0,
            TtcDistribution::Enabled | TtcDistribution::Disabled => {
                return Err(TtcError::UnsupportedMeanTtc(self.name()))
            }
        })
    }

    /// Returns the mean success probability of this distribution given
    /// `arguments`. Only `Bernoulli`, `Enabled`, and `Disabled` carry one.
    pub fn mean_probability(&self, arguments: &[f64]) -> Result<f64, TtcError> {
        self.validate_arguments(arguments)?;
        match self {
            TtcDistribution::Bernoulli => Ok(if arguments[0] < 0.5 { 0.0 } else { 1.0 }),
            TtcDistribution::Enabled => Ok(1.0),
            TtcDistribution::Disabled => Ok(0.0),
            _ => Err(TtcError::UnsupportedMeanProbability(self.name())),
        }
    }
}

impl fmt::Display for TtcDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TtcDistribution {
    type Err = LangError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TtcDistribution::ALL
            .iter()
            .copied()
            .find(|distribution| distribution.name() == s)
            .ok_or_else(|| LangError::TtcDistributionNotFound(s.to_owned()))
    }
}

fn require_len(arguments: &[f64], len: usize) -> Result<&[f64], TtcError> {
    if arguments.len() == len {
        Ok(arguments)
    } else {
        Err(TtcError::InvalidArguments)
    }
}

fn require_finite(arguments: &[f64]) -> Result<(), TtcError> {
    if arguments.iter().all(|argument| argument.is_finite()) {
        Ok(())
    } else {
        Err(TtcError::InvalidArguments)
    }
}

fn require_zero_to_one(argument: f64) -> Result<(), TtcError> {
    if (0.0..=1.0).contains(&argument) {
        Ok(())
    } else {
        Err(TtcError::InvalidArguments)
    }
}

fn require_positive(argument: f64) -> Result<f64, TtcError> {
    if argument > 0.0 {
        Ok(argument)
    } else {
        Err(TtcError::InvalidArguments)
    }
}

fn require_non_negative(argument: f64) -> Result<f64, TtcError> {
    if argument >= 0.0 {
        Ok(argument)
    } else {
        Err(TtcError::InvalidArguments)
    }
}

fn require_integer(argument: f64) -> Result<(), TtcError> {
    if argument.floor() == argument {
        Ok(())
    } else {
        Err(TtcError::InvalidArguments)
    }
}

/// An arithmetic expression over TTC distributions.
///
/// The serialized form is a tagged object tree; the `type` tag selects the
/// variant. Means are evaluated recursively over the tree, with the binary
/// operators applied to the means of their operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TtcExpression {
    Number {
        value: f64,
    },
    Addition {
        lhs: Box<TtcExpression>,
        rhs: Box<TtcExpression>,
    },
    Subtraction {
        lhs: Box<TtcExpression>,
        rhs: Box<TtcExpression>,
    },
    Multiplication {
        lhs: Box<TtcExpression>,
        rhs: Box<TtcExpression>,
    },
    Division {
        lhs: Box<TtcExpression>,
        rhs: Box<TtcExpression>,
    },
    Exponentiation {
        lhs: Box<TtcExpression>,
        rhs: Box<TtcExpression>,
    },
    Function {
        name: TtcDistribution,
        arguments: Vec<f64>,
    },
}

impl TtcExpression {
    pub fn number(value: f64) -> Self {
        TtcExpression::Number { value }
    }

    pub fn addition(lhs: TtcExpression, rhs: TtcExpression) -> Self {
        TtcExpression::Addition {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn subtraction(lhs: TtcExpression, rhs: TtcExpression) -> Self {
        TtcExpression::Subtraction {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn multiplication(lhs: TtcExpression, rhs: TtcExpression) -> Self {
        TtcExpression::Multiplication {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn division(lhs: TtcExpression, rhs: TtcExpression) -> Self {
        TtcExpression::Division {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn exponentiation(lhs: TtcExpression, rhs: TtcExpression) -> Self {
        TtcExpression::Exponentiation {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Builds a function expression, validating `arguments` against the
    /// distribution up front.
    pub fn function(name: TtcDistribution, arguments: Vec<f64>) -> Result<Self, TtcError> {
        name.validate_arguments(&arguments)?;
        Ok(TtcExpression::Function { name, arguments })
    }

    /// Re-validates every function node in the tree. Deserialized
    /// expressions bypass the eager check in [`TtcExpression::function`], so
    /// resolution runs this before accepting an expression.
    pub fn validate(&self) -> Result<(), TtcError> {
        match self {
            TtcExpression::Number { .. } => Ok(()),
            TtcExpression::Addition { lhs, rhs }
            | TtcExpression::Subtraction { lhs, rhs }
            | TtcExpression::Multiplication { lhs, rhs }
            | TtcExpression::Division { lhs, rhs }
            | TtcExpression::Exponentiation { lhs, rhs } => {
                lhs.validate()?;
                rhs.validate()
            }
            TtcExpression::Function { name, arguments } => name.validate_arguments(arguments),
        }
    }

    /// Returns the mean TTC of this expression.
    pub fn mean_ttc(&self) -> Result<f64, TtcError> {
        match self {
            TtcExpression::Number { value } => Ok(*value),
            TtcExpression::Addition { lhs, rhs } => Ok(lhs.mean_ttc()? + rhs.mean_ttc()?),
            TtcExpression::Subtraction { lhs, rhs } => Ok(lhs.mean_ttc()? - rhs.mean_ttc()?),
            TtcExpression::Multiplication { lhs, rhs } => Ok(lhs.mean_ttc()? * rhs.mean_ttc()?),
            TtcExpression::Division { lhs, rhs } => Ok(lhs.mean_ttc()? / rhs.mean_ttc()?),
            TtcExpression::Exponentiation { lhs, rhs } => {
                Ok(lhs.mean_ttc()?.powf(rhs.mean_ttc()?))
            }
            TtcExpression::Function { name, arguments } => name.mean_ttc(arguments),
        }
    }

    /// Returns the mean success probability of this expression. Only
    /// function expressions over probability-bearing distributions have one.
    pub fn mean_probability(&self) -> Result<f64, TtcError> {
        match self {
            TtcExpression::Function { name, arguments } => name.mean_probability(arguments),
            TtcExpression::Number { .. } => Err(TtcError::UnsupportedMeanProbability("number")),
            TtcExpression::Addition { .. } => Err(TtcError::UnsupportedMeanProbability("addition")),
            TtcExpression::Subtraction { .. } => {
                Err(TtcError::UnsupportedMeanProbability("subtraction"))
            }
            TtcExpression::Multiplication { .. } => {
                Err(TtcError::UnsupportedMeanProbability("multiplication"))
            }
            TtcExpression::Division { .. } => Err(TtcError::UnsupportedMeanProbability("division")),
            TtcExpression::Exponentiation { .. } => {
                Err(TtcError::UnsupportedMeanProbability("exponentiation"))
            }
        }
    }
}
