use itertools::Itertools;
use serde_json::Value;
use tfmodgen_core::{Bound, ConstraintSet, graph::enum_literal};

use super::{
  naming::quoted,
  render::{attribute, pad, string_attribute},
  walker::ScalarKind,
};

/// A `validation` block of a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Validation {
  pub condition: String,
  pub error_message: String,
}

impl Validation {
  pub(crate) fn to_block(&self) -> hcl::Block {
    hcl::Block::builder("validation")
      .add_attribute(attribute("condition", self.condition.clone()))
      .add_attribute(string_attribute("error_message", &self.error_message))
      .build()
  }
}

/// What kind of value a validated variable holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
  Scalar(ScalarKind),
  List,
  Other,
}

/// Level the `condition` attribute sits at: inside `variable { validation { } }`.
const CONDITION_LEVEL: usize = 2;

struct Check {
  expression: String,
  message: String,
}

/// Builds the validation for one variable from its merged constraints.
///
/// Checks appear in a fixed order: lower bound, upper bound, length or item
/// bounds, `multipleOf`, enum. Optional variables short-circuit on `null`.
/// Returns `None` when nothing applies to the variable's type.
pub(crate) fn build_validation(name: &str, kind: ValueKind, required: bool, constraints: &ConstraintSet) -> Option<Validation> {
  let var = format!("var.{name}");
  let mut checks = Vec::new();

  if kind == ValueKind::Scalar(ScalarKind::Number) {
    if let Some(bound) = constraints.minimum {
      checks.push(lower_bound(&var, bound));
    }
    if let Some(bound) = constraints.maximum {
      checks.push(upper_bound(&var, bound));
    }
  }

  match kind {
    ValueKind::Scalar(ScalarKind::String) => {
      checks.extend(length_checks(&var, constraints.min_length, constraints.max_length, "characters long"));
    }
    ValueKind::List => {
      checks.extend(length_checks(&var, constraints.min_items, constraints.max_items, "items"));
      if constraints.unique_items {
        checks.push(Check {
          expression: format!("length(distinct({var})) == length({var})"),
          message: "unique".to_string(),
        });
      }
    }
    _ => {}
  }

  if kind == ValueKind::Scalar(ScalarKind::Number) {
    for divisor in &constraints.multiple_of {
      checks.push(Check {
        expression: format!("{var} % {divisor} == 0"),
        message: format!("multiple of {divisor}"),
      });
    }
  }

  if let (ValueKind::Scalar(scalar), Some(values)) = (kind, &constraints.enum_values)
    && !values.is_empty()
  {
    checks.push(enum_check(&var, scalar, values));
  }

  if checks.is_empty() {
    return None;
  }

  let message = checks.iter().map(|check| check.message.as_str()).join(" and ");
  Some(Validation {
    condition: condition(&var, required, &checks),
    error_message: format!("{name} must be {message}."),
  })
}

/// Whether merged constraints ended with an enum that nothing can satisfy.
pub(crate) fn has_empty_enum(constraints: &ConstraintSet) -> bool {
  constraints.enum_values.as_ref().is_some_and(Vec::is_empty)
}

fn lower_bound(var: &str, bound: Bound) -> Check {
  let op = if bound.exclusive { ">" } else { ">=" };
  Check {
    expression: format!("{var} {op} {}", bound.value),
    message: format!("{op} {}", bound.value),
  }
}

fn upper_bound(var: &str, bound: Bound) -> Check {
  let op = if bound.exclusive { "<" } else { "<=" };
  Check {
    expression: format!("{var} {op} {}", bound.value),
    message: format!("{op} {}", bound.value),
  }
}

fn length_checks(var: &str, min: Option<u64>, max: Option<u64>, unit: &str) -> Vec<Check> {
  let mut checks = Vec::new();
  if let Some(min) = min {
    checks.push(Check {
      expression: format!("length({var}) >= {min}"),
      message: format!("at least {min} {unit}"),
    });
  }
  if let Some(max) = max {
    checks.push(Check {
      expression: format!("length({var}) <= {max}"),
      message: format!("at most {max} {unit}"),
    });
  }
  checks
}

fn enum_check(var: &str, kind: ScalarKind, values: &[Value]) -> Check {
  let literals = values
    .iter()
    .map(|value| match (kind, value) {
      (ScalarKind::Number, Value::Number(number)) => number.to_string(),
      (ScalarKind::Bool, Value::Bool(flag)) => flag.to_string(),
      _ => quoted(&enum_literal(value)),
    })
    .join(", ");

  Check {
    expression: format!("contains([{literals}], {var})"),
    message: format!("one of: {}", values.iter().map(enum_literal).join(", ")),
  }
}

fn condition(var: &str, required: bool, checks: &[Check]) -> String {
  if let [check] = checks {
    return if required {
      check.expression.clone()
    } else {
      format!("{var} == null || {}", check.expression)
    };
  }

  let outer = pad(CONDITION_LEVEL);
  let inner = pad(CONDITION_LEVEL + 1);
  if required {
    let body = checks.iter().map(|check| format!("{inner}{}", check.expression)).join(" &&\n");
    return format!("(\n{body}\n{outer})");
  }

  let nested = pad(CONDITION_LEVEL + 2);
  let body = checks.iter().map(|check| format!("{nested}{}", check.expression)).join(" &&\n");
  format!("(\n{inner}{var} == null ||\n{inner}(\n{body}\n{inner})\n{outer})")
}
