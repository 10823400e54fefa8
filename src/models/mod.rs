mod gmm;
mod min_dist;
mod mlp;

pub use gmm::GmmModel;
pub use min_dist::MinDistModel;
pub use mlp::MlpModel;

use machine_learning::classifiers::ClassifierParams;

use crate::{
    attribute::{Attribute, Value},
    error::{AdapterError, Result},
};

/// Converts a host number into a count. Negative values become zero so the
/// library's own validation rejects them with its usual hint.
fn count(value: Value) -> usize {
    usize::try_from(value.as_i64()).unwrap_or(0)
}

/// Applies the null rejection and scaling settings every classifier shares.
///
/// Returns `None` if `attr` isn't one of them.
fn set_classifier_param(
    params: &mut ClassifierParams,
    attr: Attribute,
    value: Value,
) -> Option<Result<()>> {
    let res = match attr {
        Attribute::NullRejection => {
            params.set_null_rejection(value.as_bool());
            Ok(())
        }
        Attribute::NullRejectionCoeff => params
            .set_null_rejection_coeff(value.as_f64())
            .map_err(AdapterError::from),
        Attribute::EnableScaling => {
            params.set_scaling(value.as_bool());
            Ok(())
        }
        _ => return None,
    };

    Some(res)
}

fn classifier_param(params: &ClassifierParams, attr: Attribute) -> Option<Value> {
    match attr {
        Attribute::NullRejection => Some(Value::Bool(params.null_rejection())),
        Attribute::NullRejectionCoeff => Some(Value::Float(params.null_rejection_coeff())),
        Attribute::EnableScaling => Some(Value::Bool(params.scaling())),
        _ => None,
    }
}

fn unknown(attr: Attribute) -> AdapterError {
    AdapterError::UnknownAttribute(attr.name().to_string())
}
