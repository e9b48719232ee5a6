//! Numeric encoding of feature vectors at the model boundary
//!
//! Reconciliation passes caller values through untouched; tree models need
//! plain floats. Conversion happens here so malformed values surface as
//! classifier errors for the instance that carried them.

use probrank_core::{Error, FeatureSchema, FeatureVector, Result, ScalarValue};

/// Convert one scalar to a float.
///
/// Numbers pass through, booleans become 1/0 and strings are parsed as
/// floats. Null becomes NaN, which [`encode`] rejects.
pub fn to_f64(value: &ScalarValue) -> Result<f64> {
    match value {
        ScalarValue::Number(n) => Ok(*n),
        ScalarValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        ScalarValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::classifier(format!("could not convert string to float: '{}'", s))),
        ScalarValue::Null => Ok(f64::NAN),
    }
}

/// Convert a reconciled vector to finite floats.
///
/// `schema` only names offending features in error messages.
pub fn encode(vector: &FeatureVector, schema: &FeatureSchema) -> Result<Vec<f64>> {
    if vector.len() != schema.len() {
        return Err(Error::classifier(format!(
            "expected {} features, got {}",
            schema.len(),
            vector.len()
        )));
    }

    vector
        .values()
        .iter()
        .zip(schema.iter())
        .map(|(value, name)| {
            let x = to_f64(value)?;
            if x.is_nan() {
                return Err(Error::classifier(format!(
                    "input contains NaN (feature '{}')",
                    name
                )));
            }
            if x.is_infinite() {
                return Err(Error::classifier(format!(
                    "input contains infinity (feature '{}')",
                    name
                )));
            }
            Ok(x)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(["a", "b", "c"]).unwrap()
    }

    #[test]
    fn test_encodes_mixed_scalars() {
        let vector = FeatureVector::new(vec![
            ScalarValue::Number(2.5),
            ScalarValue::Bool(true),
            ScalarValue::Text(" 1e-3 ".into()),
        ]);
        assert_eq!(encode(&vector, &schema()).unwrap(), vec![2.5, 1.0, 0.001]);
    }

    #[test]
    fn test_unparsable_string_fails() {
        let vector = FeatureVector::new(vec![
            ScalarValue::Number(0.0),
            ScalarValue::Text("abc".into()),
            ScalarValue::Number(0.0),
        ]);
        let err = encode(&vector, &schema()).unwrap_err();
        assert_eq!(err.to_string(), "classifier error: could not convert string to float: 'abc'");
    }

    #[test]
    fn test_null_reports_nan() {
        let vector = FeatureVector::new(vec![
            ScalarValue::Number(0.0),
            ScalarValue::Number(0.0),
            ScalarValue::Null,
        ]);
        let err = encode(&vector, &schema()).unwrap_err();
        assert!(err.to_string().contains("NaN (feature 'c')"));
    }

    #[test]
    fn test_infinite_string_rejected() {
        let vector = FeatureVector::new(vec![
            ScalarValue::Text("inf".into()),
            ScalarValue::Number(0.0),
            ScalarValue::Number(0.0),
        ]);
        let err = encode(&vector, &schema()).unwrap_err();
        assert!(err.to_string().contains("infinity (feature 'a')"));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let vector = FeatureVector::new(vec![ScalarValue::Number(0.0)]);
        assert!(encode(&vector, &schema()).is_err());
    }
}
