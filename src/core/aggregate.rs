use crate::types::{CubeError, CubeResult, MaskedArray};
use ndarray::{stack, ArrayD, ArrayView1, ArrayViewD, Axis, Zip};
use num_traits::{Float, NumCast};
use std::cmp::Ordering;
use std::str::FromStr;

/// Statistic used to reduce a time series stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Mean,
    Median,
    Max,
    Min,
    /// Population standard deviation
    Std,
    Sum,
    /// Population variance
    Var,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Mean,
        Operation::Median,
        Operation::Max,
        Operation::Min,
        Operation::Std,
        Operation::Sum,
        Operation::Var,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Mean => "mean",
            Operation::Median => "median",
            Operation::Max => "max",
            Operation::Min => "min",
            Operation::Std => "std",
            Operation::Sum => "sum",
            Operation::Var => "var",
        }
    }

    /// Reduce the valid values at one position; `None` when nothing is valid
    fn reduce<T: Float>(&self, mut values: Vec<T>) -> Option<T> {
        if values.is_empty() {
            return None;
        }

        let value = match self {
            Operation::Mean => mean(&values),
            Operation::Median => {
                values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / (T::one() + T::one())
                } else {
                    values[mid]
                }
            }
            Operation::Max => values.iter().copied().fold(T::neg_infinity(), T::max),
            Operation::Min => values.iter().copied().fold(T::infinity(), T::min),
            Operation::Std => variance(&values).sqrt(),
            Operation::Sum => values.iter().copied().fold(T::zero(), |acc, v| acc + v),
            Operation::Var => variance(&values),
        };
        Some(value)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Operation {
    type Err = CubeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|operation| operation.name() == name)
            .ok_or_else(|| CubeError::UnsupportedOperation(name.to_string()))
    }
}

fn mean<T: Float>(values: &[T]) -> T {
    let count = <T as NumCast>::from(values.len()).unwrap_or_else(T::nan);
    values.iter().copied().fold(T::zero(), |acc, v| acc + v) / count
}

fn variance<T: Float>(values: &[T]) -> T {
    let center = mean(values);
    let squares: Vec<T> = values.iter().map(|v| (*v - center).powi(2)).collect();
    mean(&squares)
}

/// Stack masked arrays on a new leading axis and reduce along it
///
/// Missing elements are skipped at each position. A position missing in every
/// input stays missing in the output (its data slot holds NaN).
pub fn aggregate_time_series<T: Float>(
    arrays: &[MaskedArray<T>],
    operation: Operation,
) -> CubeResult<MaskedArray<T>> {
    let first = arrays.first().ok_or(CubeError::EmptyInput)?;
    for array in &arrays[1..] {
        if array.shape() != first.shape() {
            return Err(CubeError::ShapeMismatch {
                expected: first.shape().to_vec(),
                found: array.shape().to_vec(),
            });
        }
    }

    log::info!(
        "Aggregating {} arrays of shape {:?} with {}",
        arrays.len(),
        first.shape(),
        operation
    );

    let data_views: Vec<ArrayViewD<T>> = arrays.iter().map(|a| a.data.view()).collect();
    let mask_views: Vec<ArrayViewD<bool>> = arrays.iter().map(|a| a.mask.view()).collect();
    let data = stack(Axis(0), &data_views)?;
    let mask = stack(Axis(0), &mask_views)?;

    let reduced: ArrayD<Option<T>> = Zip::from(data.lanes(Axis(0)))
        .and(mask.lanes(Axis(0)))
        .map_collect(|values: ArrayView1<T>, missing: ArrayView1<bool>| {
            let valid: Vec<T> = values
                .iter()
                .zip(missing.iter())
                .filter(|(_, missing)| !**missing)
                .map(|(value, _)| *value)
                .collect();
            operation.reduce(valid)
        });

    let result = MaskedArray {
        data: reduced.mapv(|value| value.unwrap_or_else(T::nan)),
        mask: reduced.mapv(|value| value.is_none()),
    };

    log::debug!(
        "Aggregation complete: {} of {} positions valid",
        result.count_valid(),
        result.mask.len()
    );
    Ok(result)
}

/// Same as [`aggregate_time_series`] with the operation given by name
pub fn aggregate_by_name<T: Float>(
    arrays: &[MaskedArray<T>],
    operation: &str,
) -> CubeResult<MaskedArray<T>> {
    aggregate_time_series(arrays, operation.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::IxDyn;

    fn array(shape: &[usize], values: Vec<f64>) -> MaskedArray<f64> {
        MaskedArray::from_data(ArrayD::from_shape_vec(IxDyn(shape), values).unwrap())
    }

    fn masked(shape: &[usize], values: Vec<f64>, missing: Vec<bool>) -> MaskedArray<f64> {
        MaskedArray::new(
            ArrayD::from_shape_vec(IxDyn(shape), values).unwrap(),
            ArrayD::from_shape_vec(IxDyn(shape), missing).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_mean_of_two_arrays() {
        let arrays = vec![
            array(&[2, 2], vec![1.0, 2.0, 3.0, 4.0]),
            array(&[2, 2], vec![3.0, 4.0, 5.0, 6.0]),
        ];
        let result = aggregate_by_name(&arrays, "mean").unwrap();
        assert_eq!(result.shape(), &[2, 2]);
        assert_eq!(result.data.iter().copied().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(result.count_valid(), 4);
    }

    #[test]
    fn test_identical_arrays_unchanged() {
        let base = array(&[2, 3], vec![0.25, 1.5, -3.0, 7.75, 10.0, 0.0]);
        let arrays = vec![base.clone(), base.clone(), base.clone()];
        for operation in [Operation::Mean, Operation::Median, Operation::Max, Operation::Min] {
            let result = aggregate_time_series(&arrays, operation).unwrap();
            assert_eq!(result, base, "{} changed identical input", operation);
        }
    }

    #[test]
    fn test_missing_values_skipped() {
        let arrays = vec![
            masked(&[3], vec![1.0, 100.0, 5.0], vec![false, true, true]),
            masked(&[3], vec![3.0, 2.0, 6.0], vec![false, false, true]),
        ];

        let mean = aggregate_time_series(&arrays, Operation::Mean).unwrap();
        assert_eq!(mean.get(&[0]), Some(2.0));
        assert_eq!(mean.get(&[1]), Some(2.0));
        assert_eq!(mean.get(&[2]), None);
        assert!(mean.data[[2]].is_nan());

        let sum = aggregate_time_series(&arrays, Operation::Sum).unwrap();
        assert_eq!(sum.get(&[0]), Some(4.0));
        assert_eq!(sum.get(&[1]), Some(2.0));
        assert_eq!(sum.get(&[2]), None);
    }

    #[test]
    fn test_spread_statistics() {
        let arrays = vec![
            array(&[1], vec![2.0]),
            array(&[1], vec![4.0]),
            array(&[1], vec![4.0]),
            array(&[1], vec![4.0]),
            array(&[1], vec![5.0]),
            array(&[1], vec![5.0]),
            array(&[1], vec![7.0]),
            array(&[1], vec![9.0]),
        ];
        let var = aggregate_time_series(&arrays, Operation::Var).unwrap();
        let std = aggregate_time_series(&arrays, Operation::Std).unwrap();
        let median = aggregate_time_series(&arrays, Operation::Median).unwrap();
        let max = aggregate_time_series(&arrays, Operation::Max).unwrap();
        let min = aggregate_time_series(&arrays, Operation::Min).unwrap();

        assert_abs_diff_eq!(var.data[[0]], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(std.data[[0]], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(median.data[[0]], 4.5, epsilon = 1e-12);
        assert_eq!(max.data[[0]], 9.0);
        assert_eq!(min.data[[0]], 2.0);
    }

    #[test]
    fn test_three_dimensional_stack() {
        let arrays: Vec<MaskedArray<f32>> = (0..4)
            .map(|i| {
                MaskedArray::from_data(ArrayD::from_elem(IxDyn(&[2, 3, 4]), i as f32))
            })
            .collect();
        let result = aggregate_time_series(&arrays, Operation::Sum).unwrap();
        assert_eq!(result.shape(), &[2, 3, 4]);
        assert!(result.data.iter().all(|v| *v == 6.0));
    }

    #[test]
    fn test_operation_names() {
        for operation in Operation::ALL {
            assert_eq!(operation.name().parse::<Operation>().unwrap(), operation);
        }
        assert!(matches!(
            "bogus".parse::<Operation>(),
            Err(CubeError::UnsupportedOperation(ref name)) if name == "bogus"
        ));
    }

    #[test]
    fn test_unsupported_operation() {
        let arrays = vec![array(&[1], vec![1.0])];
        assert!(matches!(
            aggregate_by_name(&arrays, "unknown"),
            Err(CubeError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let arrays = vec![array(&[2, 2], vec![0.0; 4]), array(&[4], vec![0.0; 4])];
        assert!(matches!(
            aggregate_time_series(&arrays, Operation::Mean),
            Err(CubeError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        let arrays: Vec<MaskedArray<f64>> = Vec::new();
        assert!(matches!(
            aggregate_time_series(&arrays, Operation::Mean),
            Err(CubeError::EmptyInput)
        ));
    }
}
