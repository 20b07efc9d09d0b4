use crate::data::ScoringError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One day cut into equal intervals, one value per interval.
///
/// Masks hold values in `[0, 1]` and compose by multiplication; heat
/// contributions compose by addition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DayVector(Vec<f64>);

impl From<Vec<f64>> for DayVector {
    fn from(values: Vec<f64>) -> Self {
        DayVector(values)
    }
}

impl DayVector {
    pub fn filled(size: usize, value: f64) -> DayVector {
        DayVector(vec![value; size])
    }

    pub fn zeroes(size: usize) -> DayVector {
        DayVector::filled(size, 0.0)
    }

    pub fn ones(size: usize) -> DayVector {
        DayVector::filled(size, 1.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Largest value, `0.0` for an empty vector.
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(0.0_f64, f64::max)
    }

    fn check_dimensions(&self, other: &DayVector) -> Result<(), ScoringError> {
        if self.len() == other.len() {
            Ok(())
        } else {
            Err(ScoringError::DimensionMismatch {
                expected: self.len(),
                found: other.len(),
            })
        }
    }

    fn zip_with(
        &self,
        other: &DayVector,
        op: impl Fn(f64, f64) -> f64,
    ) -> Result<DayVector, ScoringError> {
        self.check_dimensions(other)?;

        Ok(DayVector(
            self.0
                .iter()
                .zip(other.0.iter())
                .map(|(&a, &b)| op(a, b))
                .collect(),
        ))
    }

    /// Element-wise product
    ///
    /// # Examples
    /// ```
    /// use zeitplan_slots::DayVector;
    ///
    /// let a = DayVector::from(vec![1.0, 0.5, 0.0]);
    /// let b = DayVector::from(vec![0.5, 0.5, 1.0]);
    /// assert_eq!(a.multiply(&b).unwrap(), DayVector::from(vec![0.5, 0.25, 0.0]));
    ///
    /// assert!(a.multiply(&DayVector::ones(2)).is_err());
    /// ```
    pub fn multiply(&self, other: &DayVector) -> Result<DayVector, ScoringError> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Element-wise sum
    pub fn add(&self, other: &DayVector) -> Result<DayVector, ScoringError> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn scalar_multiply(&self, scalar: f64) -> Result<DayVector, ScoringError> {
        if !scalar.is_finite() || scalar < 0.0 {
            return Err(ScoringError::invalid(format!(
                "cannot scale by {}",
                scalar
            )));
        }

        Ok(DayVector(self.0.iter().map(|v| v * scalar).collect()))
    }

    pub fn scalar_divide(&self, scalar: f64) -> Result<DayVector, ScoringError> {
        if !scalar.is_finite() || scalar <= 0.0 {
            return Err(ScoringError::invalid(format!(
                "cannot divide by {}",
                scalar
            )));
        }

        Ok(DayVector(self.0.iter().map(|v| v / scalar).collect()))
    }

    /// Scales the vector so its largest value is 1.
    /// A vector without a positive maximum is returned unchanged.
    ///
    /// # Examples
    /// ```
    /// use zeitplan_slots::DayVector;
    ///
    /// let heat = DayVector::from(vec![0.0, 0.1, 0.4]);
    /// assert_eq!(heat.normalize(), DayVector::from(vec![0.0, 0.25, 1.0]));
    ///
    /// assert_eq!(DayVector::zeroes(3).normalize(), DayVector::zeroes(3));
    /// ```
    pub fn normalize(&self) -> DayVector {
        let max = self.max();

        if max > 0.0 && max.is_finite() {
            DayVector(self.0.iter().map(|v| v / max).collect())
        } else {
            self.clone()
        }
    }

    /// `1 - v` for every value
    pub fn complement(&self) -> DayVector {
        DayVector(self.0.iter().map(|v| 1.0 - v).collect())
    }

    /// Slides a window of `window` intervals across the vector; every window
    /// scores the product of the values it covers. A single zero anywhere in a
    /// window zeroes that window.
    ///
    /// # Examples
    /// ```
    /// use zeitplan_slots::DayVector;
    ///
    /// let availability = DayVector::from(vec![1.0, 0.5, 1.0, 0.0, 1.0]);
    ///
    /// assert_eq!(
    ///     availability.zip_multiplying(2).unwrap(),
    ///     DayVector::from(vec![0.5, 0.5, 0.0, 0.0])
    /// );
    /// assert!(availability.zip_multiplying(6).unwrap().is_empty());
    /// assert!(availability.zip_multiplying(0).is_err());
    /// ```
    pub fn zip_multiplying(&self, window: usize) -> Result<DayVector, ScoringError> {
        if window == 0 {
            return Err(ScoringError::invalid("window size must be positive"));
        }

        Ok(DayVector(
            self.0
                .windows(window)
                .map(|values| values.iter().product())
                .collect(),
        ))
    }

    /// Joins days end to end into a single timeline.
    pub fn concat<I>(days: I) -> DayVector
    where
        I: IntoIterator<Item = DayVector>,
    {
        DayVector(days.into_iter().flat_map(|day| day.0).collect())
    }
}

pub trait Compose {
    fn multiply_all(self, size: usize) -> Result<DayVector, ScoringError>;
    fn add_all(self, size: usize) -> Result<DayVector, ScoringError>;
}

impl<T> Compose for T
where
    T: Iterator<Item = DayVector>,
{
    /// Product of every mask, `ones(size)` when there are none
    fn multiply_all(self, size: usize) -> Result<DayVector, ScoringError> {
        self.fold(Ok(DayVector::ones(size)), |acc, mask| {
            acc.and_then(|acc| acc.multiply(&mask))
        })
    }

    /// Sum of every contribution, `zeroes(size)` when there are none
    fn add_all(self, size: usize) -> Result<DayVector, ScoringError> {
        self.fold(Ok(DayVector::zeroes(size)), |acc, heat| {
            acc.and_then(|acc| acc.add(&heat))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const N: usize = 96;

    fn day_vector() -> impl Strategy<Value = DayVector> {
        prop::collection::vec(0.0_f64..=1.0, N).prop_map(DayVector::from)
    }

    proptest! {
        #[test]
        fn ones_is_the_multiplicative_identity(v in day_vector()) {
            prop_assert_eq!(v.multiply(&DayVector::ones(N)).unwrap(), v);
        }

        #[test]
        fn zeroes_is_the_additive_identity(v in day_vector()) {
            prop_assert_eq!(v.add(&DayVector::zeroes(N)).unwrap(), v);
        }

        #[test]
        fn zeroes_annihilates(v in day_vector()) {
            prop_assert_eq!(v.multiply(&DayVector::zeroes(N)).unwrap(), DayVector::zeroes(N));
        }

        #[test]
        fn normalize_is_idempotent(v in day_vector()) {
            prop_assume!(v.max() > 0.0);

            let once = v.normalize();
            prop_assert_eq!(once.max(), 1.0);
            prop_assert_eq!(once.normalize(), once);
        }

        #[test]
        fn window_scores_never_exceed_their_values(v in day_vector(), window in 1_usize..8) {
            let scores = v.zip_multiplying(window).unwrap();

            prop_assert_eq!(scores.len(), N - window + 1);
            for (i, score) in scores.iter().enumerate() {
                prop_assert!(v.as_slice()[i..i + window].iter().all(|x| *score <= *x));
            }
        }
    }

    #[test]
    fn mismatched_lengths_fail() {
        let short = DayVector::ones(24);
        let long = DayVector::ones(96);

        assert_eq!(
            short.add(&long),
            Err(ScoringError::DimensionMismatch {
                expected: 24,
                found: 96
            })
        );
        assert!(long.multiply(&short).is_err());
    }

    #[test]
    fn scalar_arguments_are_checked() {
        let v = DayVector::from(vec![0.2, 0.4]);

        assert_eq!(v.scalar_multiply(2.0).unwrap(), DayVector::from(vec![0.4, 0.8]));
        assert_eq!(v.scalar_multiply(0.0).unwrap(), DayVector::zeroes(2));
        assert!(v.scalar_multiply(-1.0).is_err());
        assert!(v.scalar_divide(0.0).is_err());
        assert!(v.scalar_divide(-2.0).is_err());
        assert!(v.scalar_divide(f64::NAN).is_err());
    }

    #[test]
    fn folds_compose_masks() {
        let masks = vec![
            DayVector::from(vec![1.0, 0.5]),
            DayVector::from(vec![0.5, 0.5]),
        ];

        assert_eq!(
            masks.clone().into_iter().multiply_all(2).unwrap(),
            DayVector::from(vec![0.5, 0.25])
        );
        assert_eq!(
            masks.into_iter().add_all(2).unwrap(),
            DayVector::from(vec![1.5, 1.0])
        );
        assert_eq!(
            std::iter::empty::<DayVector>().multiply_all(3).unwrap(),
            DayVector::ones(3)
        );
    }

    #[test]
    fn concat_keeps_day_order() {
        let timeline = DayVector::concat(vec![DayVector::zeroes(2), DayVector::ones(2)]);

        assert_eq!(timeline, DayVector::from(vec![0.0, 0.0, 1.0, 1.0]));
    }
}
