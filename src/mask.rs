use crate::config::SuggestionConfig;
use crate::data::{Block, ScoringError, WorkingDay};
use crate::time::{local_midnight, Resolution, TimeRange};
use crate::vector::{Compose, DayVector};
use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shape of a smoothed edge, mapping `[0, 1]` onto `[0, 1]`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Kernel {
    Linear,
    Parabolic,
    #[default]
    Sigmoid,
}

impl Kernel {
    /// # Examples
    /// ```
    /// use zeitplan_slots::Kernel;
    ///
    /// for kernel in [Kernel::Linear, Kernel::Parabolic, Kernel::Sigmoid] {
    ///     assert!(kernel.apply(0.0).abs() < 1e-12);
    ///     assert!((kernel.apply(1.0) - 1.0).abs() < 1e-12);
    /// }
    /// assert_eq!(Kernel::Sigmoid.apply(0.5), 0.5);
    /// assert_eq!(Kernel::Parabolic.apply(0.5), 0.25);
    /// ```
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Kernel::Linear => x,
            Kernel::Parabolic => x * x,
            Kernel::Sigmoid => 0.5 / 1.0_f64.tanh() * (2.0 * x - 1.0).tanh() + 0.5,
        }
    }
}

/// How far a smoothed edge reaches, in intervals, measured from an edge of the
/// masked range: `outward` (<= 0) reaches outside the range, `inward` (>= 0)
/// reaches inside it. `SlopeRange(0, 0)` is a cliff.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct SlopeRange(pub i32, pub i32);

impl SlopeRange {
    pub fn new(outward: i32, inward: i32) -> SlopeRange {
        SlopeRange(outward, inward)
    }

    pub fn outward(self) -> i64 {
        i64::from(self.0)
    }

    pub fn inward(self) -> i64 {
        i64::from(self.1)
    }

    pub fn validate(self) -> Result<(), ScoringError> {
        if self.0 <= 0 && 0 <= self.1 {
            Ok(())
        } else {
            Err(ScoringError::invalid(format!(
                "slope range ({}, {}) must straddle its boundary",
                self.0, self.1
            )))
        }
    }

    /// Narrows the slope so that the edges of `range` that lie inside a day of
    /// `size` intervals stay inside it. Edges sitting on midnight are left
    /// open and do not constrain the slope.
    pub fn fit(self, range: TimeRange, size: usize) -> SlopeRange {
        let (start, end, size) = (range.start() as i64, range.end() as i64, size as i64);
        let (mut outward, mut inward) = (self.outward(), self.inward());

        if start > 0 {
            outward = outward.max(-start);
            inward = inward.min(size - start);
        }
        if end < size {
            outward = outward.max(end - size);
            inward = inward.min(end);
        }

        SlopeRange(outward as i32, inward as i32)
    }

    /// Share of the inside value at `offset` intervals from an edge, where 0 is
    /// the first (or last) interval inside the range.
    fn weight(self, offset: i64, kernel: Kernel) -> f64 {
        let (outward, inward) = (self.outward(), self.inward());

        if offset >= inward {
            1.0
        } else if offset <= outward {
            0.0
        } else {
            kernel.apply((offset - outward) as f64 / (inward - outward) as f64)
        }
    }
}

fn check_range(size: usize, range: TimeRange) -> Result<(), ScoringError> {
    if range.end() <= range.start() {
        Err(ScoringError::invalid(format!(
            "range end {} must be after its start {}",
            range.end(),
            range.start()
        )))
    } else if range.end() > size {
        Err(ScoringError::invalid(format!(
            "range end {} is past the end of a {} interval day",
            range.end(),
            size
        )))
    } else {
        Ok(())
    }
}

/// `inside` on `range`, `outside` everywhere else.
pub fn cliff_mask(
    size: usize,
    range: TimeRange,
    inside: f64,
    outside: f64,
) -> Result<DayVector, ScoringError> {
    check_range(size, range)?;

    Ok(DayVector::from(
        (0..size)
            .map(|i| if range.contains(i) { inside } else { outside })
            .collect::<Vec<_>>(),
    ))
}

/// `inside` on `range`, `outside` everywhere else, with both edges smoothed by
/// `kernel` over `slope`.
///
/// # Errors
/// Fails with `InvalidArgument` if the range is empty or past the end of the
/// day, if `slope` does not straddle zero, or if either smoothed edge would
/// reach outside the day.
///
/// # Examples
/// ```
/// use zeitplan_slots::{slope_mask, Kernel, SlopeRange};
/// use zeitplan_slots::time::TimeRange;
///
/// let mask = slope_mask(8, TimeRange::new(2, 6), SlopeRange::new(-1, 1), Kernel::Linear, 1.0, 0.0)
///     .unwrap();
/// assert_eq!(mask.as_slice(), &[0.0, 0.0, 0.5, 1.0, 1.0, 0.5, 0.0, 0.0]);
///
/// assert!(slope_mask(8, TimeRange::new(0, 6), SlopeRange::new(-1, 1), Kernel::Linear, 1.0, 0.0)
///     .is_err());
/// ```
pub fn slope_mask(
    size: usize,
    range: TimeRange,
    slope: SlopeRange,
    kernel: Kernel,
    inside: f64,
    outside: f64,
) -> Result<DayVector, ScoringError> {
    check_range(size, range)?;
    slope.validate()?;

    let (start, end) = (range.start() as i64, range.end() as i64);
    let day = size as i64;

    if start + slope.outward() < 0
        || start + slope.inward() > day
        || end - slope.inward() < 0
        || end - slope.outward() > day
    {
        return Err(ScoringError::invalid(format!(
            "slope ({}, {}) around [{}, {}) leaves the day",
            slope.0, slope.1, start, end
        )));
    }

    Ok(taper(size, range, slope, kernel, (inside, outside), (true, true)))
}

/// Builds the mask without validating it. `smoothed` says which of the two
/// edges carry a slope; an unsmoothed edge continues the range past it.
fn taper(
    size: usize,
    range: TimeRange,
    slope: SlopeRange,
    kernel: Kernel,
    (inside, outside): (f64, f64),
    smoothed: (bool, bool),
) -> DayVector {
    let (start, end) = (range.start() as i64, range.end() as i64);

    DayVector::from(
        (0..size as i64)
            .map(|i| {
                let from_start = if smoothed.0 {
                    slope.weight(i - start, kernel)
                } else if i >= start {
                    1.0
                } else {
                    0.0
                };
                let from_end = if smoothed.1 {
                    slope.weight(end - 1 - i, kernel)
                } else if i < end {
                    1.0
                } else {
                    0.0
                };
                let weight = from_start * from_end;

                if weight >= 1.0 {
                    inside
                } else if weight <= 0.0 {
                    outside
                } else {
                    outside + (inside - outside) * weight
                }
            })
            .collect::<Vec<_>>(),
    )
}

/// Smooths only the edges of `range` that fall inside the day, narrowing the
/// slope until they fit. Ranges running into midnight keep going.
fn fitted_mask(
    size: usize,
    range: TimeRange,
    slope: SlopeRange,
    kernel: Kernel,
    values: (f64, f64),
) -> Result<DayVector, ScoringError> {
    check_range(size, range)?;
    slope.validate()?;

    Ok(taper(
        size,
        range,
        slope.fit(range, size),
        kernel,
        values,
        (range.start() > 0, range.end() < size),
    ))
}

/// 1 inside working hours with tapered edges, 0 outside.
///
/// # Examples
/// ```
/// use chrono::NaiveTime;
/// use zeitplan_slots::{working_hour_mask, SuggestionConfig, WorkingDay};
///
/// let config = SuggestionConfig::default();
/// let day = WorkingDay::Hours {
///     start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
/// };
/// let mask = working_hour_mask(&day, &config).unwrap();
///
/// assert_eq!(mask.get(12 * 4), Some(1.0));
/// assert_eq!(mask.get(3 * 4), Some(0.0));
/// assert_eq!(mask.get(9 * 4), Some(0.5));
/// ```
pub fn working_hour_mask(
    day: &WorkingDay,
    config: &SuggestionConfig,
) -> Result<DayVector, ScoringError> {
    let resolution = config.resolution()?;
    let size = resolution.size();

    match *day {
        WorkingDay::Off => Ok(DayVector::zeroes(size)),
        WorkingDay::AllDay => Ok(DayVector::ones(size)),
        WorkingDay::Hours { start, end } => {
            let ends_at_midnight = end == NaiveTime::default();
            if !ends_at_midnight && end <= start {
                return Err(ScoringError::invalid(format!(
                    "working hours end at {} before they start at {}",
                    end, start
                )));
            }

            let range = TimeRange::new(
                resolution.time_ceil_index(start),
                if ends_at_midnight {
                    size
                } else {
                    resolution.time_floor_index(end)
                },
            );

            if range.is_empty() {
                return Ok(DayVector::zeroes(size));
            }

            fitted_mask(
                size,
                range,
                config.working_hours_slope,
                config.kernel,
                (1.0, 0.0),
            )
        }
    }
}

/// 0 on the intervals a block touches, 1 elsewhere, tapered on the way in and
/// out. A missing range leaves the day untouched.
pub fn block_mask(
    range: Option<TimeRange>,
    config: &SuggestionConfig,
) -> Result<DayVector, ScoringError> {
    let size = config.resolution()?.size();

    match range {
        None => Ok(DayVector::ones(size)),
        Some(range) => fitted_mask(size, range, config.block_slope, config.kernel, (0.0, 1.0)),
    }
}

/// Closes every interval that begins before `time`.
pub fn start_time_mask(time: NaiveTime, resolution: Resolution) -> Result<DayVector, ScoringError> {
    let size = resolution.size();

    match resolution.time_ceil_index(time) {
        0 => Ok(DayVector::ones(size)),
        index if index >= size => Ok(DayVector::zeroes(size)),
        index => cliff_mask(size, TimeRange::new(index, size), 1.0, 0.0),
    }
}

/// Closes every interval that ends after `time`.
pub fn end_time_mask(time: NaiveTime, resolution: Resolution) -> Result<DayVector, ScoringError> {
    let size = resolution.size();

    match resolution.time_floor_index(time) {
        0 => Ok(DayVector::zeroes(size)),
        index => cliff_mask(size, TimeRange::new(0, index), 1.0, 0.0),
    }
}

/// Additive busyness contributed by one historical block.
pub fn block_heat(
    range: TimeRange,
    resolution: Resolution,
    weight: f64,
) -> Result<DayVector, ScoringError> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(ScoringError::invalid(format!(
            "block heat weight {} must be a non-negative number",
            weight
        )));
    }

    cliff_mask(resolution.size(), range, weight, 0.0)
}

/// Anything that can be expressed as an availability mask over one local date.
pub trait Masked {
    fn mask(
        &self,
        date: NaiveDate,
        tz: &Tz,
        config: &SuggestionConfig,
    ) -> Result<DayVector, ScoringError>;
}

impl Masked for WorkingDay {
    fn mask(
        &self,
        _date: NaiveDate,
        _tz: &Tz,
        config: &SuggestionConfig,
    ) -> Result<DayVector, ScoringError> {
        working_hour_mask(self, config)
    }
}

impl Masked for Block {
    fn mask(
        &self,
        date: NaiveDate,
        tz: &Tz,
        config: &SuggestionConfig,
    ) -> Result<DayVector, ScoringError> {
        if !self.is_busy() {
            return block_mask(None, config);
        }

        let day_start = local_midnight(date, tz)?;
        block_mask(
            TimeRange::within_day(day_start, self.start, self.end, config.resolution()?),
            config,
        )
    }
}

impl Masked for [Block] {
    /// Product of every block's mask
    fn mask(
        &self,
        date: NaiveDate,
        tz: &Tz,
        config: &SuggestionConfig,
    ) -> Result<DayVector, ScoringError> {
        self.iter()
            .map(|block| block.mask(date, tz, config))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .multiply_all(config.resolution()?.size())
    }
}
