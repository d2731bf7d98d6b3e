//! VARCHAR width adjustment stages.
//!
//! Stages run in a fixed order: padding, optional step rounding, force-max,
//! truncation, validation. Widths are byte lengths.

use crate::error::{DdlError, DdlResult};

/// Largest VARCHAR Redshift accepts, in bytes.
pub const VARCHAR_MAX: usize = 65535;

/// Rounding targets for [`round_widths_to_steps`], smallest first.
pub const VARCHAR_STEPS: &[usize] = &[32, 64, 128, 256, 512, 1024, 4096, 8192, 16384];

/// `floor(width + width * padding)` for every column.
pub fn pad_widths(widths: &mut [usize], padding: f64) -> DdlResult<()> {
    if !padding.is_finite() {
        return Err(DdlError::InvalidPadding(padding));
    }
    for width in widths.iter_mut() {
        let base = *width as f64;
        // `as` saturates, so negative padding bottoms out at zero.
        *width = (base + base * padding).floor() as usize;
    }
    Ok(())
}

/// First step more than twice `width`, else [`VARCHAR_MAX`].
pub fn round_to_step(width: usize) -> usize {
    VARCHAR_STEPS
        .iter()
        .copied()
        .find(|step| width.saturating_mul(2) < *step)
        .unwrap_or(VARCHAR_MAX)
}

pub fn round_widths_to_steps(widths: &mut [usize]) {
    for width in widths.iter_mut() {
        *width = round_to_step(*width);
    }
}

/// Sets the named columns to [`VARCHAR_MAX`]. Fails on the first name that
/// is not a header, leaving earlier columns already widened.
pub fn force_max_widths<S>(widths: &mut [usize], headers: &[String], columns: &[S]) -> DdlResult<()>
where
    S: AsRef<str>,
{
    for column in columns {
        let column = column.as_ref();
        let idx = headers
            .iter()
            .position(|header| header == column)
            .ok_or_else(|| DdlError::ColumnNotFound(column.to_string()))?;
        widths[idx] = VARCHAR_MAX;
    }
    Ok(())
}

pub fn truncate_widths(widths: &mut [usize]) {
    for width in widths.iter_mut() {
        *width = (*width).min(VARCHAR_MAX);
    }
}

/// Redshift rejects `varchar(0)`.
pub fn validate_widths(widths: &mut [usize]) {
    for width in widths.iter_mut() {
        if *width == 0 {
            *width = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn padding_floors_the_padded_width() {
        let mut widths = vec![0, 1, 10, 7];
        pad_widths(&mut widths, 0.25).expect("pad");
        assert_eq!(widths, vec![0, 1, 12, 8]);
    }

    #[test]
    fn padding_rejects_non_finite_fractions() {
        let mut widths = vec![3];
        assert_eq!(
            pad_widths(&mut widths, f64::NAN).unwrap_err().to_string(),
            "Padding must be a finite number, got NaN"
        );
        assert_eq!(widths, vec![3]);
    }

    #[test]
    fn steps_leave_headroom() {
        assert_eq!(round_to_step(0), 32);
        assert_eq!(round_to_step(15), 32);
        assert_eq!(round_to_step(16), 64);
        assert_eq!(round_to_step(600), 4096);
        assert_eq!(round_to_step(8192), VARCHAR_MAX);
    }

    #[test]
    fn force_max_widens_named_columns() {
        let mut widths = vec![5, 6, 7];
        force_max_widths(&mut widths, &headers(&["a", "b", "c"]), &["c", "a"]).expect("force");
        assert_eq!(widths, vec![VARCHAR_MAX, 6, VARCHAR_MAX]);
    }

    #[test]
    fn force_max_reports_unknown_columns() {
        let mut widths = vec![5];
        let err = force_max_widths(&mut widths, &headers(&["name"]), &["id"]).unwrap_err();
        assert_eq!(err, DdlError::ColumnNotFound("id".to_string()));
    }

    #[test]
    fn truncate_and_validate_bound_widths() {
        let mut widths = vec![0, 70000, VARCHAR_MAX, 12];
        truncate_widths(&mut widths);
        validate_widths(&mut widths);
        assert_eq!(widths, vec![1, VARCHAR_MAX, VARCHAR_MAX, 12]);
    }

    proptest! {
        #[test]
        fn truncated_and_validated_widths_stay_in_range(
            mut widths in proptest::collection::vec(0usize..200_000, 0..20),
            padding in 0.0f64..3.0,
        ) {
            pad_widths(&mut widths, padding).expect("pad");
            truncate_widths(&mut widths);
            validate_widths(&mut widths);
            for width in widths {
                prop_assert!((1..=VARCHAR_MAX).contains(&width));
            }
        }
    }
}
