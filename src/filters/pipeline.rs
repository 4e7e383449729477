//! The delay filter pipeline: taper, weight operator, forward transform and domain selection.
//!
//! ```text
//! data --W--> weighted --* taper--> FFT --+--> fftshift                -> delay output
//!                                         +--> IFFT / taper            -> frequency output
//! ```

use crate::config::{FilterSettings, OutputDomain, WeightsMode};
use crate::data::{check_length, channel_spacing, BatchOutput, FilterOutput};
use crate::error::{DelayFilterError, Result};
use crate::filters::cache::FilterMatrixCache;
use crate::filters::filter_matrix::{zero_flagged, FilterMatrix, FilterMatrixParams};
use crate::math_tools::{delay_axis, fft_shift, normalize_power, NamedWindows, WindowGenerator};
use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering::Relaxed};
use std::sync::{Arc, RwLock};

/// Forward and inverse plans for one transform length.
struct Transforms {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl Transforms {
    fn new(nf: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Transforms {
            forward: planner.plan_fft_forward(nf),
            inverse: planner.plan_fft_inverse(nf),
        }
    }
}

/// Applies delay filters to spectra.
///
/// The pipeline owns two collaborators: the filter matrix cache (the process-wide cache
/// unless another one is injected) and the generator that resolves taper names.
///
/// **Example**:
/// ```rust
/// use delay_filter::{DelayFilter, DelayPatch, FilterSettings};
/// use ndarray::Array1;
/// use num_complex::Complex64;
///
/// let frequencies = Array1::linspace(100.0, 107.0, 8);
/// let data = Array1::from_elem(8, Complex64::new(1.0, 0.0));
/// let flags = vec![false; 8];
/// let settings = FilterSettings::default()
///     .with_patches(vec![DelayPatch::new(0.0, 0.1)])
///     .with_filter_factor(1e-6);
///
/// let output = DelayFilter::new()
///     .run(&frequencies, &data, &flags, &settings)
///     .unwrap();
/// assert_eq!(output.axis.len(), 8);
/// ```
#[derive(Clone)]
pub struct DelayFilter {
    cache: Arc<FilterMatrixCache>,
    windows: Arc<dyn WindowGenerator>,
}

impl Default for DelayFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayFilter {
    /// A pipeline using the process-wide cache and [`NamedWindows`].
    pub fn new() -> Self {
        Self::with_cache(FilterMatrixCache::global())
    }

    pub fn with_cache(cache: Arc<FilterMatrixCache>) -> Self {
        DelayFilter {
            cache,
            windows: Arc::new(NamedWindows),
        }
    }

    pub fn with_window_generator(mut self, windows: impl WindowGenerator + 'static) -> Self {
        self.windows = Arc::new(windows);
        self
    }

    pub fn cache(&self) -> &Arc<FilterMatrixCache> {
        &self.cache
    }

    /// Filters one spectrum.
    ///
    /// # Arguments
    /// - `frequencies`: Uniformly spaced channel frequencies, at least two.
    /// - `data`: Complex spectrum, one value per channel.
    /// - `flags`: One entry per channel, `true` marks a flagged channel.
    /// - `settings`: Filter parameters.
    ///
    /// # Returns
    /// The output axis and values. In the frequency domain the axis is `frequencies`, in the
    /// delay domain it is `(k - nf/2) / (df * nf)` and the values are shifted so that zero
    /// delay sits in the middle.
    ///
    /// # Notes
    /// Frequency output divides by the taper without a guard. Windows with exact zeros, like
    /// the periodic Hann window at its first sample, give non-finite values at those channels.
    pub fn run(
        &self,
        frequencies: &Array1<f64>,
        data: &Array1<Complex64>,
        flags: &[bool],
        settings: &FilterSettings,
    ) -> Result<FilterOutput> {
        let df = channel_spacing(frequencies, settings.spacing_rtol)?;
        let nf = frequencies.len();
        check_length("data", nf, data.len())?;
        check_length("flags", nf, flags.len())?;

        let taper = self.taper(&settings.taper, nf, settings.output_domain)?;
        let weights = self.weight_operator(nf, df, flags, settings)?;
        let transforms = Transforms::new(nf);
        let values = filter_spectrum(
            &weights,
            data.view(),
            &taper,
            settings.output_domain,
            &transforms,
        );

        Ok(FilterOutput {
            axis: output_axis(frequencies, df, settings.output_domain),
            values,
            domain: settings.output_domain,
        })
    }

    /// Filters every row of `data`, all sharing the axis `frequencies`, in parallel.
    ///
    /// `flags` holds one flag row per spectrum. Rows with the same flags share one filter
    /// matrix through the cache.
    ///
    /// # Arguments
    /// - `progress_lock`: Receives the fraction of finished rows, `None` once done.
    /// - `abort_flag`: Setting it skips the remaining rows and returns
    ///   [`DelayFilterError::Aborted`].
    pub fn run_batch(
        &self,
        frequencies: &Array1<f64>,
        data: &Array2<Complex64>,
        flags: &Array2<bool>,
        settings: &FilterSettings,
        progress_lock: &Arc<RwLock<Option<f32>>>,
        abort_flag: &AtomicBool,
    ) -> Result<BatchOutput> {
        let df = channel_spacing(frequencies, settings.spacing_rtol)?;
        let nf = frequencies.len();
        check_length("data rows", nf, data.ncols())?;
        check_length("flag rows", nf, flags.ncols())?;
        check_length("flags", data.nrows(), flags.nrows())?;

        let taper = self.taper(&settings.taper, nf, settings.output_domain)?;
        let transforms = Transforms::new(nf);
        let n_rows = data.nrows();
        let finished = AtomicUsize::new(0);

        if let Ok(mut p) = progress_lock.write() {
            *p = Some(0.0);
        }

        let rows: Vec<Result<Array1<Complex64>>> = (0..n_rows)
            .into_par_iter()
            .map(|r| {
                if abort_flag.load(Relaxed) {
                    return Err(DelayFilterError::Aborted);
                }
                let row_flags = flags.row(r).to_vec();
                let weights = self.weight_operator(nf, df, &row_flags, settings)?;
                let values = filter_spectrum(
                    &weights,
                    data.row(r),
                    &taper,
                    settings.output_domain,
                    &transforms,
                );
                let done = finished.fetch_add(1, Relaxed) + 1;
                raise_progress(progress_lock, done as f32 / n_rows as f32);
                Ok(values)
            })
            .collect();

        if let Ok(mut p) = progress_lock.write() {
            *p = None;
        }

        let mut values = Array2::<Complex64>::zeros((n_rows, nf));
        for (r, row) in rows.into_iter().enumerate() {
            values.row_mut(r).assign(&row?);
        }
        log::info!(
            "filtered {} spectra of {} channels ({} filter matrices cached)",
            n_rows,
            nf,
            self.cache.len()
        );

        Ok(BatchOutput {
            axis: output_axis(frequencies, df, settings.output_domain),
            values,
            domain: settings.output_domain,
        })
    }

    /// Power-normalized taper of length `nf`.
    fn taper(&self, name: &str, nf: usize, domain: OutputDomain) -> Result<Array1<f64>> {
        let mut taper = self.windows.generate(name, nf)?;
        if taper.len() != nf {
            return Err(DelayFilterError::WindowLength {
                name: name.to_string(),
                expected: nf,
                actual: taper.len(),
            });
        }
        normalize_power(&mut taper, name)?;
        if domain == OutputDomain::Frequency && taper.iter().any(|t| *t == 0.0) {
            log::warn!(
                "taper `{}` contains zeros, the frequency output will not be finite there",
                name
            );
        }
        Ok(taper)
    }

    fn weight_operator(
        &self,
        nf: usize,
        df: f64,
        flags: &[bool],
        settings: &FilterSettings,
    ) -> Result<Arc<FilterMatrix>> {
        match settings.weights {
            WeightsMode::Identity => {
                let mut identity = FilterMatrix::eye(nf);
                if settings.zero_flags {
                    zero_flagged(&mut identity, flags);
                }
                Ok(Arc::new(identity))
            }
            WeightsMode::Wtl => self.cache.get_or_build(&FilterMatrixParams {
                nf,
                df,
                patches: settings.patches.clone(),
                filter_factor: settings.filter_factor,
                flags: flags.to_vec(),
                zero_flags: settings.zero_flags,
                discrete: settings.discrete,
                pinv_rcond: settings.pinv_rcond,
            }),
        }
    }
}

/// Stores `fraction` unless a worker that finished later already stored a higher one.
fn raise_progress(progress_lock: &RwLock<Option<f32>>, fraction: f32) {
    if let Ok(mut p) = progress_lock.write() {
        if p.map_or(true, |old| old < fraction) {
            *p = Some(fraction);
        }
    }
}

fn output_axis(frequencies: &Array1<f64>, df: f64, domain: OutputDomain) -> Array1<f64> {
    match domain {
        OutputDomain::Frequency => frequencies.clone(),
        OutputDomain::Delay => delay_axis(frequencies.len(), df),
    }
}

fn filter_spectrum(
    weights: &FilterMatrix,
    data: ArrayView1<Complex64>,
    taper: &Array1<f64>,
    domain: OutputDomain,
    transforms: &Transforms,
) -> Array1<Complex64> {
    let weighted = weights.dot(&data);
    let mut buffer: Vec<Complex64> = weighted
        .iter()
        .zip(taper.iter())
        .map(|(w, t)| w * t)
        .collect();
    transforms.forward.process(&mut buffer);

    match domain {
        OutputDomain::Frequency => {
            transforms.inverse.process(&mut buffer);
            let scale = 1.0 / buffer.len() as f64;
            buffer
                .iter()
                .zip(taper.iter())
                .map(|(v, t)| v * scale / t)
                .collect()
        }
        OutputDomain::Delay => fft_shift(&Array1::from(buffer)),
    }
}

/// Filters one spectrum with the process-wide cache and the built-in windows.
///
/// See [`DelayFilter::run`].
pub fn delay_filter(
    frequencies: &Array1<f64>,
    data: &Array1<Complex64>,
    flags: &[bool],
    settings: &FilterSettings,
) -> Result<FilterOutput> {
    DelayFilter::new().run(frequencies, data, flags, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DelayPatch;
    use crate::math_tools::TaperWindow;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn frequencies(nf: usize) -> Array1<f64> {
        Array1::from_shape_fn(nf, |i| 100.0 + i as f64)
    }

    fn spectrum(nf: usize) -> Array1<Complex64> {
        Array1::from_shape_fn(nf, |i| {
            let x = i as f64;
            Complex64::new(1.0 + (0.3 * x).sin(), (0.7 * x).cos())
        })
    }

    fn tone(frequencies: &Array1<f64>, delay: f64) -> Array1<Complex64> {
        frequencies.mapv(|f| Complex64::from_polar(1.0, 2.0 * PI * f * delay))
    }

    fn dft(x: &Array1<Complex64>) -> Array1<Complex64> {
        let n = x.len();
        Array1::from_shape_fn(n, |m| {
            x.iter()
                .enumerate()
                .map(|(k, v)| v * Complex64::from_polar(1.0, -2.0 * PI * (k * m) as f64 / n as f64))
                .sum()
        })
    }

    fn assert_close(a: &Array1<Complex64>, b: &Array1<Complex64>, epsilon: f64) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(x.re, y.re, epsilon = epsilon);
            assert_abs_diff_eq!(x.im, y.im, epsilon = epsilon);
        }
    }

    fn index_of(axis: &Array1<f64>, delay: f64) -> usize {
        axis.iter()
            .position(|d| (d - delay).abs() < 1e-12)
            .expect("delay on the output axis")
    }

    fn private_filter() -> DelayFilter {
        DelayFilter::with_cache(Arc::new(FilterMatrixCache::new()))
    }

    #[test]
    fn test_identity_weights_equal_tapered_fourier_transform() {
        let nf = 16;
        let frequencies = frequencies(nf);
        let data = spectrum(nf);
        let settings = FilterSettings::default()
            .with_weights(WeightsMode::Identity)
            .with_zero_flags(false)
            .with_taper("hann");

        let output = private_filter()
            .run(&frequencies, &data, &[false; 16], &settings)
            .unwrap();

        let mut taper = TaperWindow::Hann.generate(nf);
        normalize_power(&mut taper, "hann").unwrap();
        let tapered = Array1::from_shape_fn(nf, |i| data[i] * taper[i]);
        let expected = fft_shift(&dft(&tapered));
        assert_close(&output.values, &expected, 1e-9);
        assert_eq!(output.axis, delay_axis(nf, 1.0));
        assert_eq!(output.domain, OutputDomain::Delay);
    }

    #[test]
    fn test_frequency_output_round_trips_input() {
        let nf = 12;
        let frequencies = frequencies(nf);
        let data = spectrum(nf);
        for taper in ["boxcar", "hamming", "triang"] {
            let settings = FilterSettings::default()
                .with_weights(WeightsMode::Identity)
                .with_zero_flags(false)
                .with_output_domain(OutputDomain::Frequency)
                .with_taper(taper);
            let output = private_filter()
                .run(&frequencies, &data, &[false; 12], &settings)
                .unwrap();
            assert_close(&output.values, &data, 1e-10);
            assert_eq!(output.axis, frequencies);
        }
    }

    #[test]
    fn test_flagged_channels_do_not_contribute() {
        let nf = 16;
        let frequencies = frequencies(nf);
        let mut flags = [false; 16];
        flags[1] = true;
        flags[9] = true;

        let data = spectrum(nf);
        let mut corrupted = data.clone();
        corrupted[1] = Complex64::new(1e6, -3e5);
        corrupted[9] = Complex64::new(-42.0, 17.0);

        for weights in [WeightsMode::Identity, WeightsMode::Wtl] {
            for domain in [OutputDomain::Delay, OutputDomain::Frequency] {
                let settings = FilterSettings::default()
                    .with_weights(weights)
                    .with_patches(vec![DelayPatch::new(0.0, 0.1)])
                    .with_filter_factor(1e-4)
                    .with_output_domain(domain);
                let filter = private_filter();
                let clean = filter.run(&frequencies, &data, &flags, &settings).unwrap();
                let dirty = filter
                    .run(&frequencies, &corrupted, &flags, &settings)
                    .unwrap();
                assert_close(&clean.values, &dirty.values, 1e-12);
            }
        }

        let settings = FilterSettings::default()
            .with_weights(WeightsMode::Identity)
            .with_output_domain(OutputDomain::Frequency);
        let output = private_filter()
            .run(&frequencies, &corrupted, &flags, &settings)
            .unwrap();
        assert!(output.values[1].norm() < 1e-12);
        assert!(output.values[9].norm() < 1e-12);
    }

    #[test]
    fn test_patch_covering_all_delays_suppresses_everything() {
        // 100..107 MHz, df = 1: the delay range is [-0.5, 0.5) and the patch (0, 2) covers it
        let frequencies = frequencies(8);
        let data = tone(&frequencies, 0.25);
        let settings = FilterSettings::default()
            .with_patches(vec![DelayPatch::new(0.0, 2.0)])
            .with_filter_factor(1e-6);

        let output = private_filter()
            .run(&frequencies, &data, &[false; 8], &settings)
            .unwrap();
        let unfiltered = private_filter()
            .run(
                &frequencies,
                &data,
                &[false; 8],
                &settings.clone().with_weights(WeightsMode::Identity),
            )
            .unwrap();

        assert_abs_diff_eq!(unfiltered.values[index_of(&unfiltered.axis, 0.25)].norm(), 8.0, epsilon = 1e-9);
        for value in output.values.iter() {
            assert!(value.norm() < 8.0 * 1e-5);
        }
    }

    #[test]
    fn test_patch_suppresses_inside_and_passes_outside() {
        let nf = 64;
        let frequencies = frequencies(nf);
        let settings = FilterSettings::default()
            .with_patches(vec![DelayPatch::new(0.0, 0.1)])
            .with_filter_factor(1e-6);
        let filter = private_filter();

        let response = |delay: f64| {
            let data = tone(&frequencies, delay);
            let output = filter
                .run(&frequencies, &data, &[false; 64], &settings)
                .unwrap();
            let index = index_of(&output.axis, delay);
            output.values[index].norm() / nf as f64
        };

        for delay in [0.0, 1.0 / 64.0, 3.0 / 64.0] {
            assert!(response(delay) < 1e-5, "delay {delay} not suppressed");
        }
        for delay in [0.3125, -0.3125] {
            assert!(response(delay) > 0.9, "delay {delay} attenuated");
        }
        assert_eq!(filter.cache().build_count(), 1);
    }

    #[test]
    fn test_discrete_mode_suppresses_relative_to_floor() {
        let nf = 16;
        let frequencies = frequencies(nf);
        let data = &tone(&frequencies, 1.0 / 16.0) + &tone(&frequencies, 5.0 / 16.0);
        let settings = FilterSettings::default()
            .with_patches(vec![DelayPatch::new(0.0, 0.2)])
            .with_filter_factor(1e-6)
            .with_discrete(true);

        let output = private_filter()
            .run(&frequencies, &data, &[false; 16], &settings)
            .unwrap();
        let inside = output.values[index_of(&output.axis, 1.0 / 16.0)].norm();
        let outside = output.values[index_of(&output.axis, 5.0 / 16.0)].norm();
        assert!(inside / outside < 1e-5);
    }

    #[test]
    fn test_cached_matrix_is_reused_across_runs() {
        let nf = 8;
        let frequencies = frequencies(nf);
        let settings = FilterSettings::default().with_patches(vec![DelayPatch::new(0.0, 0.1)]);
        let filter = private_filter();
        let first = filter
            .run(&frequencies, &spectrum(nf), &[false; 8], &settings)
            .unwrap();
        let second = filter
            .run(&frequencies, &spectrum(nf), &[false; 8], &settings)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(filter.cache().build_count(), 1);
    }

    #[test]
    fn test_zero_in_taper_gives_non_finite_frequency_output() {
        let nf = 8;
        let settings = FilterSettings::default()
            .with_weights(WeightsMode::Identity)
            .with_output_domain(OutputDomain::Frequency)
            .with_taper("hann");
        let output = private_filter()
            .run(&frequencies(nf), &spectrum(nf), &[false; 8], &settings)
            .unwrap();
        assert!(!output.values[0].re.is_finite() || !output.values[0].im.is_finite());
        assert!(output.values[1].re.is_finite());
    }

    #[test]
    fn test_injected_window_generator() {
        let nf = 8;
        let frequencies = frequencies(nf);
        let constant = |_: &str, len: usize| -> Result<Array1<f64>> { Ok(Array1::from_elem(len, 3.0)) };
        let settings = FilterSettings::default()
            .with_weights(WeightsMode::Identity)
            .with_taper("constant");
        let injected = private_filter()
            .with_window_generator(constant)
            .run(&frequencies, &spectrum(nf), &[false; 8], &settings)
            .unwrap();
        let boxcar = private_filter()
            .run(
                &frequencies,
                &spectrum(nf),
                &[false; 8],
                &settings.clone().with_taper("boxcar"),
            )
            .unwrap();
        assert_close(&injected.values, &boxcar.values, 1e-12);

        let short = |_: &str, len: usize| -> Result<Array1<f64>> { Ok(Array1::ones(len - 1)) };
        assert_eq!(
            private_filter()
                .with_window_generator(short)
                .run(&frequencies, &spectrum(nf), &[false; 8], &settings)
                .unwrap_err(),
            DelayFilterError::WindowLength {
                name: "constant".to_string(),
                expected: 8,
                actual: 7
            }
        );
    }

    #[test]
    fn test_configuration_errors() {
        let filter = private_filter();
        let settings = FilterSettings::default();
        let frequencies = frequencies(8);

        assert_eq!(
            filter
                .run(&Array1::zeros(0), &Array1::zeros(0), &[], &settings)
                .unwrap_err(),
            DelayFilterError::EmptyFrequencyAxis
        );
        assert_eq!(
            filter
                .run(&frequencies, &spectrum(7), &[false; 8], &settings)
                .unwrap_err(),
            DelayFilterError::LengthMismatch {
                what: "data",
                expected: 8,
                actual: 7
            }
        );
        assert_eq!(
            filter
                .run(&frequencies, &spectrum(8), &[false; 6], &settings)
                .unwrap_err(),
            DelayFilterError::LengthMismatch {
                what: "flags",
                expected: 8,
                actual: 6
            }
        );
        let uneven = Array1::from(vec![0.0, 1.0, 2.0, 3.0, 5.0, 6.0, 7.0, 8.0]);
        assert!(matches!(
            filter.run(&uneven, &spectrum(8), &[false; 8], &settings),
            Err(DelayFilterError::NonUniformAxis { index: 3, .. })
        ));
        assert_eq!(
            filter
                .run(
                    &frequencies,
                    &spectrum(8),
                    &[false; 8],
                    &settings.clone().with_taper("gaussian")
                )
                .unwrap_err(),
            DelayFilterError::UnknownWindow("gaussian".to_string())
        );
        assert_eq!(filter.cache().build_count(), 0);
    }

    #[test]
    fn test_batch_matches_single_runs_and_shares_matrices() {
        let nf = 16;
        let frequencies = frequencies(nf);
        let data = Array2::from_shape_fn((4, nf), |(r, i)| {
            spectrum(nf)[i] * Complex64::new(1.0 + r as f64, 0.5 * r as f64)
        });
        let mut flags = Array2::from_elem((4, nf), false);
        flags[[1, 3]] = true;
        flags[[3, 3]] = true;
        let settings = FilterSettings::default()
            .with_patches(vec![DelayPatch::new(0.1, 0.05)])
            .with_filter_factor(1e-5);

        let filter = private_filter();
        let progress = Arc::new(RwLock::new(None));
        let abort = AtomicBool::new(false);
        let batch = filter
            .run_batch(&frequencies, &data, &flags, &settings, &progress, &abort)
            .unwrap();

        assert_eq!(filter.cache().build_count(), 2);
        assert_eq!(*progress.read().unwrap(), None);
        assert_eq!(batch.values.dim(), (4, nf));
        assert_eq!(batch.axis, delay_axis(nf, 1.0));

        for r in 0..4 {
            let row_flags = flags.row(r).to_vec();
            let single = filter
                .run(&frequencies, &data.row(r).to_owned(), &row_flags, &settings)
                .unwrap();
            assert_close(&batch.values.row(r).to_owned(), &single.values, 1e-12);
        }
    }

    #[test]
    fn test_progress_never_decreases() {
        let progress = RwLock::new(Some(0.0));
        raise_progress(&progress, 0.75);
        raise_progress(&progress, 0.5);
        assert_eq!(*progress.read().unwrap(), Some(0.75));
        raise_progress(&progress, 1.0);
        assert_eq!(*progress.read().unwrap(), Some(1.0));

        let unset = RwLock::new(None);
        raise_progress(&unset, 0.25);
        assert_eq!(*unset.read().unwrap(), Some(0.25));
    }

    #[test]
    fn test_aborted_batch() {
        let nf = 8;
        let frequencies = frequencies(nf);
        let data = Array2::from_elem((3, nf), Complex64::new(1.0, 0.0));
        let flags = Array2::from_elem((3, nf), false);
        let progress = Arc::new(RwLock::new(None));
        let abort = AtomicBool::new(true);

        let filter = private_filter();
        let result = filter.run_batch(
            &frequencies,
            &data,
            &flags,
            &FilterSettings::default(),
            &progress,
            &abort,
        );
        assert_eq!(result.unwrap_err(), DelayFilterError::Aborted);
        assert_eq!(filter.cache().build_count(), 0);
        assert_eq!(*progress.read().unwrap(), None);
    }

    #[test]
    fn test_batch_rejects_mismatched_flags() {
        let frequencies = frequencies(8);
        let data = Array2::from_elem((3, 8), Complex64::new(1.0, 0.0));
        let flags = Array2::from_elem((2, 8), false);
        let progress = Arc::new(RwLock::new(None));
        let abort = AtomicBool::new(false);
        assert_eq!(
            private_filter()
                .run_batch(
                    &frequencies,
                    &data,
                    &flags,
                    &FilterSettings::default(),
                    &progress,
                    &abort
                )
                .unwrap_err(),
            DelayFilterError::LengthMismatch {
                what: "flags",
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_convenience_entry_point_uses_global_cache() {
        let nf = 10;
        let settings = FilterSettings::default()
            .with_patches(vec![DelayPatch::new(0.0, 0.123)])
            .with_filter_factor(3.21e-4);
        let output = delay_filter(&frequencies(nf), &spectrum(nf), &[false; 10], &settings).unwrap();
        assert_eq!(output.values.len(), nf);

        let params = FilterMatrixParams {
            nf,
            df: 1.0,
            patches: settings.patches.clone(),
            filter_factor: settings.filter_factor,
            flags: vec![false; nf],
            zero_flags: settings.zero_flags,
            discrete: false,
            pinv_rcond: None,
        };
        assert!(FilterMatrixCache::global().get(&params).is_some());
    }
}
