use alloc::vec;
use alloc::vec::Vec;
use core::mem;
use core::ops::Range;

use sparsify_matrix::sparse::{CscMatrix, CsrMatrix, SparseView, extract_csc, extract_csr};
use sparsify_matrix::{ColumnSlices, SparseFormat, SparsityPattern};
use sparsify_maybe_rayon::install;
use sparsify_maybe_rayon::prelude::*;
use tracing::{debug, instrument};

use crate::config::ApproxConfig;
use crate::dot::dot;
use crate::error::{ApproxError, ApproxResult};

/// Compute `dot(X[:, row], Y[:, col])` for every nonzero `(row, col)` of `pattern`.
///
/// The result has one value per entry of `pattern.inner_index`, in the same order. For
/// [`SparseFormat::Csr`] the pointer array runs over rows and inner indices are columns; for
/// [`SparseFormat::Csc`] it is the other way around. `n_threads == 0` uses the current pool.
///
/// Every shape check happens before any work is dispatched, so on error nothing was computed.
pub fn approximate<X, Y>(
    pattern: &SparsityPattern<'_>,
    x: &X,
    y: &Y,
    format: SparseFormat,
    n_threads: usize,
) -> ApproxResult<Vec<f64>>
where
    X: ColumnSlices<f64> + Sync,
    Y: ColumnSlices<f64> + Sync,
{
    approximate_with_config(pattern, x, y, format, &ApproxConfig::new(n_threads))
}

/// [`approximate`] for hosts that pass the format as its integer code (CSC = 1, CSR = 2).
pub fn approximate_raw<X, Y>(
    pattern: &SparsityPattern<'_>,
    x: &X,
    y: &Y,
    format_code: i32,
    n_threads: usize,
) -> ApproxResult<Vec<f64>>
where
    X: ColumnSlices<f64> + Sync,
    Y: ColumnSlices<f64> + Sync,
{
    let format = SparseFormat::try_from(format_code)?;
    approximate(pattern, x, y, format, n_threads)
}

/// [`approximate`] over the pattern and format of an extracted sparse view.
pub fn approximate_view<V, T, X, Y>(
    view: &V,
    x: &X,
    y: &Y,
    n_threads: usize,
) -> ApproxResult<Vec<f64>>
where
    V: SparseView<T>,
    X: ColumnSlices<f64> + Sync,
    Y: ColumnSlices<f64> + Sync,
{
    approximate(&view.pattern(), x, y, view.format(), n_threads)
}

/// A copy of `template` whose values are replaced by the approximated ones.
pub fn approximate_like_csr<T, X, Y>(
    template: &CsrMatrix<T>,
    x: &X,
    y: &Y,
    n_threads: usize,
) -> ApproxResult<CsrMatrix<f64>>
where
    X: ColumnSlices<f64> + Sync,
    Y: ColumnSlices<f64> + Sync,
{
    let values = approximate_view(&extract_csr(template)?, x, y, n_threads)?;
    Ok(template.with_values(values)?)
}

/// A copy of `template` whose values are replaced by the approximated ones.
pub fn approximate_like_csc<T, X, Y>(
    template: &CscMatrix<T>,
    x: &X,
    y: &Y,
    n_threads: usize,
) -> ApproxResult<CscMatrix<f64>>
where
    X: ColumnSlices<f64> + Sync,
    Y: ColumnSlices<f64> + Sync,
{
    let values = approximate_view(&extract_csc(template)?, x, y, n_threads)?;
    Ok(template.with_values(values)?)
}

#[instrument(
    level = "debug",
    skip_all,
    fields(
        format = %format,
        nnz = pattern.nnz(),
        latent = x.height(),
        n_threads = config.n_threads,
    )
)]
pub fn approximate_with_config<X, Y>(
    pattern: &SparsityPattern<'_>,
    x: &X,
    y: &Y,
    format: SparseFormat,
    config: &ApproxConfig,
) -> ApproxResult<Vec<f64>>
where
    X: ColumnSlices<f64> + Sync,
    Y: ColumnSlices<f64> + Sync,
{
    check_shapes(pattern, x, y, format)?;

    let mut out = vec![0.0; pattern.nnz()];
    // A CSC pattern is the CSR pattern of the transpose, with the factors trading places.
    match format {
        SparseFormat::Csr => fill_rows(pattern, x, y, config, &mut out)?,
        SparseFormat::Csc => fill_rows(&pattern.transposed(), y, x, config, &mut out)?,
    }
    Ok(out)
}

fn check_shapes<X, Y>(
    pattern: &SparsityPattern<'_>,
    x: &X,
    y: &Y,
    format: SparseFormat,
) -> ApproxResult<()>
where
    X: ColumnSlices<f64>,
    Y: ColumnSlices<f64>,
{
    if x.height() != y.height() {
        return Err(ApproxError::LatentMismatch {
            x: x.height(),
            y: y.height(),
        });
    }
    if x.width() != pattern.nrows {
        return Err(ApproxError::DimensionMismatch {
            factor: "X",
            axis: "rows",
            expected: pattern.nrows,
            actual: x.width(),
        });
    }
    if y.width() != pattern.ncols {
        return Err(ApproxError::DimensionMismatch {
            factor: "Y",
            axis: "columns",
            expected: pattern.ncols,
            actual: y.width(),
        });
    }
    Ok(pattern.validate(format)?)
}

/// Row-oriented kernel: `out[pp] = dot(row_factors[:, i], col_factors[:, inner_index[pp]])`.
fn fill_rows<A, B>(
    rows: &SparsityPattern<'_>,
    row_factors: &A,
    col_factors: &B,
    config: &ApproxConfig,
    out: &mut [f64],
) -> ApproxResult<()>
where
    A: ColumnSlices<f64> + Sync,
    B: ColumnSlices<f64> + Sync,
{
    let grain = config.effective_grain_size();
    if config.n_threads == 1 || rows.nrows <= grain {
        fill_chunk(rows, row_factors, col_factors, 0..rows.nrows, out);
        return Ok(());
    }

    let tasks = split_by_grain(rows, grain, out);
    debug!(tasks = tasks.len(), grain, "dispatching outer chunks");
    install(config.n_threads, || {
        tasks.into_par_iter().for_each(|(outer, chunk_out)| {
            fill_chunk(rows, row_factors, col_factors, outer, chunk_out);
        });
    })?;
    Ok(())
}

/// Fill the nonzeros of rows `outer`; `out` starts at the first of them.
#[inline]
fn fill_chunk<A, B>(
    rows: &SparsityPattern<'_>,
    row_factors: &A,
    col_factors: &B,
    outer: Range<usize>,
    out: &mut [f64],
) where
    A: ColumnSlices<f64>,
    B: ColumnSlices<f64>,
{
    let base = rows.outer_ptr[outer.start] as usize;
    for i in outer {
        let factor = row_factors.col_slice(i);
        let span = rows.outer_range(i);
        let dst = &mut out[span.start - base..span.end - base];
        for (value, &j) in dst.iter_mut().zip(&rows.inner_index[span]) {
            *value = dot(factor, col_factors.col_slice(j as usize));
        }
    }
}

/// Cut `out` into the disjoint output ranges of consecutive runs of `grain` rows.
fn split_by_grain<'o>(
    rows: &SparsityPattern<'_>,
    grain: usize,
    mut out: &'o mut [f64],
) -> Vec<(Range<usize>, &'o mut [f64])> {
    let mut tasks = Vec::with_capacity(rows.nrows.div_ceil(grain));
    for start in (0..rows.nrows).step_by(grain) {
        let end = (start + grain).min(rows.nrows);
        let len = (rows.outer_ptr[end] - rows.outer_ptr[start]) as usize;
        let (head, tail) = mem::take(&mut out).split_at_mut(len);
        tasks.push((start..end, head));
        out = tail;
    }
    tasks
}
