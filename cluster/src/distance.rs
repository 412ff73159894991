//! Euclidean distances over ndarray rows.

use ndarray::{Array2, ArrayView1, ArrayView2};

pub(crate) fn sq_dist(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Squared distances between every pair of rows.
pub(crate) fn pairwise_sq_dists(records: ArrayView2<'_, f64>) -> Array2<f64> {
    let n = records.nrows();
    let mut d = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let v = sq_dist(records.row(i), records.row(j));
            d[[i, j]] = v;
            d[[j, i]] = v;
        }
    }
    d
}

/// Row of `centers` nearest to `point`. Ties resolve to the lowest index.
pub(crate) fn nearest(point: ArrayView1<'_, f64>, centers: ArrayView2<'_, f64>) -> usize {
    let mut best = (0, f64::INFINITY);
    for (c, center) in centers.rows().into_iter().enumerate() {
        let d = sq_dist(point, center);
        if d < best.1 {
            best = (c, d);
        }
    }
    best.0
}
