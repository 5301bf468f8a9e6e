//! # Capped Simplex
//!
//! $$
//! \Pi(\mathbf v)=\arg\min_{\mathbf w}\ \lVert\mathbf w-\mathbf v\rVert_2
//! \quad\text{s.t.}\quad \textstyle\sum_i w_i=1,\ 0\le w_i\le u
//! $$
//!
//! Euclidean projection onto the long-only simplex with a per-asset cap. The
//! minimizer has the form `clamp(v_i - τ, 0, u)`; `τ` is found by bisection on
//! the (monotone) mass `Σ clamp(v_i - τ, 0, u)`.

const MAX_BISECTIONS: usize = 200;

fn clamped_mass(v: &[f64], tau: f64, cap: f64) -> f64 {
  v.iter().map(|&x| (x - tau).clamp(0.0, cap)).sum()
}

/// Project `v` onto `{w : Σw = 1, 0 ≤ w ≤ cap}`.
///
/// Callers guarantee feasibility (`v.len() * cap ≥ 1`). Caps above one are
/// inactive and treated as one.
pub(crate) fn project_capped_simplex(v: &[f64], cap: f64) -> Vec<f64> {
  if v.is_empty() {
    return Vec::new();
  }

  let cap = cap.min(1.0);
  let v_min = v.iter().copied().fold(f64::INFINITY, f64::min);
  let v_max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);

  // mass(lo) = n * cap >= 1, mass(hi) = 0
  let mut lo = v_min - cap;
  let mut hi = v_max;

  for _ in 0..MAX_BISECTIONS {
    let mid = 0.5 * (lo + hi);
    if mid <= lo || mid >= hi {
      break;
    }
    if clamped_mass(v, mid, cap) > 1.0 {
      lo = mid;
    } else {
      hi = mid;
    }
  }

  let tau = 0.5 * (lo + hi);
  v.iter().map(|&x| (x - tau).clamp(0.0, cap)).collect()
}

/// Projection restricted to the assets flagged in `support`; the rest stay at zero.
///
/// Returns `None` when the support cannot carry unit mass under the cap.
pub(crate) fn project_capped_simplex_on(v: &[f64], cap: f64, support: &[bool]) -> Option<Vec<f64>> {
  let idx: Vec<usize> = (0..v.len()).filter(|&i| support[i]).collect();
  if idx.is_empty() || (idx.len() as f64) * cap.min(1.0) < 1.0 {
    return None;
  }

  let sub: Vec<f64> = idx.iter().map(|&i| v[i]).collect();
  let projected = project_capped_simplex(&sub, cap);

  let mut out = vec![0.0; v.len()];
  for (&i, w) in idx.iter().zip(projected) {
    out[i] = w;
  }
  Some(out)
}
