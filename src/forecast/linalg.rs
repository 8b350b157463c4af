// src/forecast/linalg.rs

//! Dense regularised least squares for small design matrices.

/// Solves `(XᵀX + diag(penalty)) β = Xᵀy` by Cholesky factorisation.
///
/// `rows` is the design matrix, one `Vec` per observation, all of length
/// `penalty.len()`. Returns `None` if the system is not positive definite.
pub fn solve_ridge(rows: &[Vec<f64>], y: &[f64], penalty: &[f64]) -> Option<Vec<f64>> {
    let p = penalty.len();
    let mut gram = vec![0.0; p * p];
    let mut rhs = vec![0.0; p];

    for (row, &target) in rows.iter().zip(y) {
        debug_assert_eq!(row.len(), p);
        for i in 0..p {
            let xi = row[i];
            if xi == 0.0 {
                continue;
            }
            rhs[i] += xi * target;
            for j in 0..=i {
                gram[i * p + j] += xi * row[j];
            }
        }
    }
    for i in 0..p {
        gram[i * p + i] += penalty[i];
    }

    cholesky_solve(gram, rhs, p)
}

/// Solves `A x = b` for symmetric positive definite `A` (row-major, only the
/// lower triangle is read).
pub fn cholesky_solve(mut a: Vec<f64>, mut b: Vec<f64>, n: usize) -> Option<Vec<f64>> {
    // In-place factorisation A = L Lᵀ, L stored in the lower triangle.
    for j in 0..n {
        let mut diag = a[j * n + j];
        for k in 0..j {
            diag -= a[j * n + k] * a[j * n + k];
        }
        if !diag.is_finite() || diag <= 0.0 {
            return None;
        }
        let diag = diag.sqrt();
        a[j * n + j] = diag;

        for i in (j + 1)..n {
            let mut v = a[i * n + j];
            for k in 0..j {
                v -= a[i * n + k] * a[j * n + k];
            }
            a[i * n + j] = v / diag;
        }
    }

    // Forward substitution: L z = b
    for i in 0..n {
        let mut v = b[i];
        for k in 0..i {
            v -= a[i * n + k] * b[k];
        }
        b[i] = v / a[i * n + i];
    }

    // Back substitution: Lᵀ x = z
    for i in (0..n).rev() {
        let mut v = b[i];
        for k in (i + 1)..n {
            v -= a[k * n + i] * b[k];
        }
        b[i] = v / a[i * n + i];
    }

    Some(b)
}
