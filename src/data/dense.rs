//! Row-major dense feature matrix.

/// Dense `f32` matrix, one row per instance.
///
/// # Example
///
/// ```
/// use flatforest::data::DenseMatrix;
///
/// let m = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
/// assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    data: Box<[f32]>,
    num_rows: usize,
    num_features: usize,
}

impl DenseMatrix {
    /// Create a matrix from row-major data, taking ownership.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != num_rows * num_features`.
    pub fn from_vec(data: Vec<f32>, num_rows: usize, num_features: usize) -> Self {
        assert_eq!(
            data.len(),
            num_rows * num_features,
            "Data length {} does not match dimensions {}x{}",
            data.len(),
            num_rows,
            num_features
        );
        Self {
            data: data.into_boxed_slice(),
            num_rows,
            num_features,
        }
    }

    /// All-zero matrix.
    pub fn zeros(num_rows: usize, num_features: usize) -> Self {
        Self::from_vec(vec![0.0; num_rows * num_features], num_rows, num_features)
    }

    /// Number of rows (instances).
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of features per row.
    #[inline]
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Underlying row-major data.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Features of row `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= num_rows()`.
    #[inline]
    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.num_features;
        &self.data[start..start + self.num_features]
    }

    /// Mutable features of row `row`.
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        let start = row * self.num_features;
        &mut self.data[start..start + self.num_features]
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        (0..self.num_rows).map(move |row| self.row(row))
    }
}
