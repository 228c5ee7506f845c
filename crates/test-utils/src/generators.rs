//! Value and coordinate generators for synthetic coverages.
//!
//! These generators create predictable, verifiable patterns so tests can
//! check that values survive reshaping and slicing.

/// Creates grid values where each cell is `col * 1000 + row`.
///
/// Values are in row-major order (row 0 first), matching a `[y, x]` range.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Creates `steps` stacked grids, each offset by `step * 100_000`.
///
/// Values are ordered `[t, y, x]`; the offset identifies the time step.
pub fn create_time_stacked_grid(width: usize, height: usize, steps: usize) -> Vec<f64> {
    (0..steps)
        .flat_map(|step| {
            create_test_grid(width, height)
                .into_iter()
                .map(move |v| v + (step * 100_000) as f64)
        })
        .collect()
}

/// `n` ascending cell-center coordinates starting at `start`.
pub fn regular_coords(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// `n` hourly ISO 8601 timestamps starting at 2024-01-01T00:00Z.
pub fn hourly_times(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("2024-01-{:02}T{:02}:00Z", 1 + i / 24, i % 24))
        .collect()
}

/// A closed square ring with its lower-left corner at `(x, y)`.
pub fn square_ring(x: f64, y: f64, size: f64) -> Vec<[f64; 2]> {
    vec![
        [x, y],
        [x, y + size],
        [x + size, y + size],
        [x + size, y],
        [x, y],
    ]
}

/// A deterministic zig-zag track of `n` positions.
pub fn track(start: [f64; 2], n: usize) -> Vec<[f64; 2]> {
    (0..n)
        .map(|i| {
            let dy = if i % 2 == 0 { 0.0 } else { 0.5 };
            [start[0] + i as f64, start[1] + dy]
        })
        .collect()
}
