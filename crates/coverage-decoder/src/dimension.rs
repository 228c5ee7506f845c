//! Enumeration of the non-spatial dimensions of a gridded range.
//!
//! Every axis of a range other than `x`/`y` is iterated over its index
//! range; the cartesian product of those ranges yields one
//! [`DimensionSlice`] per 2-D plane. The spatial axes are never
//! enumerated, they are selected in full.

use covjson_protocol::Domain;
use ndarray::{Array2, ArrayD, Axis, Ix2};

use crate::axis::{AxisValue, ResolvedAxis};
use crate::error::{DecodeError, Result};

/// Selection along one axis of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSelector {
    /// A single index; the axis is dropped from the result.
    Fixed(usize),
    /// The whole axis is kept.
    Full,
}

/// One plane of a range: its selectors and descriptive tags.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionSlice {
    /// One selector per range axis, in range axis order.
    pub selectors: Vec<AxisSelector>,
    /// `"<axis>_<value>"` for each non-spatial axis, joined by `_`.
    pub label: String,
    /// Value of the `t` axis for this plane, if the range has one.
    pub time: Option<AxisValue>,
    /// Value of the `z` axis for this plane, if the range has one.
    pub z: Option<AxisValue>,
}

#[derive(Debug, Clone)]
struct ExtraAxis {
    position: usize,
    axis: ResolvedAxis,
}

/// Enumerates the planes of a range.
#[derive(Debug, Clone)]
pub struct DimensionAccessor {
    rank: usize,
    extra: Vec<ExtraAxis>,
}

impl DimensionAccessor {
    /// Build from a range's axis names and shape and the coverage domain.
    ///
    /// Every non-spatial axis must be declared by the domain, and its length
    /// must match the range's extent along it.
    pub fn new(axis_names: &[String], shape: &[usize], domain: &Domain) -> Result<Self> {
        let mut extra = Vec::new();
        for (position, name) in axis_names.iter().enumerate() {
            if name == "x" || name == "y" {
                continue;
            }
            let axis = ResolvedAxis::from_domain(domain, name)?;
            let extent = shape.get(position).copied().unwrap_or_default();
            if axis.len() != extent {
                return Err(DecodeError::invalid_axis(
                    name,
                    format!("domain has {} values, range extent is {}", axis.len(), extent),
                ));
            }
            extra.push(ExtraAxis { position, axis });
        }

        Ok(Self {
            rank: axis_names.len(),
            extra,
        })
    }

    /// Names of the enumerated axes, in range order.
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.extra.iter().map(|e| e.axis.name.as_str())
    }

    /// Number of planes.
    pub fn slice_count(&self) -> usize {
        self.extra.iter().map(|e| e.axis.len()).product()
    }

    /// Iterate over all planes. Each call starts from the beginning.
    pub fn iter(&self) -> DimensionIter<'_> {
        DimensionIter {
            accessor: self,
            counters: vec![0; self.extra.len()],
            done: self.slice_count() == 0,
        }
    }

    fn slice_at(&self, counters: &[usize]) -> DimensionSlice {
        let mut selectors = vec![AxisSelector::Full; self.rank];
        let mut labels = Vec::with_capacity(self.extra.len());
        let mut time = None;
        let mut z = None;

        for (extra, &index) in self.extra.iter().zip(counters) {
            selectors[extra.position] = AxisSelector::Fixed(index);
            let value = &extra.axis.values[index];
            labels.push(format!("{}_{}", extra.axis.name, value));
            match extra.axis.name.as_str() {
                "t" => time = Some(value.clone()),
                "z" => z = Some(value.clone()),
                _ => {}
            }
        }

        DimensionSlice {
            selectors,
            label: labels.join("_"),
            time,
            z,
        }
    }
}

impl<'a> IntoIterator for &'a DimensionAccessor {
    type Item = DimensionSlice;
    type IntoIter = DimensionIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Odometer over the non-spatial axes; the last axis varies fastest.
#[derive(Debug, Clone)]
pub struct DimensionIter<'a> {
    accessor: &'a DimensionAccessor,
    counters: Vec<usize>,
    done: bool,
}

impl Iterator for DimensionIter<'_> {
    type Item = DimensionSlice;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let slice = self.accessor.slice_at(&self.counters);

        self.done = true;
        for (i, counter) in self.counters.iter_mut().enumerate().rev() {
            *counter += 1;
            if *counter < self.accessor.extra[i].axis.len() {
                self.done = false;
                break;
            }
            *counter = 0;
        }

        Some(slice)
    }
}

/// Extract the 2-D plane selected by `selectors`.
///
/// Exactly two selectors must be [`AxisSelector::Full`]. When `transpose`
/// is set the two remaining axes are swapped, so callers can always
/// receive `(y, x)` ordered planes.
pub fn slice_plane<T: Clone>(
    array: &ArrayD<T>,
    selectors: &[AxisSelector],
    transpose: bool,
) -> Result<Array2<T>> {
    if selectors.len() != array.ndim() {
        return Err(DecodeError::document(format!(
            "{} selectors for a {}-dimensional range",
            selectors.len(),
            array.ndim()
        )));
    }

    let mut view = array.view();
    // Highest axis first so earlier positions stay valid.
    for (position, selector) in selectors.iter().enumerate().rev() {
        if let AxisSelector::Fixed(index) = *selector {
            if index >= view.len_of(Axis(position)) {
                return Err(DecodeError::document(format!(
                    "index {} out of bounds on axis {}",
                    index, position
                )));
            }
            view = view.index_axis_move(Axis(position), index);
        }
    }

    let plane = view
        .into_dimensionality::<Ix2>()
        .map_err(|e| DecodeError::document(format!("selection is not a plane: {}", e)))?;

    Ok(if transpose {
        plane.reversed_axes().to_owned()
    } else {
        plane.to_owned()
    })
}
