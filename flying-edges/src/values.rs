//! Lists of contour values

/// An ordered list of contour values
///
/// Each value produces an independent surface; surfaces are emitted in list
/// order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContourValues(Vec<f64>);

impl ContourValues {
    /// Builds an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates `count` evenly spaced values between `start` and `end`,
    /// including both ends of the range
    ///
    /// ```
    /// # use flying_edges::ContourValues;
    /// let v = ContourValues::generate(3, 0.0, 1.0);
    /// assert_eq!(v.as_slice(), &[0.0, 0.5, 1.0]);
    /// ```
    pub fn generate(count: usize, start: f64, end: f64) -> Self {
        match count {
            0 => Self::new(),
            1 => Self(vec![start]),
            _ => {
                let step = (end - start) / (count - 1) as f64;
                Self((0..count).map(|i| start + i as f64 * step).collect())
            }
        }
    }

    /// Sets the value at index `i`, growing the list with zeros if needed
    pub fn set(&mut self, i: usize, value: f64) {
        if i >= self.0.len() {
            self.0.resize(i + 1, 0.0);
        }
        self.0[i] = value;
    }

    /// Appends a value to the list
    pub fn push(&mut self, value: f64) {
        self.0.push(value)
    }

    /// Returns the value at index `i`
    pub fn get(&self, i: usize) -> Option<f64> {
        self.0.get(i).cloned()
    }

    /// Returns the number of values
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the values as a slice
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Iterates over values in order
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().cloned()
    }
}

impl From<f64> for ContourValues {
    fn from(v: f64) -> Self {
        Self(vec![v])
    }
}

impl From<Vec<f64>> for ContourValues {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

impl<const N: usize> From<[f64; N]> for ContourValues {
    fn from(v: [f64; N]) -> Self {
        Self(v.to_vec())
    }
}

impl FromIterator<f64> for ContourValues {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn generate_values() {
        assert!(ContourValues::generate(0, 1.0, 2.0).is_empty());
        assert_eq!(ContourValues::generate(1, 1.0, 2.0).as_slice(), &[1.0]);
        assert_eq!(
            ContourValues::generate(5, -1.0, 1.0).as_slice(),
            &[-1.0, -0.5, 0.0, 0.5, 1.0]
        );
        // Reversed ranges are allowed and keep their order
        assert_eq!(
            ContourValues::generate(2, 3.0, 1.0).as_slice(),
            &[3.0, 1.0]
        );
    }

    #[test]
    fn set_grows() {
        let mut v = ContourValues::new();
        v.set(2, 4.0);
        assert_eq!(v.as_slice(), &[0.0, 0.0, 4.0]);
        v.set(0, 1.0);
        v.push(5.0);
        assert_eq!(v.get(0), Some(1.0));
        assert_eq!(v.get(3), Some(5.0));
        assert_eq!(v.get(4), None);
        assert_eq!(v.len(), 4);
    }
}
