//! Sphere and cylinder axes on a quarter-dioptre grid

use serde::{Deserialize, Serialize};

/// Hundredths of a dioptre between consecutive axis values
pub const STEP_CENTI: u32 = 25;

/// Number of sphere values (0.00 to 20.00)
pub const SPHERE_COUNT: usize = 81;

/// Number of cylinder values (0.00 to 6.00)
pub const CYLINDER_COUNT: usize = 25;

/// Which axis of the power matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// Rows
    Sphere,
    /// Columns
    Cylinder,
}

/// Display sign shared by every non-zero value of an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AxisSign {
    #[default]
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "+")]
    Plus,
}

impl AxisSign {
    /// The glyph printed in front of non-zero values
    pub fn glyph(self) -> char {
        match self {
            AxisSign::Minus => '-',
            AxisSign::Plus => '+',
        }
    }

    /// The other sign
    pub fn flipped(self) -> Self {
        match self {
            AxisSign::Minus => AxisSign::Plus,
            AxisSign::Plus => AxisSign::Minus,
        }
    }
}

/// Sign configuration for both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisSigns {
    /// Sphere sign
    pub row: AxisSign,
    /// Cylinder sign
    pub col: AxisSign,
}

impl AxisSigns {
    pub fn get(&self, kind: AxisKind) -> AxisSign {
        match kind {
            AxisKind::Sphere => self.row,
            AxisKind::Cylinder => self.col,
        }
    }

    pub fn set(&mut self, kind: AxisKind, sign: AxisSign) {
        match kind {
            AxisKind::Sphere => self.row = sign,
            AxisKind::Cylinder => self.col = sign,
        }
    }
}

/// One labelled position on an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisValue {
    /// Position within the axis (0 = zero power)
    pub index: usize,
    /// Magnitude in hundredths of a dioptre
    pub centi: u32,
    /// Display sign
    pub sign: AxisSign,
}

impl AxisValue {
    pub fn new(index: usize, sign: AxisSign) -> Self {
        Self {
            index,
            centi: index as u32 * STEP_CENTI,
            sign,
        }
    }

    /// Absolute power in dioptres
    pub fn magnitude(&self) -> f32 {
        self.centi as f32 / 100.0
    }

    /// Formatted label, e.g. `-12.00`, `+0.25`, `0.00`
    pub fn label(&self) -> String {
        let whole = self.centi / 100;
        let frac = self.centi % 100;
        if self.centi == 0 {
            format!("{}.{:02}", whole, frac)
        } else {
            format!("{}{}.{:02}", self.sign.glyph(), whole, frac)
        }
    }
}

impl std::fmt::Display for AxisValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Parse a label back into its magnitude in hundredths.
///
/// Accepts an optional `+`/`-` and at most two decimals. The sign is
/// ignored since it is a display choice, not part of the position.
pub fn parse_label(label: &str) -> Option<u32> {
    let body = label.trim();
    let body = body
        .strip_prefix('-')
        .or_else(|| body.strip_prefix('+'))
        .unwrap_or(body);

    let (whole, frac) = match body.split_once('.') {
        Some((w, f)) => (w, f),
        None => (body, ""),
    };
    if whole.is_empty() || frac.len() > 2 {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: u32 = whole.parse().ok()?;
    let frac: u32 = match frac.len() {
        0 => 0,
        1 => frac.parse::<u32>().ok()? * 10,
        _ => frac.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(frac)
}

/// A procedurally generated, sign-toggled axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axis {
    pub kind: AxisKind,
    len: usize,
    sign: AxisSign,
}

impl Axis {
    pub fn new(kind: AxisKind, len: usize, sign: AxisSign) -> Self {
        Self { kind, len, sign }
    }

    /// Default sphere axis: 81 values from 0.00 to 20.00
    pub fn sphere(sign: AxisSign) -> Self {
        Self::new(AxisKind::Sphere, SPHERE_COUNT, sign)
    }

    /// Default cylinder axis: 25 values from 0.00 to 6.00
    pub fn cylinder(sign: AxisSign) -> Self {
        Self::new(AxisKind::Cylinder, CYLINDER_COUNT, sign)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn sign(&self) -> AxisSign {
        self.sign
    }

    /// Same axis relabelled with another sign
    pub fn with_sign(self, sign: AxisSign) -> Self {
        Self { sign, ..self }
    }

    pub fn value(&self, index: usize) -> Option<AxisValue> {
        (index < self.len).then(|| AxisValue::new(index, self.sign))
    }

    /// All values in order, starting at zero
    pub fn values(&self) -> Vec<AxisValue> {
        (0..self.len).map(|i| AxisValue::new(i, self.sign)).collect()
    }

    /// Resolve a label to a position by magnitude, whatever its sign
    pub fn index_of_label(&self, label: &str) -> Option<usize> {
        let centi = parse_label(label)?;
        if centi % STEP_CENTI != 0 {
            return None;
        }
        let index = (centi / STEP_CENTI) as usize;
        (index < self.len).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_axes() {
        let sph = Axis::sphere(AxisSign::Minus).values();
        assert_eq!(sph.len(), 81);
        assert_eq!(sph[0].label(), "0.00");
        assert_eq!(sph[1].label(), "-0.25");
        assert_eq!(sph[80].label(), "-20.00");

        let cyl = Axis::cylinder(AxisSign::Minus).values();
        assert_eq!(cyl.len(), 25);
        assert_eq!(cyl[24].label(), "-6.00");
    }

    #[test]
    fn test_sign_flip_keeps_magnitude() {
        let minus = Axis::sphere(AxisSign::Minus);
        let plus = minus.with_sign(AxisSign::Plus);

        assert_eq!(minus.value(20).unwrap().label(), "-5.00");
        assert_eq!(plus.value(20).unwrap().label(), "+5.00");
        assert_eq!(plus.value(0).unwrap().label(), "0.00");
        assert_eq!(
            minus.value(20).unwrap().magnitude(),
            plus.value(20).unwrap().magnitude()
        );
    }

    #[test]
    fn test_strictly_increasing_magnitude() {
        let values = Axis::sphere(AxisSign::Plus).values();
        assert!(values.windows(2).all(|w| w[0].centi < w[1].centi));
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("0.00"), Some(0));
        assert_eq!(parse_label("-12.00"), Some(1200));
        assert_eq!(parse_label("+0.25"), Some(25));
        assert_eq!(parse_label("5.5"), Some(550));
        assert_eq!(parse_label("7"), Some(700));
        assert_eq!(parse_label("abc"), None);
        assert_eq!(parse_label("-1.234"), None);
        assert_eq!(parse_label(""), None);
    }

    #[test]
    fn test_index_of_label() {
        let axis = Axis::cylinder(AxisSign::Minus);
        assert_eq!(axis.index_of_label("-2.00"), Some(8));
        assert_eq!(axis.index_of_label("+2.00"), Some(8));
        assert_eq!(axis.index_of_label("-2.10"), None);
        assert_eq!(axis.index_of_label("-6.25"), None);
    }
}
