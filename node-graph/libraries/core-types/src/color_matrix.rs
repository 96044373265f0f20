use crate::color::Color;
use core::ops::{Add, Mul, Sub};

/// A 4x5 color matrix. Each row produces one output channel (red, green, blue, alpha) from the four
/// input channels plus a constant offset in the last column.
///
/// ```text
/// [ r' ]   [ m00 m01 m02 m03 m04 ]   [ r ]
/// [ g' ] = [ m10 m11 m12 m13 m14 ] * [ g ]
/// [ b' ]   [ m20 m21 m22 m23 m24 ]   [ b ]
/// [ a' ]   [ m30 m31 m32 m33 m34 ]   [ a ]
///                                    [ 1 ]
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorMatrix {
	rows: [[f32; 5]; 4],
}

impl ColorMatrix {
	/// `(_, _, _, _) => (0, 0, 0, 0)`
	pub const ZERO: ColorMatrix = ColorMatrix::new([[0.; 5]; 4]);

	/// `(r, g, b, a) => (r, g, b, a)`
	pub const IDENTITY: ColorMatrix = ColorMatrix::new([[1., 0., 0., 0., 0.], [0., 1., 0., 0., 0.], [0., 0., 1., 0., 0.], [0., 0., 0., 1., 0.]]);

	/// `(r, _, _, _) => (0, r, r, 0)`. Adding [`Self::USE_RED`] results in a grayscale image of the red channel.
	pub const MAP_RED_TO_GREEN_BLUE: ColorMatrix = ColorMatrix::new([[0., 0., 0., 0., 0.], [1., 0., 0., 0., 0.], [1., 0., 0., 0., 0.], [0., 0., 0., 0., 0.]]);

	/// `(_, g, _, _) => (g, 0, g, 0)`
	pub const MAP_GREEN_TO_RED_BLUE: ColorMatrix = ColorMatrix::new([[0., 1., 0., 0., 0.], [0., 0., 0., 0., 0.], [0., 1., 0., 0., 0.], [0., 0., 0., 0., 0.]]);

	/// `(_, _, b, _) => (b, b, 0, 0)`
	pub const MAP_BLUE_TO_RED_GREEN: ColorMatrix = ColorMatrix::new([[0., 0., 1., 0., 0.], [0., 0., 1., 0., 0.], [0., 0., 0., 0., 0.], [0., 0., 0., 0., 0.]]);

	/// `(_, _, _, a) => (a, a, a, 0)`
	pub const MAP_ALPHA_TO_RED_GREEN_BLUE: ColorMatrix = ColorMatrix::new([[0., 0., 0., 1., 0.], [0., 0., 0., 1., 0.], [0., 0., 0., 1., 0.], [0., 0., 0., 0., 0.]]);

	/// `(r, _, _, _) => (0, 0, 0, r)`
	pub const MAP_RED_TO_ALPHA: ColorMatrix = ColorMatrix::new([[0., 0., 0., 0., 0.], [0., 0., 0., 0., 0.], [0., 0., 0., 0., 0.], [1., 0., 0., 0., 0.]]);

	/// `(r, _, _, _) => (r, 0, 0, 0)`
	pub const USE_RED: ColorMatrix = ColorMatrix::new([[1., 0., 0., 0., 0.], [0.; 5], [0.; 5], [0.; 5]]);

	/// `(_, g, _, _) => (0, g, 0, 0)`
	pub const USE_GREEN: ColorMatrix = ColorMatrix::new([[0.; 5], [0., 1., 0., 0., 0.], [0.; 5], [0.; 5]]);

	/// `(_, _, b, _) => (0, 0, b, 0)`
	pub const USE_BLUE: ColorMatrix = ColorMatrix::new([[0.; 5], [0.; 5], [0., 0., 1., 0., 0.], [0.; 5]]);

	/// `(_, _, _, a) => (0, 0, 0, a)`
	pub const USE_ALPHA: ColorMatrix = ColorMatrix::new([[0.; 5], [0.; 5], [0.; 5], [0., 0., 0., 1., 0.]]);

	/// `(_, _, _, a) => (0, 0, 0, a + 1)`
	pub const OPAQUE_ALPHA_OFFSET: ColorMatrix = ColorMatrix::offset(0., 0., 0., 1.);

	/// The rgb values are averaged into a grayscale image. Alpha becomes zero.
	pub const AVERAGE_GRAYSCALE: ColorMatrix = ColorMatrix::weighted_grayscale(1. / 3., 1. / 3., 1. / 3., 0.);

	pub const WEIGHTED_WAVELENGTH_GRAYSCALE: ColorMatrix = ColorMatrix::weighted_grayscale(0.299, 0.587, 0.114, 0.);

	pub const fn new(rows: [[f32; 5]; 4]) -> Self {
		Self { rows }
	}

	/// `(r, g, b, a) => (r + red, g + green, b + blue, a + alpha)` once added to [`Self::IDENTITY`]. On its own every channel becomes its offset.
	pub const fn offset(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
		Self::new([[0., 0., 0., 0., red], [0., 0., 0., 0., green], [0., 0., 0., 0., blue], [0., 0., 0., 0., alpha]])
	}

	/// `(r, g, b, a) => (rgb: r * red + g * green + b * blue + a * alpha, 0)`
	pub const fn weighted_grayscale(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
		let row = [red, green, blue, alpha, 0.];
		Self::new([row, row, row, [0.; 5]])
	}

	pub fn rows(&self) -> &[[f32; 5]; 4] {
		&self.rows
	}

	/// Transforms a color, clamping the result into the valid range.
	pub fn apply(&self, color: Color) -> Color {
		let input = color.to_array();
		let channel = |row: &[f32; 5]| row[0] * input[0] + row[1] * input[1] + row[2] * input[2] + row[3] * input[3] + row[4];
		Color::from_rgbaf32_clamped(channel(&self.rows[0]), channel(&self.rows[1]), channel(&self.rows[2]), channel(&self.rows[3]))
	}

	fn zip(self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self {
		let mut rows = self.rows;
		for (row, other_row) in rows.iter_mut().zip(other.rows) {
			for (value, other_value) in row.iter_mut().zip(other_row) {
				*value = f(*value, other_value);
			}
		}
		Self { rows }
	}
}

impl Add for ColorMatrix {
	type Output = ColorMatrix;

	fn add(self, rhs: Self) -> Self::Output {
		self.zip(rhs, |a, b| a + b)
	}
}

impl Sub for ColorMatrix {
	type Output = ColorMatrix;

	fn sub(self, rhs: Self) -> Self::Output {
		self.zip(rhs, |a, b| a - b)
	}
}

/// Composition: `(a * b).apply(c) == a.apply(b.apply(c))` as long as no intermediate value is clamped.
impl Mul for ColorMatrix {
	type Output = ColorMatrix;

	fn mul(self, rhs: Self) -> Self::Output {
		let mut rows = [[0.; 5]; 4];
		for (i, row) in rows.iter_mut().enumerate() {
			for (j, value) in row.iter_mut().enumerate() {
				let mut sum: f32 = (0..4).map(|k| self.rows[i][k] * rhs.rows[k][j]).sum();
				if j == 4 {
					sum += self.rows[i][4];
				}
				*value = sum;
			}
		}
		Self { rows }
	}
}
