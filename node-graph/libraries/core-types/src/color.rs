/// Structure that represents a color with straight (not premultiplied) alpha.
/// All four components are stored as `f32` ranging from `0.0` to `1.0`.
#[repr(C)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
	red: f32,
	green: f32,
	blue: f32,
	alpha: f32,
}

impl Color {
	pub const BLACK: Color = Color::from_rgbf32_unchecked(0., 0., 0.);
	pub const WHITE: Color = Color::from_rgbf32_unchecked(1., 1., 1.);
	pub const RED: Color = Color::from_rgbf32_unchecked(1., 0., 0.);
	pub const GREEN: Color = Color::from_rgbf32_unchecked(0., 1., 0.);
	pub const BLUE: Color = Color::from_rgbf32_unchecked(0., 0., 1.);
	pub const TRANSPARENT: Color = Self {
		red: 0.,
		green: 0.,
		blue: 0.,
		alpha: 0.,
	};

	/// Return an opaque `Color` from given `f32` RGB channels.
	pub const fn from_rgbf32_unchecked(red: f32, green: f32, blue: f32) -> Color {
		Color { red, green, blue, alpha: 1. }
	}

	pub const fn from_rgbaf32_unchecked(red: f32, green: f32, blue: f32, alpha: f32) -> Color {
		Color { red, green, blue, alpha }
	}

	/// Builds a color from arbitrary channel values, clamping each into `0.0..=1.0`. NaN becomes `0.0`.
	pub fn from_rgbaf32_clamped(red: f32, green: f32, blue: f32, alpha: f32) -> Color {
		let clamp = |channel: f32| if channel.is_nan() { 0. } else { channel.clamp(0., 1.) };
		Color {
			red: clamp(red),
			green: clamp(green),
			blue: clamp(blue),
			alpha: clamp(alpha),
		}
	}

	pub fn from_rgba8(red: u8, green: u8, blue: u8, alpha: u8) -> Color {
		let map_range = |int_color| int_color as f32 / 255.;
		Color {
			red: map_range(red),
			green: map_range(green),
			blue: map_range(blue),
			alpha: map_range(alpha),
		}
	}

	/// Hue, saturation, lightness and alpha, all between 0 and 1. Hue wraps around.
	pub fn from_hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Color {
		let temp1 = if lightness < 0.5 {
			lightness * (saturation + 1.)
		} else {
			lightness + saturation - lightness * saturation
		};
		let temp2 = 2. * lightness - temp1;

		let mut red = (hue + 1. / 3.).rem_euclid(1.);
		let mut green = hue.rem_euclid(1.);
		let mut blue = (hue - 1. / 3.).rem_euclid(1.);

		for channel in [&mut red, &mut green, &mut blue] {
			*channel = if *channel * 6. < 1. {
				temp2 + (temp1 - temp2) * 6. * *channel
			} else if *channel * 2. < 1. {
				temp1
			} else if *channel * 3. < 2. {
				temp2 + (temp1 - temp2) * (2. / 3. - *channel) * 6.
			} else {
				temp2
			}
			.clamp(0., 1.);
		}

		Color {
			red,
			green,
			blue,
			alpha: alpha.clamp(0., 1.),
		}
	}

	pub fn from_hsva(hue: f32, saturation: f32, value: f32, alpha: f32) -> Color {
		let hue = hue.rem_euclid(1.) * 6.;
		let chroma = value * saturation;
		let x = chroma * (1. - (hue.rem_euclid(2.) - 1.).abs());
		let (red, green, blue) = match hue as u32 {
			0 => (chroma, x, 0.),
			1 => (x, chroma, 0.),
			2 => (0., chroma, x),
			3 => (0., x, chroma),
			4 => (x, 0., chroma),
			_ => (chroma, 0., x),
		};
		let min = value - chroma;
		Color::from_rgbaf32_clamped(red + min, green + min, blue + min, alpha)
	}

	pub fn r(&self) -> f32 {
		self.red
	}

	pub fn g(&self) -> f32 {
		self.green
	}

	pub fn b(&self) -> f32 {
		self.blue
	}

	pub fn a(&self) -> f32 {
		self.alpha
	}

	pub fn to_array(&self) -> [f32; 4] {
		[self.red, self.green, self.blue, self.alpha]
	}

	pub fn from_array([red, green, blue, alpha]: [f32; 4]) -> Color {
		Color::from_rgbaf32_clamped(red, green, blue, alpha)
	}

	/// Inverse of [`Color::from_hsla`]. Grays have a hue and saturation of zero.
	pub fn to_hsla(&self) -> [f32; 4] {
		let min = self.red.min(self.green).min(self.blue);
		let max = self.red.max(self.green).max(self.blue);
		let lightness = (max + min) / 2.;

		if max == min {
			return [0., 0., lightness, self.alpha];
		}

		let delta = max - min;
		let saturation = if lightness > 0.5 { delta / (2. - max - min) } else { delta / (max + min) };

		[self.hue_sextant(max, delta) / 6., saturation, lightness, self.alpha]
	}

	pub fn to_hsva(&self) -> [f32; 4] {
		let min = self.red.min(self.green).min(self.blue);
		let max = self.red.max(self.green).max(self.blue);
		let delta = max - min;

		if delta == 0. {
			return [0., 0., max, self.alpha];
		}

		let saturation = if max == 0. { 0. } else { delta / max };
		[self.hue_sextant(max, delta) / 6., saturation, max, self.alpha]
	}

	fn hue_sextant(&self, max: f32, delta: f32) -> f32 {
		let (red, green, blue) = (self.red, self.green, self.blue);
		if red == max {
			let wrap = if green < blue { 6. } else { 0. };
			(green - blue) / delta + wrap
		} else if green == max {
			(blue - red) / delta + 2.
		} else {
			(red - green) / delta + 4.
		}
	}

	pub fn with_alpha(&self, alpha: f32) -> Color {
		Color { alpha, ..*self }
	}

	/// Combines every channel pair with `f`, alpha included.
	pub fn zip_rgba<F: Fn(f32, f32) -> f32>(&self, other: Color, f: F) -> Self {
		Self::from_rgbaf32_unchecked(f(self.red, other.red), f(self.green, other.green), f(self.blue, other.blue), f(self.alpha, other.alpha))
	}
}
