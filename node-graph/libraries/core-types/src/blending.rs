use crate::color::Color;

/// Describes how a layer is blended onto the pixels below it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default, Hash)]
pub enum BlendMode {
	// Basic group
	#[default]
	Normal,

	// Darken group
	Multiply,
	Darken,
	ColorBurn,

	// Lighten group
	Screen,
	Lighten,
	ColorDodge,

	// Contrast group
	Overlay,
	SoftLight,
	HardLight,

	// Inversion group
	Difference,
	Exclusion,

	// Component group
	Hue,
	Saturation,
	Color,
	Luminosity,
}

impl BlendMode {
	/// The mixing function `B(backdrop, source)` applied to the color channels, alpha is ignored.
	pub fn mix(&self, backdrop: Color, source: Color) -> [f32; 3] {
		let [br, bg, bb, _] = backdrop.to_array();
		let [sr, sg, sb, _] = source.to_array();
		let separable = |f: fn(f32, f32) -> f32| [f(br, sr), f(bg, sg), f(bb, sb)];

		match self {
			BlendMode::Normal => [sr, sg, sb],
			BlendMode::Multiply => separable(|b, s| b * s),
			BlendMode::Darken => separable(f32::min),
			BlendMode::ColorBurn => separable(|b, s| match (b, s) {
				(b, _) if b >= 1. => 1.,
				(_, s) if s <= 0. => 0.,
				(b, s) => 1. - ((1. - b) / s).min(1.),
			}),
			BlendMode::Screen => separable(screen),
			BlendMode::Lighten => separable(f32::max),
			BlendMode::ColorDodge => separable(|b, s| match (b, s) {
				(b, _) if b <= 0. => 0.,
				(_, s) if s >= 1. => 1.,
				(b, s) => (b / (1. - s)).min(1.),
			}),
			BlendMode::Overlay => separable(|b, s| hard_light(s, b)),
			BlendMode::SoftLight => separable(soft_light),
			BlendMode::HardLight => separable(hard_light),
			BlendMode::Difference => separable(|b, s| (b - s).abs()),
			BlendMode::Exclusion => separable(|b, s| b + s - 2. * b * s),
			BlendMode::Hue => set_luminosity(set_saturation([sr, sg, sb], saturation([br, bg, bb])), luminosity([br, bg, bb])),
			BlendMode::Saturation => set_luminosity(set_saturation([br, bg, bb], saturation([sr, sg, sb])), luminosity([br, bg, bb])),
			BlendMode::Color => set_luminosity([sr, sg, sb], luminosity([br, bg, bb])),
			BlendMode::Luminosity => set_luminosity([br, bg, bb], luminosity([sr, sg, sb])),
		}
	}

	/// Composites `source` over `backdrop` with this blend mode and an extra opacity factor on the source.
	pub fn composite(&self, backdrop: Color, source: Color, opacity: f32) -> Color {
		let source_alpha = source.a() * opacity.clamp(0., 1.);
		let backdrop_alpha = backdrop.a();
		if source_alpha <= 0. {
			return backdrop;
		}

		let mixed = self.mix(backdrop, source);
		let source_channels = [source.r(), source.g(), source.b()];
		let backdrop_channels = [backdrop.r(), backdrop.g(), backdrop.b()];

		let alpha = source_alpha + backdrop_alpha * (1. - source_alpha);
		let channel = |i: usize| {
			let blended_source = (1. - backdrop_alpha) * source_channels[i] + backdrop_alpha * mixed[i];
			(source_alpha * blended_source + backdrop_alpha * backdrop_channels[i] * (1. - source_alpha)) / alpha
		};
		Color::from_rgbaf32_clamped(channel(0), channel(1), channel(2), alpha)
	}
}

pub fn screen(backdrop: f32, source: f32) -> f32 {
	backdrop + source - backdrop * source
}

fn hard_light(backdrop: f32, source: f32) -> f32 {
	if source <= 0.5 {
		backdrop * 2. * source
	} else {
		screen(backdrop, 2. * source - 1.)
	}
}

fn soft_light(backdrop: f32, source: f32) -> f32 {
	if source <= 0.5 {
		backdrop - (1. - 2. * source) * backdrop * (1. - backdrop)
	} else {
		let d = if backdrop <= 0.25 { ((16. * backdrop - 12.) * backdrop + 4.) * backdrop } else { backdrop.sqrt() };
		backdrop + (2. * source - 1.) * (d - backdrop)
	}
}

fn luminosity([r, g, b]: [f32; 3]) -> f32 {
	0.3 * r + 0.59 * g + 0.11 * b
}

fn saturation([r, g, b]: [f32; 3]) -> f32 {
	r.max(g).max(b) - r.min(g).min(b)
}

fn clip_color(color: [f32; 3]) -> [f32; 3] {
	let l = luminosity(color);
	let n = color[0].min(color[1]).min(color[2]);
	let x = color[0].max(color[1]).max(color[2]);
	color.map(|c| {
		let mut c = c;
		if n < 0. {
			c = l + (c - l) * l / (l - n);
		}
		if x > 1. {
			c = l + (c - l) * (1. - l) / (x - l);
		}
		c
	})
}

fn set_luminosity(color: [f32; 3], l: f32) -> [f32; 3] {
	let d = l - luminosity(color);
	clip_color(color.map(|c| c + d))
}

fn set_saturation(color: [f32; 3], s: f32) -> [f32; 3] {
	let max = color[0].max(color[1]).max(color[2]);
	let min = color[0].min(color[1]).min(color[2]);
	if max <= min {
		return [0.; 3];
	}
	color.map(|c| (c - min) * s / (max - min))
}
