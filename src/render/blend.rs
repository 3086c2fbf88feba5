use crate::foundation::math::{mul_div255_u16, unit_to_u8};
use crate::scene::item::BlendMode;

pub(crate) type PremulRgba8 = [u8; 4];

/// Composite premultiplied `src` onto premultiplied `dst` with `mode`.
pub(crate) fn composite(dst: PremulRgba8, src: PremulRgba8, mode: BlendMode) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    match mode {
        BlendMode::Normal => over(dst, src),
        _ => separable(dst, src, mode),
    }
}

fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        let v = u16::from(src[i]) + mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = v.min(255) as u8;
    }
    out
}

fn blend_channel(mode: BlendMode, cb: f32, cs: f32) -> f32 {
    match mode {
        BlendMode::Normal => cs,
        BlendMode::Multiply => cb * cs,
        BlendMode::Screen => screen(cb, cs),
        BlendMode::Overlay => {
            if cb <= 0.5 {
                2.0 * cb * cs
            } else {
                screen(cs, 2.0 * cb - 1.0)
            }
        }
    }
}

fn screen(cb: f32, cs: f32) -> f32 {
    cb + cs - cb * cs
}

// co = Sc(1 - ab) + Dc(1 - as) + as*ab*B(cb, cs), all in premultiplied space.
fn separable(dst: PremulRgba8, src: PremulRgba8, mode: BlendMode) -> PremulRgba8 {
    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = f32::from(src[i]) / 255.0;
        let dc = f32::from(dst[i]) / 255.0;
        let cs = sc / sa;
        let cb = if da > 0.0 { dc / da } else { 0.0 };
        let co = sc * (1.0 - da) + dc * (1.0 - sa) + sa * da * blend_channel(mode, cb, cs);
        out[i] = unit_to_u8(co);
    }
    out[3] = unit_to_u8(sa + da - sa * da);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
