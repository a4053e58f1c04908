//! Integer DPI scaling

/// DPI at 100% scale.
pub const BASE_DPI: u16 = 96;

/// `mul_div` adds `z >> ROUNDING_BIAS_SHIFT` before dividing, so a result
/// only rounds up once its fraction reaches 0.875.
pub const ROUNDING_BIAS_SHIFT: u32 = 3;

const POINTS_PER_INCH: i32 = 72;

/// Computes `x * y / z` with the one-eighth rounding bias.
///
/// The magnitude of `x` is scaled and its sign re-applied, so `-1.5` rounds
/// the same way as `1.5`. `y` and `z` are DPI values and must be positive.
/// A zero `z` is a caller error: it asserts in debug builds and yields 0 in
/// release builds.
pub fn mul_div(x: i32, y: i32, z: i32) -> i32 {
    debug_assert!(y != 0, "mul_div: zero numerator DPI");
    debug_assert!(z != 0, "mul_div: zero denominator DPI");
    if z == 0 {
        return 0;
    }

    let sign: i64 = if x < 0 { -1 } else { 1 };
    let magnitude = (x as i64).abs();
    let z = z as i64;
    let scaled = (magnitude * y as i64 + (z >> ROUNDING_BIAS_SHIFT)) / z;
    (scaled * sign) as i32
}

/// Platform `MulDiv`: rounds half away from zero, -1 on zero divisor or
/// overflow.
fn mul_div_round(a: i32, b: i32, c: i32) -> i32 {
    if c == 0 {
        return -1;
    }

    let n = a as i64 * b as i64;
    let d = c as i64;
    let q = if (n >= 0) == (d > 0) {
        (n + d / 2) / d
    } else {
        (n - d / 2) / d
    };
    i32::try_from(q).unwrap_or(-1)
}

/// Scales values between 96 DPI and one other DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DpiScaler {
    log_pixels: u16,
}

impl Default for DpiScaler {
    fn default() -> Self {
        Self {
            log_pixels: BASE_DPI,
        }
    }
}

impl From<u16> for DpiScaler {
    fn from(dpi: u16) -> Self {
        Self::new(dpi)
    }
}

impl PartialEq<u32> for DpiScaler {
    fn eq(&self, dpi: &u32) -> bool {
        self.is_dpi_equal(*dpi)
    }
}

impl DpiScaler {
    pub fn new(dpi: u16) -> Self {
        debug_assert!(dpi != 0, "DpiScaler: zero DPI");
        Self { log_pixels: dpi }
    }

    /// From a `WM_DPICHANGED` wParam; the low word carries the X DPI.
    pub fn from_wparam(wparam: usize) -> Self {
        Self::new((wparam & 0xFFFF) as u16)
    }

    pub fn dpi(&self) -> u16 {
        self.log_pixels
    }

    pub fn is_dpi_equal(&self, dpi: u32) -> bool {
        debug_assert!(dpi != 0);
        dpi == self.log_pixels as u32
    }

    pub fn on_dpi_changed(&mut self, dpi: DpiScaler) {
        self.log_pixels = dpi.log_pixels;
    }

    /// Scale `n` from 96 DPI to this DPI.
    pub fn scale(&self, n: i32) -> i32 {
        mul_div(n, self.log_pixels as i32, BASE_DPI as i32)
    }

    pub fn scale_f(&self, n: f32) -> f32 {
        n * self.log_pixels as f32 / BASE_DPI as f32
    }

    /// Scale `n` from this DPI to `dpi`.
    pub fn scale_to(&self, n: i32, dpi: impl Into<DpiScaler>) -> i32 {
        let dpi = dpi.into();
        mul_div(n, dpi.log_pixels as i32, self.log_pixels as i32)
    }

    /// Scale `n` from `dpi` to this DPI.
    pub fn scale_from(&self, n: i32, dpi: impl Into<DpiScaler>) -> i32 {
        let dpi = dpi.into();
        mul_div(n, self.log_pixels as i32, dpi.log_pixels as i32)
    }

    /// Font height for a point size; negative means "character height in
    /// pixels", as the platform font APIs expect.
    pub fn point_size_to_height(&self, point_size: i32) -> i32 {
        debug_assert!(point_size >= 1);
        -mul_div_round(point_size, self.log_pixels as i32, POINTS_PER_INCH)
    }

    pub fn point_size_to_height_f(&self, point_size: f32) -> i32 {
        debug_assert!(point_size >= 1.0);
        -mul_div_round(
            (point_size * 10.0) as i32,
            self.log_pixels as i32,
            POINTS_PER_INCH * 10,
        )
    }

    /// Packs the DPI into both words, like `WM_DPICHANGED` does.
    pub fn make_wparam(&self) -> usize {
        let dpi = self.log_pixels as usize;
        (dpi << 16) | dpi
    }
}
