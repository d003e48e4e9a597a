use core::f32::consts::PI;

/// Hamming window coefficients for an `M`-point frame
pub(crate) fn hamming<const M: usize>() -> [f32; M] {
    let mut table = [1.0; M];
    if M < 2 {
        return table;
    }
    let denominator = (M - 1) as f32;
    for (i, weight) in table.iter_mut().enumerate() {
        let ratio = i as f32 / denominator;
        *weight = 0.54 - 0.46 * libm::cosf(2.0 * PI * ratio);
    }
    table
}
